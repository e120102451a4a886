//! 메트릭 상수 및 설명 등록
//!
//! 모든 메트릭의 이름과 설명을 중앙에서 정의합니다.
//! 각 크레이트는 이 상수를 사용하여 `metrics::counter!()`,
//! `metrics::histogram!()` 매크로를 호출합니다. 레코더가 설치되지 않으면
//! 호출은 아무 동작도 하지 않습니다.
//!
//! # 네이밍 컨벤션
//!
//! - 접두어: `pacsprobe_`
//! - 접미어: `_total` (counter), `_seconds` (histogram)

// ─── 레이블 키 상수 ────────────────────────────────────────────────

/// 중계 방향 레이블 키 (client_to_remote, remote_to_client)
pub const LABEL_DIRECTION: &str = "direction";

/// 판정 레이블 키 (pass, fail)
pub const LABEL_VERDICT: &str = "verdict";

/// 도구 레이블 키 (echo, find, move)
pub const LABEL_TOOL: &str = "tool";

// ─── Relay 메트릭 ────────────────────────────────────────────────

/// Relay: 생성된 세션 수 (counter)
pub const RELAY_SESSIONS_TOTAL: &str = "pacsprobe_relay_sessions_total";

/// Relay: 중계한 바이트 수 (counter, label: direction)
pub const RELAY_BYTES_FORWARDED_TOTAL: &str = "pacsprobe_relay_bytes_forwarded_total";

// ─── Scenario 메트릭 ──────────────────────────────────────────────

/// Scenario: 실행한 시나리오 수 (counter, label: verdict)
pub const SCENARIOS_TOTAL: &str = "pacsprobe_scenarios_total";

/// Scenario: 외부 도구 실행 시간 (histogram, 초, label: tool)
pub const TOOL_DURATION_SECONDS: &str = "pacsprobe_tool_duration_seconds";

/// 모든 메트릭의 설명을 등록합니다.
///
/// 레코더 설치 직후 한 번 호출합니다.
pub fn describe_metrics() {
    metrics::describe_counter!(
        RELAY_SESSIONS_TOTAL,
        "Number of fault-injection relay sessions started"
    );
    metrics::describe_counter!(
        RELAY_BYTES_FORWARDED_TOTAL,
        "Bytes forwarded by fault-injection relays"
    );
    metrics::describe_counter!(SCENARIOS_TOTAL, "Scenarios executed, by verdict");
    metrics::describe_histogram!(
        TOOL_DURATION_SECONDS,
        metrics::Unit::Seconds,
        "Wall-clock duration of external tool invocations"
    );
}
