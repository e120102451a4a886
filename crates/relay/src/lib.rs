//! pacsprobe 장애 주입 중계
//!
//! 인바운드 연결 하나를 아웃바운드 연결 하나로 중계하면서, 방향별 바이트 예산을
//! 다 쓰면 양쪽 연결을 강제로 끊어 전송 도중의 네트워크 단절을 재현합니다.
//!
//! # 모듈 구성
//!
//! - [`config`]: 세션 설정과 빌더 (core 설정 확장)
//! - [`session`]: 세션 수명 주기, 양방향 복사 루프, 종료 통계
//! - [`error`]: 도메인 에러 타입
//!
//! # 아키텍처
//!
//! ```text
//! probe tool ──> [listen_addr] ══ pump(client→remote) ══> remote_host:remote_port
//!            <──               ══ pump(remote→client) ══<
//!                      └── 한 방향이 예산 소진/EOF → teardown → 양쪽 소켓 닫힘
//! ```

pub mod config;
pub mod error;
pub mod session;

// --- 주요 타입 re-export ---

pub use config::{RelayConfig, RelayConfigBuilder};
pub use error::RelayError;
pub use session::{Direction, RelaySession, RelayStats, Teardown};
