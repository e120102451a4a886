//! 설정 관리 — pacsprobe.toml 파싱 및 런타임 설정
//!
//! [`ProbeConfig`]는 실행 환경(로그, 중계 소켓, 외부 도구 경로, 산출물)에 대한
//! 최상위 설정 구조체입니다. 테스트 대상 PACS에 대한 값(호스트, AE 타이틀,
//! 환자 ID 등)은 CLI 인자로만 받으며 여기에 포함되지 않습니다.
//!
//! # 설정 로딩 우선순위
//! 1. CLI 인자 (최고 우선)
//! 2. 환경변수 (`PACSPROBE_RELAY_ACCEPT_TIMEOUT_SECS=30` 형식)
//! 3. 설정 파일 (`pacsprobe.toml`)
//! 4. 기본값 (`Default` 구현)
//!
//! # 사용 예시
//! ```no_run
//! # async fn example() -> Result<(), pacsprobe_core::error::PacsProbeError> {
//! use pacsprobe_core::config::ProbeConfig;
//!
//! // 파일에서 로드 + 환경변수 오버라이드
//! let config = ProbeConfig::load("pacsprobe.toml").await?;
//!
//! // TOML 문자열에서 직접 파싱
//! let config = ProbeConfig::parse("[relay]\naccept_timeout_secs = 5")?;
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, PacsProbeError};

/// 알 수 없는 AE 타이틀 시나리오에서 사용하는 기본 이름
pub const DEFAULT_UNKNOWN_AE_TITLE: &str = "HICtestBadName";

/// pacsprobe 통합 설정
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// 일반 설정
    #[serde(default)]
    pub general: GeneralConfig,
    /// 장애 주입 중계 설정
    #[serde(default)]
    pub relay: RelaySettings,
    /// 외부 도구 설정
    #[serde(default)]
    pub tools: ToolsConfig,
    /// 산출물 설정
    #[serde(default)]
    pub artifacts: ArtifactsConfig,
    /// 시나리오 설정
    #[serde(default)]
    pub scenarios: ScenariosConfig,
}

impl ProbeConfig {
    /// TOML 파일에서 설정을 로드하고 환경변수 오버라이드를 적용합니다.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, PacsProbeError> {
        let mut config = Self::from_file(path).await?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 설정 파일 없이 기본값 + 환경변수 오버라이드로 설정을 만듭니다.
    pub fn from_env() -> Result<Self, PacsProbeError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// TOML 파일에서 설정을 로드합니다 (환경변수 오버라이드 없음).
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self, PacsProbeError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PacsProbeError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                PacsProbeError::Io(e)
            }
        })?;
        let config = Self::parse(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 설정을 파싱합니다.
    pub fn parse(toml_str: &str) -> Result<Self, PacsProbeError> {
        toml::from_str(toml_str).map_err(|e| {
            PacsProbeError::Config(ConfigError::ParseFailed {
                reason: e.to_string(),
            })
        })
    }

    /// 환경변수로 설정값을 오버라이드합니다.
    ///
    /// 환경변수 네이밍 규칙: `PACSPROBE_{SECTION}_{FIELD}`
    pub fn apply_env_overrides(&mut self) {
        // General
        override_string(&mut self.general.log_level, "PACSPROBE_GENERAL_LOG_LEVEL");
        override_string(
            &mut self.general.log_format,
            "PACSPROBE_GENERAL_LOG_FORMAT",
        );

        // Relay
        override_string(
            &mut self.relay.bind_address,
            "PACSPROBE_RELAY_BIND_ADDRESS",
        );
        override_usize(
            &mut self.relay.outbound_budget_bytes,
            "PACSPROBE_RELAY_OUTBOUND_BUDGET_BYTES",
        );
        override_usize(
            &mut self.relay.inbound_budget_bytes,
            "PACSPROBE_RELAY_INBOUND_BUDGET_BYTES",
        );
        override_u64(
            &mut self.relay.accept_timeout_secs,
            "PACSPROBE_RELAY_ACCEPT_TIMEOUT_SECS",
        );
        override_u64(
            &mut self.relay.connect_timeout_secs,
            "PACSPROBE_RELAY_CONNECT_TIMEOUT_SECS",
        );
        override_usize(&mut self.relay.buffer_size, "PACSPROBE_RELAY_BUFFER_SIZE");

        // Tools
        override_string(&mut self.tools.echo, "PACSPROBE_TOOLS_ECHO");
        override_string(&mut self.tools.find, "PACSPROBE_TOOLS_FIND");
        override_string(&mut self.tools.r#move, "PACSPROBE_TOOLS_MOVE");
        override_u64(&mut self.tools.timeout_secs, "PACSPROBE_TOOLS_TIMEOUT_SECS");

        // Artifacts
        override_bool(&mut self.artifacts.enabled, "PACSPROBE_ARTIFACTS_ENABLED");
        override_string(&mut self.artifacts.dir, "PACSPROBE_ARTIFACTS_DIR");

        // Scenarios
        override_string(
            &mut self.scenarios.unknown_ae_title,
            "PACSPROBE_SCENARIOS_UNKNOWN_AE_TITLE",
        );
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), PacsProbeError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.general.log_level.as_str()) {
            return Err(invalid(
                "general.log_level",
                format!("must be one of: {}", valid_levels.join(", ")),
            ));
        }

        let valid_formats = ["json", "pretty", "compact"];
        if !valid_formats.contains(&self.general.log_format.as_str()) {
            return Err(invalid(
                "general.log_format",
                format!("must be one of: {}", valid_formats.join(", ")),
            ));
        }

        if self.relay.bind_address.parse::<std::net::IpAddr>().is_err() {
            return Err(invalid(
                "relay.bind_address",
                format!("'{}' is not an IP address", self.relay.bind_address),
            ));
        }

        if self.relay.buffer_size == 0 {
            return Err(invalid("relay.buffer_size", "must be greater than 0".to_owned()));
        }

        if self.relay.connect_timeout_secs == 0 {
            return Err(invalid(
                "relay.connect_timeout_secs",
                "must be greater than 0".to_owned(),
            ));
        }

        for (field, value) in [
            ("tools.echo", &self.tools.echo),
            ("tools.find", &self.tools.find),
            ("tools.move", &self.tools.r#move),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "tool path must not be empty".to_owned()));
            }
        }

        if self.artifacts.enabled && self.artifacts.dir.trim().is_empty() {
            return Err(invalid(
                "artifacts.dir",
                "must not be empty when artifacts are enabled".to_owned(),
            ));
        }

        let title = &self.scenarios.unknown_ae_title;
        if title.is_empty() || title.len() > 16 {
            return Err(invalid(
                "scenarios.unknown_ae_title",
                "must be 1-16 characters".to_owned(),
            ));
        }

        Ok(())
    }
}

fn invalid(field: &str, reason: String) -> PacsProbeError {
    ConfigError::InvalidValue {
        field: field.to_owned(),
        reason,
    }
    .into()
}

/// 일반 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// 로그 레벨 (trace, debug, info, warn, error)
    pub log_level: String,
    /// 로그 형식 (json, pretty, compact)
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_owned(),
            log_format: "compact".to_owned(),
        }
    }
}

/// 장애 주입 중계 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelaySettings {
    /// 중계 리스너 바인드 주소
    pub bind_address: String,
    /// 외부(PACS 방향) 연결 차단 시 방향별 바이트 예산
    pub outbound_budget_bytes: usize,
    /// 내부(수신 방향) 연결 차단 시 방향별 바이트 예산
    pub inbound_budget_bytes: usize,
    /// 인바운드 연결 대기 시간 (초, 0 = 무제한)
    pub accept_timeout_secs: u64,
    /// 아웃바운드 연결 타임아웃 (초)
    pub connect_timeout_secs: u64,
    /// 복사 버퍼 크기 (바이트)
    pub buffer_size: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_owned(),
            outbound_budget_bytes: 1024,
            inbound_budget_bytes: 10 * 1024,
            accept_timeout_secs: 60,
            connect_timeout_secs: 10,
            buffer_size: 4096,
        }
    }
}

/// 외부 DICOM 도구 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// C-ECHO 도구 경로
    pub echo: String,
    /// C-FIND 도구 경로
    pub find: String,
    /// C-MOVE 도구 경로
    #[serde(rename = "move")]
    pub r#move: String,
    /// 도구 실행 제한 시간 (초, 0 = 무제한)
    pub timeout_secs: u64,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            echo: "echoscu".to_owned(),
            find: "findscu".to_owned(),
            r#move: "movescu".to_owned(),
            timeout_secs: 0,
        }
    }
}

/// 시나리오별 출력 산출물 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// `<n>-out.txt` / `<n>-err.txt` 기록 여부
    pub enabled: bool,
    /// 산출물 디렉토리
    pub dir: String,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            dir: ".".to_owned(),
        }
    }
}

/// 시나리오 설정
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenariosConfig {
    /// PACS에 등록되지 않은 것이 보장되는 AE 타이틀
    pub unknown_ae_title: String,
}

impl Default for ScenariosConfig {
    fn default() -> Self {
        Self {
            unknown_ae_title: DEFAULT_UNKNOWN_AE_TITLE.to_owned(),
        }
    }
}

// --- 환경변수 오버라이드 헬퍼 ---

fn override_string(target: &mut String, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        *target = val;
    }
}

fn override_bool(target: &mut bool, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<bool>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse bool from env var, ignoring"
            ),
        }
    }
}

fn override_usize(target: &mut usize, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<usize>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse usize from env var, ignoring"
            ),
        }
    }
}

fn override_u64(target: &mut u64, env_key: &str) {
    if let Ok(val) = std::env::var(env_key) {
        match val.parse::<u64>() {
            Ok(parsed) => *target = parsed,
            Err(_) => warn!(
                env_key,
                value = val.as_str(),
                "failed to parse u64 from env var, ignoring"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn default_config_has_sane_values() {
        let config = ProbeConfig::default();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.general.log_format, "compact");
        assert_eq!(config.relay.outbound_budget_bytes, 1024);
        assert_eq!(config.relay.inbound_budget_bytes, 10240);
        assert_eq!(config.tools.r#move, "movescu");
        assert!(config.artifacts.enabled);
        assert_eq!(config.scenarios.unknown_ae_title, "HICtestBadName");
    }

    #[test]
    fn default_config_passes_validation() {
        let config = ProbeConfig::default();
        config.validate().unwrap();
    }

    #[test]
    fn from_str_empty_toml_uses_defaults() {
        let config = ProbeConfig::parse("").unwrap();
        assert_eq!(config.general.log_level, "warn");
        assert_eq!(config.tools.echo, "echoscu");
    }

    #[test]
    fn from_str_partial_toml_merges_with_defaults() {
        let toml = r#"
[relay]
accept_timeout_secs = 5

[tools]
move = "/opt/dcmtk/bin/movescu"
"#;
        let config = ProbeConfig::parse(toml).unwrap();
        assert_eq!(config.relay.accept_timeout_secs, 5);
        // 나머지는 기본값 유지
        assert_eq!(config.relay.outbound_budget_bytes, 1024);
        assert_eq!(config.tools.r#move, "/opt/dcmtk/bin/movescu");
        assert_eq!(config.tools.find, "findscu");
    }

    #[test]
    fn from_str_invalid_toml_returns_error() {
        let result = ProbeConfig::parse("invalid = [[[toml");
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            PacsProbeError::Config(ConfigError::ParseFailed { .. })
        ));
    }

    #[test]
    fn validate_rejects_invalid_log_level() {
        let mut config = ProbeConfig::default();
        config.general.log_level = "verbose".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn validate_rejects_invalid_log_format() {
        let mut config = ProbeConfig::default();
        config.general.log_format = "xml".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("log_format"));
    }

    #[test]
    fn validate_rejects_non_ip_bind_address() {
        let mut config = ProbeConfig::default();
        config.relay.bind_address = "localhost".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("bind_address"));
    }

    #[test]
    fn validate_rejects_zero_buffer_size() {
        let mut config = ProbeConfig::default();
        config.relay.buffer_size = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("buffer_size"));
    }

    #[test]
    fn validate_accepts_zero_budgets() {
        let mut config = ProbeConfig::default();
        config.relay.outbound_budget_bytes = 0;
        config.relay.inbound_budget_bytes = 0;
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_empty_tool_path() {
        let mut config = ProbeConfig::default();
        config.tools.find = "  ".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("tools.find"));
    }

    #[test]
    fn validate_allows_empty_artifact_dir_when_disabled() {
        let mut config = ProbeConfig::default();
        config.artifacts.enabled = false;
        config.artifacts.dir = String::new();
        config.validate().unwrap();
    }

    #[test]
    fn validate_rejects_long_unknown_ae_title() {
        let mut config = ProbeConfig::default();
        config.scenarios.unknown_ae_title = "A_VERY_LONG_AE_TITLE".to_owned();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("unknown_ae_title"));
    }

    #[test]
    #[serial]
    fn env_override_string() {
        let mut val = "original".to_owned();
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_PACSPROBE_STR", "overridden") };
        override_string(&mut val, "TEST_PACSPROBE_STR");
        assert_eq!(val, "overridden");
        unsafe { std::env::remove_var("TEST_PACSPROBE_STR") };
    }

    #[test]
    #[serial]
    fn env_override_u64_invalid_keeps_original() {
        let mut val = 60u64;
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("TEST_PACSPROBE_U64_BAD", "sixty") };
        override_u64(&mut val, "TEST_PACSPROBE_U64_BAD");
        assert_eq!(val, 60);
        unsafe { std::env::remove_var("TEST_PACSPROBE_U64_BAD") };
    }

    #[test]
    #[serial]
    fn env_override_applies_to_relay_section() {
        // SAFETY: serial 테스트로 실행되므로 환경변수 조작이 안전합니다.
        unsafe { std::env::set_var("PACSPROBE_RELAY_OUTBOUND_BUDGET_BYTES", "512") };
        let config = ProbeConfig::from_env().unwrap();
        unsafe { std::env::remove_var("PACSPROBE_RELAY_OUTBOUND_BUDGET_BYTES") };
        assert_eq!(config.relay.outbound_budget_bytes, 512);
    }

    #[test]
    fn env_override_missing_var_keeps_original() {
        let mut val = true;
        override_bool(&mut val, "TEST_PACSPROBE_NONEXISTENT_12345");
        assert!(val);
    }

    #[test]
    fn config_serialize_roundtrip() {
        let config = ProbeConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("move = \"movescu\""));
        let parsed = ProbeConfig::parse(&toml_str).unwrap();
        assert_eq!(config.tools.r#move, parsed.tools.r#move);
        assert_eq!(
            config.relay.inbound_budget_bytes,
            parsed.relay.inbound_budget_bytes
        );
    }

    #[tokio::test]
    async fn from_file_not_found() {
        let result = ProbeConfig::from_file("/nonexistent/path/pacsprobe.toml").await;
        let err = result.unwrap_err();
        assert!(matches!(
            err,
            PacsProbeError::Config(ConfigError::FileNotFound { .. })
        ));
    }
}
