//! 시나리오 에러 타입
//!
//! [`ScenarioError`]는 실행 설정 검증 실패와, 시나리오 하나를 실패시키는
//! 내부 에러(중계 준비, 도구 실행)를 표현합니다. 설정 에러만 전체 실행을
//! 중단시키고, 나머지는 해당 시나리오의 FAIL로 기록됩니다.

use pacsprobe_core::error::{ConfigError, PacsProbeError, ProcessError};
use pacsprobe_relay::RelayError;

/// 시나리오 도메인 에러
#[derive(Debug, thiserror::Error)]
pub enum ScenarioError {
    /// 실행 설정 에러
    #[error("invalid run parameter '{field}': {reason}")]
    Config {
        /// 파라미터명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 파생 포트(`port + 1`)가 유효 범위를 벗어남
    #[error("port {port} has no successor for the {purpose}")]
    PortOverflow {
        /// 기준 포트
        port: u16,
        /// 파생 포트 용도
        purpose: &'static str,
    },

    /// 중계 에러
    #[error("relay: {0}")]
    Relay(#[from] RelayError),

    /// 외부 도구 실행 에러
    #[error("{0}")]
    Process(#[from] ProcessError),
}

impl From<ScenarioError> for PacsProbeError {
    fn from(err: ScenarioError) -> Self {
        match err {
            ScenarioError::Config { field, reason } => {
                PacsProbeError::Config(ConfigError::InvalidValue { field, reason })
            }
            ScenarioError::PortOverflow { .. } => {
                PacsProbeError::Config(ConfigError::InvalidValue {
                    field: "port".to_owned(),
                    reason: err.to_string(),
                })
            }
            ScenarioError::Relay(e) => e.into(),
            ScenarioError::Process(e) => PacsProbeError::Process(e),
        }
    }
}
