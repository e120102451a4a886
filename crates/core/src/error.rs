//! 에러 타입 — 도메인별 에러 정의

/// pacsprobe 최상위 에러 타입
#[derive(Debug, thiserror::Error)]
pub enum PacsProbeError {
    /// 설정 관련 에러
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// 중계(relay) 소켓 에러
    #[error("relay error: {0}")]
    Relay(String),

    /// 외부 도구 실행 에러
    #[error("process error: {0}")]
    Process(#[from] ProcessError),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// 설정 관련 에러
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 설정 파일을 찾을 수 없음
    #[error("config file not found: {path}")]
    FileNotFound { path: String },

    /// 설정 파싱 실패
    #[error("failed to parse config: {reason}")]
    ParseFailed { reason: String },

    /// 유효하지 않은 설정 값
    #[error("invalid config value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// 외부 도구 실행 에러
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// 실행 파일을 찾을 수 없거나 실행 권한이 없음
    #[error("failed to launch '{program}': {reason}")]
    Launch { program: String, reason: String },

    /// 출력 스트림 수집 실패
    #[error("failed to capture output of '{program}': {reason}")]
    Capture { program: String, reason: String },

    /// 제한 시간 초과 (프로세스는 강제 종료됨)
    #[error("'{program}' timed out after {secs}s")]
    TimedOut { program: String, secs: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_top_level() {
        let err: PacsProbeError = ConfigError::InvalidValue {
            field: "relay.buffer_size".to_owned(),
            reason: "must be greater than 0".to_owned(),
        }
        .into();
        assert!(matches!(err, PacsProbeError::Config(_)));
        assert!(err.to_string().contains("relay.buffer_size"));
    }

    #[test]
    fn process_error_display_names_program() {
        let err = ProcessError::Launch {
            program: "findscu".to_owned(),
            reason: "No such file or directory".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("findscu"));
        assert!(msg.contains("No such file"));
    }

    #[test]
    fn timed_out_display() {
        let err = ProcessError::TimedOut {
            program: "movescu".to_owned(),
            secs: 30,
        };
        assert_eq!(err.to_string(), "'movescu' timed out after 30s");
    }
}
