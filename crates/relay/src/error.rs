//! 중계 에러 타입
//!
//! [`RelayError`]는 중계 세션의 준비와 수행 중 발생하는 에러를 표현합니다.
//! `From<RelayError> for PacsProbeError` 변환이 구현되어 있어
//! 상위 레이어에서 `?` 연산자로 전파할 수 있습니다.

use pacsprobe_core::error::PacsProbeError;

/// 중계 도메인 에러
///
/// 어떤 에러든 해당 시나리오 하나만 실패시키며, 전체 실행을 중단시키지 않습니다.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// 설정 에러
    #[error("config error: {field}: {reason}")]
    Config {
        /// 설정 필드명
        field: String,
        /// 에러 사유
        reason: String,
    },

    /// 리스닝 소켓 바인드 실패 (포트 사용 중 등)
    #[error("failed to bind {addr}: {reason}")]
    Bind {
        /// 바인드 주소
        addr: String,
        /// 실패 사유
        reason: String,
    },

    /// 제한 시간 내에 인바운드 연결이 들어오지 않음
    #[error("no inbound connection on {addr} within {secs}s")]
    AcceptTimeout {
        /// 리스닝 주소
        addr: String,
        /// 대기 시간 (초)
        secs: u64,
    },

    /// 인바운드 연결 수락 실패
    #[error("accept failed on {addr}: {reason}")]
    Accept {
        /// 리스닝 주소
        addr: String,
        /// 실패 사유
        reason: String,
    },

    /// 아웃바운드 연결 실패
    #[error("failed to connect to {target}: {reason}")]
    Connect {
        /// 연결 대상 (host:port)
        target: String,
        /// 실패 사유
        reason: String,
    },

    /// 아웃바운드 연결 타임아웃
    #[error("connect to {target} timed out after {secs}s")]
    ConnectTimeout {
        /// 연결 대상 (host:port)
        target: String,
        /// 타임아웃 (초)
        secs: u64,
    },

    /// 중계 태스크 비정상 종료
    #[error("relay task failed: {0}")]
    Task(String),

    /// I/O 에러
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<RelayError> for PacsProbeError {
    fn from(err: RelayError) -> Self {
        PacsProbeError::Relay(err.to_string())
    }
}
