//! pacsprobe 공통 크레이트
//!
//! 모든 크레이트가 공유하는 에러 타입, 설정, 도메인 타입, 메트릭 이름을 정의합니다.

pub mod config;
pub mod error;
pub mod metrics;
pub mod types;

// --- 주요 타입 re-export ---

// 에러
pub use error::{ConfigError, PacsProbeError, ProcessError};

// 설정
pub use config::ProbeConfig;

// 도메인 타입
pub use types::{ProcessResult, Verdict};
