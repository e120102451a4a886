//! 중계 세션 설정
//!
//! [`RelayConfig`]는 세션 하나의 리스닝 주소, 중계 대상, 방향별 바이트 예산,
//! 타임아웃을 담습니다. core의 [`RelaySettings`]에서 공통 값(바인드 주소,
//! 타임아웃, 버퍼 크기)을 가져오고, 포트와 대상은 시나리오마다 지정합니다.
//!
//! # 사용 예시
//! ```ignore
//! use pacsprobe_relay::RelayConfigBuilder;
//!
//! let config = RelayConfigBuilder::new()
//!     .listen_addr("127.0.0.1:10105".parse()?)
//!     .remote("pacs.example.org", 104)
//!     .byte_budget(1024)
//!     .build()?;
//! ```

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

use pacsprobe_core::config::RelaySettings;

use crate::error::RelayError;

/// 단일 중계 세션 설정
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// 인바운드 연결을 받을 주소
    pub listen_addr: SocketAddr,
    /// 아웃바운드 연결 대상 호스트
    pub remote_host: String,
    /// 아웃바운드 연결 대상 포트
    pub remote_port: u16,
    /// 방향별 최대 중계 바이트 수
    pub byte_budget: usize,
    /// 인바운드 연결 대기 제한 (`None` = 무제한)
    pub accept_timeout: Option<Duration>,
    /// 아웃바운드 연결 타임아웃
    pub connect_timeout: Duration,
    /// 한 번에 읽는 최대 바이트 수
    pub buffer_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::UNSPECIFIED), 0),
            remote_host: "127.0.0.1".to_owned(),
            remote_port: 0,
            byte_budget: 1024,
            accept_timeout: Some(Duration::from_secs(60)),
            connect_timeout: Duration::from_secs(10),
            buffer_size: 4096,
        }
    }
}

impl RelayConfig {
    /// core의 `RelaySettings`에서 세션 설정을 생성합니다.
    ///
    /// 리스닝 포트, 대상, 예산은 시나리오가 정하므로 인자로 받습니다.
    pub fn from_settings(
        settings: &RelaySettings,
        listen_port: u16,
        remote_host: impl Into<String>,
        remote_port: u16,
        byte_budget: usize,
    ) -> Result<Self, RelayError> {
        let ip: IpAddr = settings
            .bind_address
            .parse()
            .map_err(|_| RelayError::Config {
                field: "bind_address".to_owned(),
                reason: format!("'{}' is not an IP address", settings.bind_address),
            })?;

        let accept_timeout = match settings.accept_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        };

        Ok(Self {
            listen_addr: SocketAddr::new(ip, listen_port),
            remote_host: remote_host.into(),
            remote_port,
            byte_budget,
            accept_timeout,
            connect_timeout: Duration::from_secs(settings.connect_timeout_secs),
            buffer_size: settings.buffer_size,
        })
    }

    /// `host:port` 형식의 중계 대상 문자열
    pub fn target(&self) -> String {
        format!("{}:{}", self.remote_host, self.remote_port)
    }

    /// 설정값의 유효성을 검증합니다.
    pub fn validate(&self) -> Result<(), RelayError> {
        if self.remote_host.trim().is_empty() {
            return Err(RelayError::Config {
                field: "remote_host".to_owned(),
                reason: "must not be empty".to_owned(),
            });
        }

        if self.remote_port == 0 {
            return Err(RelayError::Config {
                field: "remote_port".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.buffer_size == 0 {
            return Err(RelayError::Config {
                field: "buffer_size".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        if self.connect_timeout.is_zero() {
            return Err(RelayError::Config {
                field: "connect_timeout".to_owned(),
                reason: "must be greater than 0".to_owned(),
            });
        }

        Ok(())
    }
}

/// 중계 세션 설정 빌더
#[derive(Debug, Default)]
pub struct RelayConfigBuilder {
    config: RelayConfig,
}

impl RelayConfigBuilder {
    /// 새 빌더를 생성합니다.
    pub fn new() -> Self {
        Self::default()
    }

    /// 리스닝 주소를 설정합니다. 포트 0이면 OS가 할당합니다.
    pub fn listen_addr(mut self, addr: SocketAddr) -> Self {
        self.config.listen_addr = addr;
        self
    }

    /// 중계 대상을 설정합니다.
    pub fn remote(mut self, host: impl Into<String>, port: u16) -> Self {
        self.config.remote_host = host.into();
        self.config.remote_port = port;
        self
    }

    /// 방향별 바이트 예산을 설정합니다.
    pub fn byte_budget(mut self, budget: usize) -> Self {
        self.config.byte_budget = budget;
        self
    }

    /// 인바운드 연결 대기 제한을 설정합니다.
    pub fn accept_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.config.accept_timeout = timeout;
        self
    }

    /// 아웃바운드 연결 타임아웃을 설정합니다.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// 읽기 버퍼 크기를 설정합니다.
    pub fn buffer_size(mut self, size: usize) -> Self {
        self.config.buffer_size = size;
        self
    }

    /// 설정을 검증하고 빌드합니다.
    pub fn build(self) -> Result<RelayConfig, RelayError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
