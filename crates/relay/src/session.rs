//! 장애 주입 중계 세션
//!
//! [`RelaySession`]은 인바운드 연결 하나를 받아 아웃바운드 연결 하나로
//! 양방향 중계하다가, 어느 한 방향이 바이트 예산을 소진하거나 스트림 끝에
//! 도달하면 양쪽 소켓을 모두 닫습니다. 전송 도중 네트워크가 끊기는 상황을
//! 재현하는 데 사용합니다.
//!
//! # 수명 주기
//!
//! ```text
//! start() ── bind ──> [accept] ── connect ──> [pump x2] ── teardown ──> wait()
//!    │                   │                        │
//!    └ 바인드 완료 후 반환  └ accept_timeout          └ 예산 소진 / EOF / shutdown()
//! ```
//!
//! `start()`는 리스닝 소켓이 바인드된 뒤에만 반환하므로, 호출자는 반환 직후
//! 이 소켓에 접속하는 프로세스를 안전하게 띄울 수 있습니다.
//! 두 복사 태스크는 세션이 소유하며 [`RelaySession::wait`]에서 모두 join됩니다.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::{BufMut, BytesMut};
use metrics::counter;
use serde::Serialize;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use pacsprobe_core::metrics::{
    LABEL_DIRECTION, RELAY_BYTES_FORWARDED_TOTAL, RELAY_SESSIONS_TOTAL,
};

use crate::config::RelayConfig;
use crate::error::RelayError;

/// 중계 방향
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// 인바운드 클라이언트 → 아웃바운드 대상
    ClientToRemote,
    /// 아웃바운드 대상 → 인바운드 클라이언트
    RemoteToClient,
}

impl Direction {
    /// 메트릭/로그 레이블
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ClientToRemote => "client_to_remote",
            Self::RemoteToClient => "remote_to_client",
        }
    }
}

/// 한 방향 복사 루프의 종료 원인
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum DirectionEnd {
    /// 바이트 예산 소진
    BudgetExhausted,
    /// 소스가 스트림 끝(EOF)을 보냄
    EndOfStream,
    /// 반대 방향 또는 shutdown()에 의한 세션 종료
    TornDown,
    /// 읽기/쓰기 실패
    Io(String),
}

/// 세션 종료 원인
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Teardown {
    /// 한 방향이 예산을 소진함
    BudgetExhausted { direction: Direction },
    /// 한 방향이 EOF에 도달함
    EndOfStream { direction: Direction },
    /// 한 방향에서 I/O 에러 발생
    Io { direction: Direction, reason: String },
    /// shutdown() 호출 (인바운드 연결 전 포함)
    Cancelled,
}

/// 세션 종료 후 통계
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    /// 인바운드 연결을 받았는지 여부
    pub connected: bool,
    /// 클라이언트 → 대상 방향 중계 바이트
    pub client_to_remote: u64,
    /// 대상 → 클라이언트 방향 중계 바이트
    pub remote_to_client: u64,
    /// 세션 종료 원인
    pub teardown: Teardown,
}

impl RelayStats {
    fn cancelled_before_accept() -> Self {
        Self {
            connected: false,
            client_to_remote: 0,
            remote_to_client: 0,
            teardown: Teardown::Cancelled,
        }
    }

    /// 연결 절단이 실제로 주입되었는지 (예산 소진으로 종료되었는지)
    pub fn budget_exhausted(&self) -> bool {
        matches!(self.teardown, Teardown::BudgetExhausted { .. })
    }
}

/// 한 방향 복사 결과
#[derive(Debug)]
struct PumpReport {
    direction: Direction,
    forwarded: u64,
    end: DirectionEnd,
}

/// 실행 중인 중계 세션 핸들
///
/// 핸들이 drop되면 세션은 취소됩니다. 소켓이 시나리오보다 오래 살아남지 않도록
/// 호출자는 [`wait`](Self::wait) 또는 [`shutdown_and_wait`](Self::shutdown_and_wait)로
/// 세션을 정리해야 합니다.
pub struct RelaySession {
    local_addr: SocketAddr,
    target: String,
    cancel: CancellationToken,
    task: Option<JoinHandle<Result<RelayStats, RelayError>>>,
}

impl RelaySession {
    /// 리스닝 소켓을 바인드하고 백그라운드에서 세션을 시작합니다.
    ///
    /// 바인드가 끝난 뒤에 반환하므로 반환 시점에 소켓은 연결을 받을 수 있습니다.
    /// 중계 자체는 반환 이후에 진행됩니다.
    ///
    /// # Errors
    ///
    /// 설정이 유효하지 않거나 바인드에 실패하면 에러를 반환합니다.
    pub async fn start(config: RelayConfig) -> Result<Self, RelayError> {
        config.validate()?;

        let listener =
            TcpListener::bind(config.listen_addr)
                .await
                .map_err(|e| RelayError::Bind {
                    addr: config.listen_addr.to_string(),
                    reason: e.to_string(),
                })?;
        let local_addr = listener.local_addr()?;
        let target = config.target();

        info!(
            listen = %local_addr,
            target = %target,
            budget = config.byte_budget,
            "relay listening"
        );
        counter!(RELAY_SESSIONS_TOTAL).increment(1);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(run_session(listener, local_addr, config, cancel.clone()));

        Ok(Self {
            local_addr,
            target,
            cancel,
            task: Some(task),
        })
    }

    /// 실제로 바인드된 리스닝 주소
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// 중계 대상 (`host:port`)
    pub fn target(&self) -> &str {
        &self.target
    }

    /// 세션 종료를 요청합니다. 연결 대기 중이면 대기를 멈추고,
    /// 중계 중이면 양쪽 소켓을 닫습니다.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// 세션 태스크가 끝났는지 여부
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// 세션이 끝날 때까지 기다립니다. 두 복사 태스크가 모두 join된 뒤 반환합니다.
    pub async fn wait(mut self) -> Result<RelayStats, RelayError> {
        let Some(task) = self.task.take() else {
            return Err(RelayError::Task("session already awaited".to_owned()));
        };
        task.await.map_err(|e| RelayError::Task(e.to_string()))?
    }

    /// 종료를 요청하고 정리가 끝날 때까지 기다립니다.
    pub async fn shutdown_and_wait(self) -> Result<RelayStats, RelayError> {
        self.shutdown();
        self.wait().await
    }

    /// 세션이 스스로 끝나기를 `grace`만큼 기다린 뒤, 그래도 살아 있으면
    /// 종료를 요청하고 정리가 끝날 때까지 기다립니다.
    ///
    /// 프로브 프로세스가 막 종료되어 EOF가 아직 전파 중인 세션을
    /// `Cancelled`가 아닌 실제 종료 원인으로 기록할 때 사용합니다.
    pub async fn finish(mut self, grace: Duration) -> Result<RelayStats, RelayError> {
        let Some(mut task) = self.task.take() else {
            return Err(RelayError::Task("session already awaited".to_owned()));
        };
        let joined = match timeout(grace, &mut task).await {
            Ok(joined) => joined,
            Err(_) => {
                debug!(listen = %self.local_addr, "relay still open after grace, cancelling");
                self.cancel.cancel();
                task.await
            }
        };
        joined.map_err(|e| RelayError::Task(e.to_string()))?
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

impl std::fmt::Debug for RelaySession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelaySession")
            .field("local_addr", &self.local_addr)
            .field("target", &self.target)
            .field("finished", &self.is_finished())
            .finish()
    }
}

async fn run_session(
    listener: TcpListener,
    local_addr: SocketAddr,
    config: RelayConfig,
    cancel: CancellationToken,
) -> Result<RelayStats, RelayError> {
    let client = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(listen = %local_addr, "relay cancelled before accept");
            return Ok(RelayStats::cancelled_before_accept());
        }
        accepted = accept_one(&listener, local_addr, &config) => accepted?,
    };
    // 연결은 하나만 받으므로 리스닝 소켓은 바로 반환
    drop(listener);

    let remote = tokio::select! {
        _ = cancel.cancelled() => {
            debug!(listen = %local_addr, "relay cancelled before connect");
            return Ok(RelayStats {
                connected: true,
                ..RelayStats::cancelled_before_accept()
            });
        }
        connected = connect_remote(&config) => connected?,
    };

    for stream in [&client, &remote] {
        if let Err(e) = stream.set_nodelay(true) {
            debug!(error = %e, "failed to set TCP_NODELAY");
        }
    }

    let (client_rd, client_wr) = client.into_split();
    let (remote_rd, remote_wr) = remote.into_split();

    // 어느 방향이든 종료되면 이 토큰을 취소해 반대 방향도 멈춘다
    let teardown = cancel.child_token();

    let upstream = tokio::spawn(pump(
        client_rd,
        remote_wr,
        config.byte_budget,
        config.buffer_size,
        teardown.clone(),
        Direction::ClientToRemote,
    ));
    let downstream = tokio::spawn(pump(
        remote_rd,
        client_wr,
        config.byte_budget,
        config.buffer_size,
        teardown.clone(),
        Direction::RemoteToClient,
    ));

    let (up, down) = tokio::join!(upstream, downstream);
    let up = up.map_err(|e| RelayError::Task(e.to_string()))?;
    let down = down.map_err(|e| RelayError::Task(e.to_string()))?;

    let stats = RelayStats {
        connected: true,
        client_to_remote: up.forwarded,
        remote_to_client: down.forwarded,
        teardown: teardown_cause(&up, &down),
    };

    info!(
        listen = %local_addr,
        client_to_remote = stats.client_to_remote,
        remote_to_client = stats.remote_to_client,
        teardown = ?stats.teardown,
        "relay session closed"
    );

    Ok(stats)
}

async fn accept_one(
    listener: &TcpListener,
    local_addr: SocketAddr,
    config: &RelayConfig,
) -> Result<TcpStream, RelayError> {
    let accepted = match config.accept_timeout {
        Some(limit) => timeout(limit, listener.accept())
            .await
            .map_err(|_| RelayError::AcceptTimeout {
                addr: local_addr.to_string(),
                secs: limit.as_secs(),
            })?,
        None => listener.accept().await,
    };

    let (stream, peer) = accepted.map_err(|e| RelayError::Accept {
        addr: local_addr.to_string(),
        reason: e.to_string(),
    })?;
    debug!(listen = %local_addr, peer = %peer, "relay accepted connection");
    Ok(stream)
}

async fn connect_remote(config: &RelayConfig) -> Result<TcpStream, RelayError> {
    let target = config.target();
    let stream = timeout(
        config.connect_timeout,
        TcpStream::connect((config.remote_host.as_str(), config.remote_port)),
    )
    .await
    .map_err(|_| RelayError::ConnectTimeout {
        target: target.clone(),
        secs: config.connect_timeout.as_secs(),
    })?
    .map_err(|e| {
        debug!(target = %target, error = %e, "relay could not reach target");
        RelayError::Connect {
            target: target.clone(),
            reason: e.to_string(),
        }
    })?;
    debug!(target = %target, "relay connected to target");
    Ok(stream)
}

/// 한 방향으로 바이트를 복사합니다.
///
/// 한 번의 읽기는 남은 예산을 넘지 않으므로, 이 방향으로 중계되는 총량은
/// 항상 `budget` 이하입니다. 종료 시 `teardown`을 취소하고, 소유한 소켓
/// 절반들은 태스크 종료와 함께 닫힙니다.
async fn pump(
    mut reader: OwnedReadHalf,
    mut writer: OwnedWriteHalf,
    budget: usize,
    buffer_size: usize,
    teardown: CancellationToken,
    direction: Direction,
) -> PumpReport {
    let mut remaining = budget;
    let mut forwarded: u64 = 0;
    let mut buf = BytesMut::with_capacity(buffer_size);

    let end = loop {
        if remaining == 0 {
            break DirectionEnd::BudgetExhausted;
        }

        buf.clear();
        let want = remaining.min(buffer_size);
        let read = {
            let mut limited = (&mut buf).limit(want);
            tokio::select! {
                biased;
                _ = teardown.cancelled() => None,
                r = reader.read_buf(&mut limited) => Some(r),
            }
        };

        let n = match read {
            None => break DirectionEnd::TornDown,
            Some(Ok(0)) => break DirectionEnd::EndOfStream,
            Some(Ok(n)) => n,
            Some(Err(e)) => break DirectionEnd::Io(e.to_string()),
        };

        let written = tokio::select! {
            biased;
            _ = teardown.cancelled() => None,
            w = writer.write_all(&buf[..n]) => Some(w),
        };
        match written {
            None => break DirectionEnd::TornDown,
            Some(Err(e)) => break DirectionEnd::Io(e.to_string()),
            Some(Ok(())) => {}
        }

        remaining -= n;
        forwarded += n as u64;
        counter!(RELAY_BYTES_FORWARDED_TOTAL, LABEL_DIRECTION => direction.as_str())
            .increment(n as u64);
    };

    debug!(
        direction = direction.as_str(),
        forwarded,
        end = ?end,
        "relay direction finished"
    );
    teardown.cancel();

    PumpReport {
        direction,
        forwarded,
        end,
    }
}

/// 두 방향의 종료 원인으로 세션 종료 원인을 결정합니다.
///
/// 세션을 먼저 끝낸 쪽(`TornDown`이 아닌 쪽)을 우선하며,
/// 둘 다 `TornDown`이면 외부 shutdown에 의한 종료입니다.
fn teardown_cause(up: &PumpReport, down: &PumpReport) -> Teardown {
    [up, down]
        .into_iter()
        .find_map(|report| match &report.end {
            DirectionEnd::BudgetExhausted => Some(Teardown::BudgetExhausted {
                direction: report.direction,
            }),
            DirectionEnd::EndOfStream => Some(Teardown::EndOfStream {
                direction: report.direction,
            }),
            DirectionEnd::Io(reason) => Some(Teardown::Io {
                direction: report.direction,
                reason: reason.clone(),
            }),
            DirectionEnd::TornDown => None,
        })
        .unwrap_or(Teardown::Cancelled)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(direction: Direction, end: DirectionEnd) -> PumpReport {
        PumpReport {
            direction,
            forwarded: 0,
            end,
        }
    }

    #[test]
    fn teardown_prefers_the_direction_that_ended_first() {
        let up = report(Direction::ClientToRemote, DirectionEnd::TornDown);
        let down = report(Direction::RemoteToClient, DirectionEnd::BudgetExhausted);
        assert_eq!(
            teardown_cause(&up, &down),
            Teardown::BudgetExhausted {
                direction: Direction::RemoteToClient
            }
        );
    }

    #[test]
    fn teardown_both_torn_down_is_cancelled() {
        let up = report(Direction::ClientToRemote, DirectionEnd::TornDown);
        let down = report(Direction::RemoteToClient, DirectionEnd::TornDown);
        assert_eq!(teardown_cause(&up, &down), Teardown::Cancelled);
    }

    #[test]
    fn teardown_reports_io_reason() {
        let up = report(
            Direction::ClientToRemote,
            DirectionEnd::Io("connection reset".to_owned()),
        );
        let down = report(Direction::RemoteToClient, DirectionEnd::TornDown);
        match teardown_cause(&up, &down) {
            Teardown::Io { direction, reason } => {
                assert_eq!(direction, Direction::ClientToRemote);
                assert_eq!(reason, "connection reset");
            }
            other => panic!("unexpected teardown: {other:?}"),
        }
    }

    #[test]
    fn direction_labels() {
        assert_eq!(Direction::ClientToRemote.as_str(), "client_to_remote");
        assert_eq!(Direction::RemoteToClient.as_str(), "remote_to_client");
    }

    #[test]
    fn stats_serialize_with_tagged_teardown() {
        let stats = RelayStats {
            connected: true,
            client_to_remote: 10,
            remote_to_client: 0,
            teardown: Teardown::BudgetExhausted {
                direction: Direction::ClientToRemote,
            },
        };
        assert!(stats.budget_exhausted());
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["teardown"]["kind"], "budget_exhausted");
        assert_eq!(value["teardown"]["direction"], "client_to_remote");
    }
}
