//! 외부 도구 실행
//!
//! [`ProcessRunner`] trait은 외부 프로그램 실행을 추상화합니다. 운영 환경은
//! [`TokioProcessRunner`]를 사용하고, 테스트는 미리 정한 결과를 돌려주는
//! 러너로 교체합니다.
//!
//! stdout과 stderr는 각각 별도 태스크가 끝까지 읽어 들이므로, 한쪽 파이프가
//! 가득 차서 자식 프로세스가 멈추는 일이 없습니다. 두 태스크는 프로세스가
//! 종료된 뒤 모두 join되며, 그 이후에만 [`ProcessResult`]가 만들어집니다.

use std::future::Future;
use std::process::Stdio;
use std::time::Instant;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use pacsprobe_core::ProcessResult;
use pacsprobe_core::error::ProcessError;

use crate::plan::Invocation;

/// 외부 프로그램 실행 추상화
pub trait ProcessRunner: Send + Sync {
    /// 프로그램을 실행하고 종료될 때까지 기다려 결과를 반환합니다.
    ///
    /// # Errors
    ///
    /// - `ProcessError::Launch`: 실행 파일을 시작하지 못함
    /// - `ProcessError::Capture`: 출력 수집 또는 종료 대기 실패
    /// - `ProcessError::TimedOut`: `invocation.timeout` 초과 (프로세스는 종료됨)
    fn run(
        &self,
        invocation: &Invocation,
    ) -> impl Future<Output = Result<ProcessResult, ProcessError>> + Send;
}

/// `tokio::process` 기반 러너
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

impl TokioProcessRunner {
    pub fn new() -> Self {
        Self
    }
}

impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, invocation: &Invocation) -> Result<ProcessResult, ProcessError> {
        let program = invocation.program.clone();
        debug!(command = %invocation.command_line(), "launching tool");

        let started = Instant::now();
        let mut child = Command::new(&invocation.program)
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProcessError::Launch {
                program: program.clone(),
                reason: e.to_string(),
            })?;

        let stdout_task = tokio::spawn(drain(child.stdout.take()));
        let stderr_task = tokio::spawn(drain(child.stderr.take()));

        let status = match invocation.timeout {
            Some(limit) => match tokio::time::timeout(limit, child.wait()).await {
                Ok(status) => status,
                Err(_) => {
                    warn!(program = %program, secs = limit.as_secs(), "tool timed out, killing");
                    if let Err(e) = child.kill().await {
                        debug!(program = %program, error = %e, "kill after timeout failed");
                    }
                    stdout_task.abort();
                    stderr_task.abort();
                    return Err(ProcessError::TimedOut {
                        program,
                        secs: limit.as_secs(),
                    });
                }
            },
            None => child.wait().await,
        }
        .map_err(|e| ProcessError::Capture {
            program: program.clone(),
            reason: e.to_string(),
        })?;

        let stdout = join_drain(stdout_task, &program).await?;
        let stderr = join_drain(stderr_task, &program).await?;

        // 시그널로 종료되면 종료 코드가 없다
        let exit_code = status.code().unwrap_or(-1);
        let duration = started.elapsed();
        debug!(
            program = %program,
            exit_code,
            stdout_bytes = stdout.len(),
            stderr_bytes = stderr.len(),
            elapsed_ms = duration.as_millis() as u64,
            "tool exited"
        );

        Ok(ProcessResult {
            exit_code,
            stdout,
            stderr,
            duration,
        })
    }
}

async fn drain<R>(pipe: Option<R>) -> std::io::Result<Vec<u8>>
where
    R: AsyncRead + Unpin,
{
    let mut collected = Vec::new();
    if let Some(mut pipe) = pipe {
        pipe.read_to_end(&mut collected).await?;
    }
    Ok(collected)
}

async fn join_drain(
    task: JoinHandle<std::io::Result<Vec<u8>>>,
    program: &str,
) -> Result<String, ProcessError> {
    let capture_err = |reason: String| ProcessError::Capture {
        program: program.to_owned(),
        reason,
    };
    let bytes = task
        .await
        .map_err(|e| capture_err(e.to_string()))?
        .map_err(|e| capture_err(e.to_string()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
