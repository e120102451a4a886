//! 출력 아티팩트 저장
//!
//! 시나리오마다 공백이 아닌 stdout/stderr를 `<n>-out.txt`, `<n>-err.txt`로
//! 저장합니다. 저장은 최선 노력(best-effort)이며 실패해도 판정에는 영향을
//! 주지 않습니다.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use pacsprobe_core::ProcessResult;
use pacsprobe_core::config::ArtifactsConfig;

use crate::classify::is_blank;

/// 아티팩트 저장기
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
    enabled: bool,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            enabled: true,
        }
    }

    /// 아무것도 저장하지 않는 저장기
    pub fn disabled() -> Self {
        Self {
            dir: PathBuf::new(),
            enabled: false,
        }
    }

    pub fn from_config(config: &ArtifactsConfig) -> Self {
        if config.enabled {
            Self::new(&config.dir)
        } else {
            Self::disabled()
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 공백이 아닌 스트림을 저장하고 실제로 쓴 파일 경로를 반환합니다.
    pub async fn write(&self, index: u8, result: &ProcessResult) -> Vec<PathBuf> {
        if !self.enabled {
            return Vec::new();
        }

        let mut written = Vec::new();
        for (suffix, content) in [("out", &result.stdout), ("err", &result.stderr)] {
            if is_blank(content) {
                continue;
            }
            let path = self.dir.join(format!("{index}-{suffix}.txt"));
            match tokio::fs::write(&path, content).await {
                Ok(()) => {
                    debug!(scenario = index, path = %path.display(), "artifact written");
                    written.push(path);
                }
                Err(e) => {
                    warn!(scenario = index, path = %path.display(), error = %e, "failed to write artifact");
                }
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_only_non_blank_streams() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());

        let written = writer
            .write(3, &ProcessResult::new(0, "  \n", "W: no match\n"))
            .await;
        assert_eq!(written, vec![dir.path().join("3-err.txt")]);
        assert!(!dir.path().join("3-out.txt").exists());
        let content = std::fs::read_to_string(dir.path().join("3-err.txt")).unwrap();
        assert_eq!(content, "W: no match\n");
    }

    #[tokio::test]
    async fn writes_both_streams() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path());
        let written = writer.write(11, &ProcessResult::new(1, "o", "e")).await;
        assert_eq!(written.len(), 2);
        assert!(dir.path().join("11-out.txt").exists());
        assert!(dir.path().join("11-err.txt").exists());
    }

    #[tokio::test]
    async fn disabled_writer_writes_nothing() {
        let written = ArtifactWriter::disabled()
            .write(1, &ProcessResult::new(0, "out", "err"))
            .await;
        assert!(written.is_empty());
    }

    #[tokio::test]
    async fn write_failure_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let writer = ArtifactWriter::new(dir.path().join("missing").join("nested"));
        let written = writer.write(2, &ProcessResult::new(0, "out", "")).await;
        assert!(written.is_empty());
    }

    #[test]
    fn from_config_respects_enabled_flag() {
        let config = ArtifactsConfig {
            enabled: false,
            dir: "/tmp".to_owned(),
        };
        let writer = ArtifactWriter::from_config(&config);
        assert!(writer.dir().as_os_str().is_empty());
    }
}
