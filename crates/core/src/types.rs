//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// 외부 도구 1회 실행 결과
///
/// 프로세스가 종료되고 두 출력 스트림의 수집이 모두 끝난 뒤에만 생성됩니다.
/// 생성 이후에는 변경되지 않으며, 해당 시나리오의 판정 규칙에서만 사용됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// 종료 코드 (시그널로 종료된 경우 -1)
    pub exit_code: i32,
    /// 표준 출력 전체
    pub stdout: String,
    /// 표준 에러 전체
    pub stderr: String,
    /// 실행 시간
    #[serde(with = "duration_millis")]
    pub duration: Duration,
}

impl ProcessResult {
    /// 실행 시간 없이 결과를 생성합니다 (테스트 및 스텁 러너용).
    pub fn new(exit_code: i32, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            duration: Duration::ZERO,
        }
    }

    /// 종료 코드가 0인지 여부
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// 시나리오 판정 결과
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Fail,
}

impl Verdict {
    /// bool 판정을 Verdict로 변환
    pub fn from_bool(passed: bool) -> Self {
        if passed { Self::Pass } else { Self::Fail }
    }

    pub fn is_pass(self) -> bool {
        self == Self::Pass
    }

    /// 메트릭 레이블 값
    pub fn as_label(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "PASS"),
            Self::Fail => write!(f, "FAIL"),
        }
    }
}

mod duration_millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_display_is_uppercase() {
        assert_eq!(Verdict::Pass.to_string(), "PASS");
        assert_eq!(Verdict::Fail.to_string(), "FAIL");
    }

    #[test]
    fn verdict_from_bool() {
        assert_eq!(Verdict::from_bool(true), Verdict::Pass);
        assert_eq!(Verdict::from_bool(false), Verdict::Fail);
        assert!(!Verdict::Fail.is_pass());
    }

    #[test]
    fn verdict_serializes_uppercase() {
        let json = serde_json::to_string(&Verdict::Pass).unwrap();
        assert_eq!(json, "\"PASS\"");
    }

    #[test]
    fn process_result_success_only_on_zero() {
        assert!(ProcessResult::new(0, "", "").success());
        assert!(!ProcessResult::new(1, "", "").success());
        assert!(!ProcessResult::new(-1, "", "").success());
    }

    #[test]
    fn process_result_serializes_duration_as_millis() {
        let mut result = ProcessResult::new(0, "out", "err");
        result.duration = Duration::from_millis(1500);
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["duration"].as_u64(), Some(1500));
        assert_eq!(value["exit_code"].as_i64(), Some(0));
    }
}
