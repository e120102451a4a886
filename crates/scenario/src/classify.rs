//! 실행 결과 판정
//!
//! 판정은 순수 함수입니다. 입력은 시나리오의 [`Rule`], 도구 실행 결과,
//! 데이터 있는 식별자뿐입니다.
//!
//! 식별자는 DICOM 값 표기 그대로 `[ID]` 형태로 찾고 대소문자를 구분하지
//! 않습니다. 오류 지시 문자열은 대소문자까지 정확히 일치해야 합니다.

use pacsprobe_core::{ProcessResult, Verdict};

use crate::scenario::Rule;

/// 규칙에 따라 실행 결과를 판정합니다.
pub fn classify(rule: Rule, result: &ProcessResult, good_id: &str) -> Verdict {
    let passed = match rule {
        Rule::ExitZero => result.success(),
        Rule::ExitZeroAndStderrHasIdentifier => {
            result.success() && has_identifier_value(&result.stderr, good_id)
        }
        Rule::ExitZeroAndSilent => {
            result.success() && is_blank(&result.stdout) && is_blank(&result.stderr)
        }
        Rule::StderrContains(needle) => !needle.is_empty() && result.stderr.contains(needle),
    };
    Verdict::from_bool(passed)
}

/// 공백 문자만 있거나 비어 있는지
pub fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// 덤프된 값 `[id]`가 있는지 (대소문자 무시)
fn has_identifier_value(stderr: &str, id: &str) -> bool {
    if id.is_empty() {
        return false;
    }
    let value = format!("[{}]", id.to_lowercase());
    stderr.to_lowercase().contains(&value)
}
