//! 실행 파라미터
//!
//! [`RunConfig`]는 운영자가 한 번의 실행에 지정하는 값(식별자 3종, 날짜 범위,
//! 원격 PACS 주소, AE 타이틀)을 담습니다. 모든 값은 시나리오 실행 전에
//! [`RunConfig::validate`]로 검증되며, 검증에 실패하면 어떤 시나리오도
//! 실행되지 않습니다.

use serde::Serialize;

use crate::error::ScenarioError;
use crate::scenario::{EndpointRole, IdentifierClass};

/// DICOM AE 타이틀 최대 길이
pub const AE_TITLE_MAX_LEN: usize = 16;

/// DICOM 기본 포트
pub const DEFAULT_DICOM_PORT: u16 = 104;

/// 한 번의 실행에 대한 운영자 파라미터
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// 데이터가 있는 환자 식별자
    pub good_id: String,
    /// 데이터가 없는 환자 식별자
    pub empty_id: String,
    /// 존재하지 않는 환자 식별자
    pub bad_id: String,
    /// DICOM 날짜 범위 (`YYYYMMDD-YYYYMMDD` 등)
    pub date_range: String,
    /// 원격 PACS 호스트
    pub remote_host: String,
    /// 원격 PACS 포트
    pub remote_port: u16,
    /// move 응답을 받을 로컬 포트
    pub listen_port: u16,
    /// 원격 PACS AE 타이틀
    pub remote_name: String,
    /// 이 도구의 AE 타이틀
    pub self_name: String,
    /// move 목적지 AE 타이틀
    pub move_name: String,
}

impl RunConfig {
    /// 식별자 분류에 해당하는 운영자 식별자
    pub fn identifier(&self, class: IdentifierClass) -> &str {
        match class {
            IdentifierClass::HasData => &self.good_id,
            IdentifierClass::NoData => &self.empty_id,
            IdentifierClass::Invalid => &self.bad_id,
        }
    }

    /// 역할에 해당하는 AE 타이틀
    pub fn endpoint_name(&self, role: EndpointRole) -> &str {
        match role {
            EndpointRole::SelfName => &self.self_name,
            EndpointRole::Remote => &self.remote_name,
            EndpointRole::MoveDestination => &self.move_name,
        }
    }

    /// 모든 파라미터의 유효성을 검증합니다.
    ///
    /// 파생 포트(`port + 1`)를 쓰는 시나리오가 있으므로 두 포트 모두
    /// 65535 미만이어야 합니다.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        for (field, value) in [
            ("good_id", &self.good_id),
            ("empty_id", &self.empty_id),
            ("bad_id", &self.bad_id),
            ("host", &self.remote_host),
        ] {
            if value.trim().is_empty() {
                return Err(invalid(field, "must not be empty"));
            }
        }

        validate_date_range(&self.date_range)?;

        for (field, value) in [
            ("remote_name", &self.remote_name),
            ("self_name", &self.self_name),
            ("move_name", &self.move_name),
        ] {
            validate_ae_title(field, value)?;
        }

        for (field, port) in [("port", self.remote_port), ("listen_port", self.listen_port)] {
            if port == 0 {
                return Err(invalid(field, "must be greater than 0"));
            }
            if port == u16::MAX {
                return Err(invalid(field, "must leave room for port + 1"));
            }
        }

        Ok(())
    }
}

/// AE 타이틀 검증: 1~16자, 백슬래시와 제어 문자 금지
pub fn validate_ae_title(field: &str, value: &str) -> Result<(), ScenarioError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    if value.chars().count() > AE_TITLE_MAX_LEN {
        return Err(invalid(
            field,
            &format!("must be at most {AE_TITLE_MAX_LEN} characters"),
        ));
    }
    if value.chars().any(|c| c == '\\' || c.is_control()) {
        return Err(invalid(
            field,
            "must not contain backslashes or control characters",
        ));
    }
    Ok(())
}

/// DICOM DA 범위 검증
///
/// 허용 형식: `YYYYMMDD`, `YYYYMMDD-`, `-YYYYMMDD`, `YYYYMMDD-YYYYMMDD`.
/// 양쪽이 모두 있으면 시작이 끝보다 늦을 수 없습니다.
pub fn validate_date_range(value: &str) -> Result<(), ScenarioError> {
    const FIELD: &str = "date_range";
    const EXPECTED: &str = "expected YYYYMMDD, YYYYMMDD-, -YYYYMMDD or YYYYMMDD-YYYYMMDD";

    let (start, end) = match value.split_once('-') {
        Some((start, end)) => (start, end),
        None => (value, value),
    };

    if start.is_empty() && end.is_empty() {
        return Err(invalid(FIELD, EXPECTED));
    }
    for part in [start, end] {
        if !part.is_empty() && !is_dicom_date(part) {
            return Err(invalid(FIELD, EXPECTED));
        }
    }
    if !start.is_empty() && !end.is_empty() && start > end {
        return Err(invalid(FIELD, "start date is after end date"));
    }
    Ok(())
}

fn is_dicom_date(s: &str) -> bool {
    if s.len() != 8 || !s.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let month: u32 = s[4..6].parse().unwrap_or(0);
    let day: u32 = s[6..8].parse().unwrap_or(0);
    (1..=12).contains(&month) && (1..=31).contains(&day)
}

fn invalid(field: &str, reason: &str) -> ScenarioError {
    ScenarioError::Config {
        field: field.to_owned(),
        reason: reason.to_owned(),
    }
}
