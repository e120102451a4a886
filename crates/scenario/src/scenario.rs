//! 시나리오 매트릭스
//!
//! 11개 시나리오는 모두 선언형 [`Scenario`] 디스크립터로 표현되며,
//! 오케스트레이터는 시나리오 번호에 따른 분기 없이 디스크립터만 읽어
//! 실행합니다.

use std::fmt;

use serde::Serialize;

/// 시나리오에서 호출하는 외부 도구
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// 연결 확인 (`echoscu`)
    Echo,
    /// 조회 (`findscu`)
    Find,
    /// 전송 (`movescu`)
    Move,
}

impl Tool {
    /// 메트릭/로그 레이블
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Echo => "echo",
            Self::Find => "find",
            Self::Move => "move",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 조회에 사용할 식별자 분류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentifierClass {
    /// 데이터가 있는 식별자
    HasData,
    /// 유효하지만 데이터가 없는 식별자
    NoData,
    /// 존재하지 않는 식별자
    Invalid,
}

/// AE 타이틀 역할
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EndpointRole {
    /// 이 도구 자신 (`-aet`)
    SelfName,
    /// 원격 PACS (`-aec`)
    Remote,
    /// move 목적지 (`-aem`)
    MoveDestination,
}

/// 연결을 끊을 구간
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakLeg {
    /// 프로브 → 원격 PACS 구간
    Outbound,
    /// 원격 PACS → 로컬 move 수신 구간
    Inbound,
}

/// 판정 규칙
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "needle")]
pub enum Rule {
    /// 종료 코드 0
    ExitZero,
    /// 종료 코드 0이고 stderr에 데이터 있는 식별자가 포함됨
    ExitZeroAndStderrHasIdentifier,
    /// 종료 코드 0이고 두 스트림이 모두 비어 있음 (공백만 허용)
    ExitZeroAndSilent,
    /// 종료 코드와 무관하게 stderr에 문자열이 포함됨
    StderrContains(&'static str),
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExitZero => write!(f, "exit zero"),
            Self::ExitZeroAndStderrHasIdentifier => write!(f, "exit zero + stderr has id"),
            Self::ExitZeroAndSilent => write!(f, "exit zero + silent"),
            Self::StderrContains(needle) => write!(f, "stderr has '{needle}'"),
        }
    }
}

/// 시나리오 디스크립터
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Scenario {
    /// 시나리오 번호 (1..=11)
    pub index: u8,
    /// 시나리오 의도
    pub intent: &'static str,
    pub tool: Tool,
    pub identifier: IdentifierClass,
    /// 센티넬 AE 타이틀로 바꿀 역할
    pub unknown_endpoint: Option<EndpointRole>,
    /// 중계로 끊을 구간
    pub break_leg: Option<BreakLeg>,
    pub rule: Rule,
}

impl Scenario {
    const fn new(index: u8, intent: &'static str, tool: Tool, rule: Rule) -> Self {
        Self {
            index,
            intent,
            tool,
            identifier: IdentifierClass::HasData,
            unknown_endpoint: None,
            break_leg: None,
            rule,
        }
    }

    const fn identifier(mut self, class: IdentifierClass) -> Self {
        self.identifier = class;
        self
    }

    const fn unknown(mut self, role: EndpointRole) -> Self {
        self.unknown_endpoint = Some(role);
        self
    }

    const fn breaks(mut self, leg: BreakLeg) -> Self {
        self.break_leg = Some(leg);
        self
    }
}

/// 시나리오 매트릭스 (번호 오름차순)
pub const SCENARIOS: [Scenario; 11] = [
    Scenario::new(1, "basic connectivity check", Tool::Echo, Rule::ExitZero),
    Scenario::new(
        2,
        "query with data present",
        Tool::Find,
        Rule::ExitZeroAndStderrHasIdentifier,
    ),
    Scenario::new(
        3,
        "query with no data present",
        Tool::Find,
        Rule::ExitZeroAndSilent,
    )
    .identifier(IdentifierClass::NoData),
    Scenario::new(
        4,
        "query with invalid identifier",
        Tool::Find,
        Rule::ExitZeroAndSilent,
    )
    .identifier(IdentifierClass::Invalid),
    Scenario::new(5, "transfer with data present", Tool::Move, Rule::ExitZero),
    Scenario::new(6, "transfer with no data present", Tool::Move, Rule::ExitZero)
        .identifier(IdentifierClass::NoData),
    Scenario::new(
        7,
        "outbound connection severed mid-retrieve",
        Tool::Move,
        Rule::ExitZero,
    )
    .identifier(IdentifierClass::Invalid)
    .breaks(BreakLeg::Outbound),
    Scenario::new(
        8,
        "inbound connection severed mid-transfer",
        Tool::Move,
        Rule::ExitZero,
    )
    .breaks(BreakLeg::Inbound),
    Scenario::new(
        9,
        "unknown local endpoint name",
        Tool::Move,
        Rule::StderrContains("MoveDestinationUnknown"),
    )
    .unknown(EndpointRole::SelfName),
    Scenario::new(10, "unknown remote endpoint name", Tool::Move, Rule::ExitZero)
        .unknown(EndpointRole::Remote),
    Scenario::new(
        11,
        "unknown move-destination name",
        Tool::Move,
        Rule::StderrContains("error"),
    )
    .unknown(EndpointRole::MoveDestination),
];

/// 전체 시나리오 (번호 오름차순)
pub fn all() -> &'static [Scenario] {
    &SCENARIOS
}

/// 번호로 시나리오를 찾습니다.
pub fn get(index: u8) -> Option<&'static Scenario> {
    SCENARIOS.iter().find(|s| s.index == index)
}
