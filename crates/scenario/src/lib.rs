//! pacsprobe 시나리오 매트릭스
//!
//! 외부 DICOM 도구(`echoscu`, `findscu`, `movescu`)를 정해진 11개 시나리오로
//! 실행하고, 각 실행의 종료 코드와 출력으로 PASS/FAIL을 판정합니다.
//! 연결 절단 시나리오에서는 [`pacsprobe_relay`] 세션을 경로에 끼워 넣습니다.
//!
//! # 모듈 구성
//!
//! - [`config`]: 운영자 실행 파라미터와 검증
//! - [`scenario`]: 선언형 시나리오 디스크립터 테이블
//! - [`plan`]: 시나리오별 식별자/AE 타이틀/포트/인자 계산
//! - [`process`]: 외부 도구 실행 추상화
//! - [`classify`]: 판정 규칙
//! - [`artifact`]: 출력 아티팩트 저장
//! - [`orchestrator`]: 순차 실행 엔진
//! - [`error`]: 도메인 에러 타입

pub mod artifact;
pub mod classify;
pub mod config;
pub mod error;
pub mod orchestrator;
pub mod plan;
pub mod process;
pub mod scenario;

// --- 주요 타입 re-export ---

pub use artifact::ArtifactWriter;
pub use classify::classify;
pub use config::RunConfig;
pub use error::ScenarioError;
pub use orchestrator::{Orchestrator, RunReport, ScenarioOutcome};
pub use plan::{Invocation, RelayPlan, ScenarioPlan};
pub use process::{ProcessRunner, TokioProcessRunner};
pub use scenario::{BreakLeg, EndpointRole, IdentifierClass, Rule, Scenario, Tool};
