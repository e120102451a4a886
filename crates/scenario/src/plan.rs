//! 시나리오 실행 계획
//!
//! 디스크립터와 실행 파라미터로부터 한 시나리오의 구체적인 실행 계획을
//! 계산합니다: 어떤 식별자와 AE 타이틀을 쓰는지, 프로브가 어디로 접속하는지,
//! 중계가 필요하면 어떤 포트에서 어디로 중계하는지, 외부 도구의 인자 목록은
//! 무엇인지.
//!
//! ```text
//! outbound:  tool ──> 127.0.0.1:port+1 ══ relay(1024) ══> host:port
//! inbound:   PACS ──> listen_port ══ relay(10240) ══> 127.0.0.1:listen_port+1 <── tool --port
//! ```

use std::time::Duration;

use serde::Serialize;

use pacsprobe_core::ProbeConfig;
use pacsprobe_relay::RelayConfig;

use crate::config::RunConfig;
use crate::error::ScenarioError;
use crate::scenario::{BreakLeg, EndpointRole, Scenario, Tool};

/// 중계가 끊는 구간에서 프로브가 접속하는 로컬 주소
pub const LOOPBACK: &str = "127.0.0.1";

/// 외부 도구 호출 한 번
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Invocation {
    pub tool: Tool,
    /// 실행 파일 경로 또는 이름
    pub program: String,
    pub args: Vec<String>,
    /// 실행 시간 제한 (`None` = 무제한)
    #[serde(skip)]
    pub timeout: Option<Duration>,
}

impl Invocation {
    /// 로그용 명령줄 문자열
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// 시나리오가 사용하는 중계 세션 계획
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelayPlan {
    pub leg: BreakLeg,
    /// 중계가 리스닝할 포트
    pub listen_port: u16,
    /// 중계 대상
    pub remote_host: String,
    pub remote_port: u16,
    /// 방향별 바이트 예산
    pub byte_budget: usize,
}

impl RelayPlan {
    /// core 설정의 공통 중계 값과 합쳐 세션 설정을 만듭니다.
    pub fn to_config(&self, probe: &ProbeConfig) -> Result<RelayConfig, ScenarioError> {
        let config = RelayConfig::from_settings(
            &probe.relay,
            self.listen_port,
            self.remote_host.clone(),
            self.remote_port,
            self.byte_budget,
        )?;
        Ok(config)
    }
}

/// 시나리오 한 개의 구체적인 실행 계획
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioPlan {
    pub index: u8,
    /// 조회 식별자
    pub identifier: String,
    pub self_name: String,
    pub remote_name: String,
    pub move_name: String,
    /// 프로브가 접속할 호스트
    pub target_host: String,
    /// 프로브가 접속할 포트
    pub target_port: u16,
    /// move 응답을 받을 포트
    pub receive_port: u16,
    pub relay: Option<RelayPlan>,
    pub invocation: Invocation,
}

/// 시나리오의 실행 계획을 계산합니다.
///
/// # Errors
///
/// 파생 포트가 65535를 넘으면 [`ScenarioError::PortOverflow`]를 반환합니다.
pub fn plan(
    scenario: &Scenario,
    run: &RunConfig,
    probe: &ProbeConfig,
) -> Result<ScenarioPlan, ScenarioError> {
    let sentinel = probe.scenarios.unknown_ae_title.as_str();
    let name_for = |role: EndpointRole| -> String {
        if scenario.unknown_endpoint == Some(role) {
            sentinel.to_owned()
        } else {
            run.endpoint_name(role).to_owned()
        }
    };

    let mut target_host = run.remote_host.clone();
    let mut target_port = run.remote_port;
    let mut receive_port = run.listen_port;

    let relay = match scenario.break_leg {
        None => None,
        Some(BreakLeg::Outbound) => {
            let relay_port = successor(run.remote_port, "outbound relay")?;
            target_host = LOOPBACK.to_owned();
            target_port = relay_port;
            Some(RelayPlan {
                leg: BreakLeg::Outbound,
                listen_port: relay_port,
                remote_host: run.remote_host.clone(),
                remote_port: run.remote_port,
                byte_budget: probe.relay.outbound_budget_bytes,
            })
        }
        Some(BreakLeg::Inbound) => {
            let shadow_port = successor(run.listen_port, "inbound relay")?;
            receive_port = shadow_port;
            Some(RelayPlan {
                leg: BreakLeg::Inbound,
                listen_port: run.listen_port,
                remote_host: LOOPBACK.to_owned(),
                remote_port: shadow_port,
                byte_budget: probe.relay.inbound_budget_bytes,
            })
        }
    };

    let identifier = run.identifier(scenario.identifier).to_owned();
    let self_name = name_for(EndpointRole::SelfName);
    let remote_name = name_for(EndpointRole::Remote);
    let move_name = name_for(EndpointRole::MoveDestination);

    let args = match scenario.tool {
        Tool::Echo => vec![target_host.clone(), target_port.to_string()],
        Tool::Find => {
            let mut args = query_args(
                &identifier,
                &run.date_range,
                &target_host,
                target_port,
                &self_name,
                &remote_name,
            );
            args.extend(["-k".to_owned(), "0008,1030=".to_owned()]);
            args
        }
        Tool::Move => {
            let mut args = query_args(
                &identifier,
                &run.date_range,
                &target_host,
                target_port,
                &self_name,
                &remote_name,
            );
            args.extend([
                "-aem".to_owned(),
                move_name.clone(),
                "--port".to_owned(),
                receive_port.to_string(),
            ]);
            args
        }
    };

    let program = match scenario.tool {
        Tool::Echo => &probe.tools.echo,
        Tool::Find => &probe.tools.find,
        Tool::Move => &probe.tools.r#move,
    };
    let timeout = match probe.tools.timeout_secs {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };

    Ok(ScenarioPlan {
        index: scenario.index,
        identifier,
        self_name,
        remote_name,
        move_name,
        target_host,
        target_port,
        receive_port,
        relay,
        invocation: Invocation {
            tool: scenario.tool,
            program: program.clone(),
            args,
            timeout,
        },
    })
}

/// find/move 공통 인자: study 수준 조회, 환자 ID, 날짜 범위, 접속 대상, AE 타이틀
fn query_args(
    identifier: &str,
    date_range: &str,
    host: &str,
    port: u16,
    self_name: &str,
    remote_name: &str,
) -> Vec<String> {
    vec![
        "-P".to_owned(),
        "-k".to_owned(),
        "0008,0052=STUDY".to_owned(),
        "-k".to_owned(),
        format!("0010,0020={identifier}"),
        "-k".to_owned(),
        format!("0008,0020={date_range}"),
        host.to_owned(),
        port.to_string(),
        "-aet".to_owned(),
        self_name.to_owned(),
        "-aec".to_owned(),
        remote_name.to_owned(),
    ]
}

fn successor(port: u16, purpose: &'static str) -> Result<u16, ScenarioError> {
    port.checked_add(1)
        .ok_or(ScenarioError::PortOverflow { port, purpose })
}
