//! 시나리오 오케스트레이터
//!
//! [`Orchestrator`]는 시나리오를 번호 오름차순으로 하나씩 끝까지 실행합니다.
//! 한 시나리오는 다음 순서로 진행됩니다.
//!
//! ```text
//! plan ─> [relay start] ─> tool run ─> [relay finish] ─> artifacts ─> classify
//! ```
//!
//! 중계 세션은 도구가 종료된 뒤 반드시 정리되므로 두 세션이 동시에 열려 있는
//! 일은 없습니다. 중계 준비 실패나 도구 실행 실패는 해당 시나리오의 FAIL로
//! 기록되고 실행은 다음 시나리오로 계속됩니다.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use serde::Serialize;
use tracing::{debug, info};
use uuid::Uuid;

use pacsprobe_core::metrics::{
    LABEL_TOOL, LABEL_VERDICT, SCENARIOS_TOTAL, TOOL_DURATION_SECONDS,
};
use pacsprobe_core::{ProbeConfig, ProcessResult, Verdict};
use pacsprobe_relay::{RelaySession, RelayStats};

use crate::artifact::ArtifactWriter;
use crate::classify::classify;
use crate::config::RunConfig;
use crate::error::ScenarioError;
use crate::plan::{RelayPlan, ScenarioPlan, plan};
use crate::process::{ProcessRunner, TokioProcessRunner};
use crate::scenario::{self, Scenario};

/// 도구 종료 후 중계 세션이 스스로 끝나기를 기다리는 시간
pub const RELAY_DRAIN_GRACE: Duration = Duration::from_millis(500);

/// 시나리오 한 개의 실행 결과
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioOutcome {
    pub index: u8,
    pub intent: &'static str,
    pub verdict: Verdict,
    /// 도구 종료 코드 (실행되지 않았으면 `None`)
    pub exit_code: Option<i32>,
    /// 시나리오를 실패시킨 내부 에러
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 중계 세션 통계
    #[serde(skip_serializing_if = "Option::is_none")]
    pub relay: Option<RelayStats>,
    /// 저장한 아티팩트 경로
    pub artifacts: Vec<PathBuf>,
    pub duration_ms: u64,
}

impl ScenarioOutcome {
    fn failed(scenario: &Scenario, error: &ScenarioError, started: Instant) -> Self {
        Self {
            index: scenario.index,
            intent: scenario.intent,
            verdict: Verdict::Fail,
            exit_code: None,
            error: Some(error.to_string()),
            relay: None,
            artifacts: Vec::new(),
            duration_ms: elapsed_ms(started),
        }
    }
}

/// 한 번의 실행 전체 결과
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub passed: usize,
    pub failed: usize,
    pub outcomes: Vec<ScenarioOutcome>,
}

impl RunReport {
    pub fn new(run_id: Uuid, outcomes: Vec<ScenarioOutcome>) -> Self {
        let passed = outcomes.iter().filter(|o| o.verdict.is_pass()).count();
        Self {
            run_id,
            passed,
            failed: outcomes.len() - passed,
            outcomes,
        }
    }

    /// 모든 시나리오가 PASS인지
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }
}

/// 시나리오 오케스트레이터
pub struct Orchestrator<R: ProcessRunner = TokioProcessRunner> {
    run: RunConfig,
    probe: ProbeConfig,
    runner: R,
    artifacts: ArtifactWriter,
    selection: Option<Vec<u8>>,
}

impl Orchestrator<TokioProcessRunner> {
    /// 실제 프로세스 러너로 오케스트레이터를 생성합니다.
    pub fn new(run: RunConfig, probe: ProbeConfig) -> Result<Self, ScenarioError> {
        Self::with_runner(run, probe, TokioProcessRunner::new())
    }
}

impl<R: ProcessRunner> Orchestrator<R> {
    /// 지정한 러너로 오케스트레이터를 생성합니다.
    ///
    /// 실행 파라미터를 검증하며, 실패하면 어떤 시나리오도 실행할 수 없습니다.
    pub fn with_runner(
        run: RunConfig,
        probe: ProbeConfig,
        runner: R,
    ) -> Result<Self, ScenarioError> {
        run.validate()?;
        let artifacts = ArtifactWriter::from_config(&probe.artifacts);
        Ok(Self {
            run,
            probe,
            runner,
            artifacts,
            selection: None,
        })
    }

    /// 아티팩트 저장기를 교체합니다.
    pub fn artifacts(mut self, writer: ArtifactWriter) -> Self {
        self.artifacts = writer;
        self
    }

    /// 실행할 시나리오 번호를 제한합니다. 실행 순서는 항상 오름차순입니다.
    pub fn select(mut self, indices: &[u8]) -> Result<Self, ScenarioError> {
        if let Some(unknown) = indices.iter().find(|i| scenario::get(**i).is_none()) {
            return Err(ScenarioError::Config {
                field: "only".to_owned(),
                reason: format!("no scenario numbered {unknown}"),
            });
        }
        self.selection = Some(indices.to_vec());
        Ok(self)
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// 실행 대상 시나리오 (오름차순)
    pub fn scenarios(&self) -> Vec<&'static Scenario> {
        scenario::all()
            .iter()
            .filter(|s| {
                self.selection
                    .as_ref()
                    .is_none_or(|selected| selected.contains(&s.index))
            })
            .collect()
    }

    /// 모든 대상 시나리오를 실행합니다.
    pub async fn run_all(&self) -> RunReport {
        self.run_with(|_| {}).await
    }

    /// 모든 대상 시나리오를 실행하며, 시나리오가 끝날 때마다 콜백을 호출합니다.
    pub async fn run_with<F>(&self, mut on_outcome: F) -> RunReport
    where
        F: FnMut(&ScenarioOutcome),
    {
        let run_id = Uuid::new_v4();
        let scenarios = self.scenarios();
        info!(run_id = %run_id, scenarios = scenarios.len(), "run started");

        let mut outcomes = Vec::with_capacity(scenarios.len());
        for scenario in scenarios {
            let outcome = self.run_scenario(scenario).await;
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        let report = RunReport::new(run_id, outcomes);
        info!(
            run_id = %run_id,
            passed = report.passed,
            failed = report.failed,
            "run finished"
        );
        report
    }

    /// 시나리오 하나를 끝까지 실행합니다. 항상 판정 하나를 돌려줍니다.
    pub async fn run_scenario(&self, scenario: &Scenario) -> ScenarioOutcome {
        let started = Instant::now();
        let outcome = match plan(scenario, &self.run, &self.probe) {
            Ok(plan) => self.execute(scenario, plan, started).await,
            Err(e) => ScenarioOutcome::failed(scenario, &e, started),
        };

        if let Some(error) = &outcome.error {
            info!(scenario = scenario.index, error = %error, "scenario failed internally");
        }
        debug!(
            scenario = scenario.index,
            verdict = %outcome.verdict,
            exit_code = ?outcome.exit_code,
            "scenario finished"
        );
        counter!(SCENARIOS_TOTAL, LABEL_VERDICT => outcome.verdict.as_label()).increment(1);
        outcome
    }

    async fn execute(
        &self,
        scenario: &Scenario,
        plan: ScenarioPlan,
        started: Instant,
    ) -> ScenarioOutcome {
        // 프로세스를 띄우기 전에 중계 리스너가 바인드되어 있어야 한다
        let session = match &plan.relay {
            Some(relay_plan) => match self.start_relay(relay_plan).await {
                Ok(session) => Some(session),
                Err(e) => return ScenarioOutcome::failed(scenario, &e, started),
            },
            None => None,
        };

        let tool_started = Instant::now();
        let result = self.runner.run(&plan.invocation).await;
        histogram!(TOOL_DURATION_SECONDS, LABEL_TOOL => scenario.tool.as_str())
            .record(tool_started.elapsed().as_secs_f64());

        let relay = match session {
            Some(session) => Some(session.finish(RELAY_DRAIN_GRACE).await),
            None => None,
        };

        let result = match result {
            Ok(result) => result,
            Err(e) => {
                let mut outcome =
                    ScenarioOutcome::failed(scenario, &ScenarioError::from(e), started);
                outcome.relay = relay.and_then(Result::ok);
                return outcome;
            }
        };

        let artifacts = self.artifacts.write(scenario.index, &result).await;

        let (verdict, error, relay) = match relay {
            Some(Err(e)) => (Verdict::Fail, Some(ScenarioError::from(e).to_string()), None),
            Some(Ok(stats)) => (self.judge(scenario, &result), None, Some(stats)),
            None => (self.judge(scenario, &result), None, None),
        };

        ScenarioOutcome {
            index: scenario.index,
            intent: scenario.intent,
            verdict,
            exit_code: Some(result.exit_code),
            error,
            relay,
            artifacts,
            duration_ms: elapsed_ms(started),
        }
    }

    async fn start_relay(
        &self,
        relay_plan: &RelayPlan,
    ) -> Result<RelaySession, ScenarioError> {
        let config = relay_plan.to_config(&self.probe)?;
        let session = RelaySession::start(config).await?;
        debug!(
            leg = ?relay_plan.leg,
            listen = %session.local_addr(),
            target = %session.target(),
            "relay ready"
        );
        Ok(session)
    }

    fn judge(&self, scenario: &Scenario, result: &ProcessResult) -> Verdict {
        classify(scenario.rule, result, &self.run.good_id)
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
