//! `pacsprobe run` command handler

use std::io::Write;

use tracing::info;

use pacsprobe_core::ProbeConfig;
use pacsprobe_scenario::{Orchestrator, RunConfig, RunReport, ScenarioOutcome};

use crate::cli::{OutputFormat, RunArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `run` command.
///
/// Text mode streams one `Test N: PASS|FAIL` line per scenario as it
/// finishes; JSON mode prints the full report once the run is over.
///
/// # Errors
///
/// - `CliError::Config` if the run parameters are invalid (no scenario runs)
/// - `CliError::ScenariosFailed` if any scenario did not pass (exit code 4)
pub async fn execute(
    args: RunArgs,
    mut probe: ProbeConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    if let Some(dir) = &args.artifacts_dir {
        probe.artifacts.dir = dir.display().to_string();
    }

    let verbose = args.verbose;
    let only = args.only.clone();
    let run = run_config(args);

    let mut orchestrator = Orchestrator::new(run, probe)?;
    if let Some(indices) = only {
        orchestrator = orchestrator.select(&indices)?;
    }

    info!(scenarios = orchestrator.scenarios().len(), "starting scenario run");

    let mut stream_error = None;
    let report = orchestrator
        .run_with(|outcome| {
            if stream_error.is_some() {
                return;
            }
            if let Err(e) = writer.stream(&TestLine(outcome)) {
                stream_error = Some(e);
            }
        })
        .await;
    if let Some(e) = stream_error {
        return Err(e);
    }

    match writer.format() {
        OutputFormat::Json => writer.render(&report)?,
        OutputFormat::Text if verbose => writer.stream(&Summary(&report))?,
        OutputFormat::Text => {}
    }

    if report.all_passed() {
        Ok(())
    } else {
        Err(CliError::ScenariosFailed {
            failed: report.failed,
            total: report.outcomes.len(),
        })
    }
}

fn run_config(args: RunArgs) -> RunConfig {
    RunConfig {
        good_id: args.good_id,
        empty_id: args.empty_id,
        bad_id: args.bad_id,
        date_range: args.date_range,
        remote_host: args.host,
        remote_port: args.port,
        listen_port: args.listen_port,
        remote_name: args.remote_name,
        self_name: args.self_name,
        move_name: args.move_name,
    }
}

/// One `Test N: PASS|FAIL` line.
struct TestLine<'a>(&'a ScenarioOutcome);

impl Render for TestLine<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w, "Test {}: {}", self.0.index, self.0.verdict)
    }
}

/// Verbose summary printed after the per-scenario lines.
struct Summary<'a>(&'a RunReport);

impl Render for Summary<'_> {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        let report = self.0;
        let failed = if report.failed == 0 {
            format!("{} failed", report.failed).normal()
        } else {
            format!("{} failed", report.failed).red().bold()
        };
        writeln!(
            w,
            "{} passed, {}",
            format!("{}", report.passed).green().bold(),
            failed
        )?;
        for outcome in report.outcomes.iter().filter(|o| o.error.is_some()) {
            writeln!(
                w,
                "  Test {}: {}",
                outcome.index,
                outcome.error.as_deref().unwrap_or_default().red()
            )?;
        }
        Ok(())
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        Summary(self).render_text(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pacsprobe_core::Verdict;

    fn outcome(index: u8, verdict: Verdict, error: Option<&str>) -> ScenarioOutcome {
        ScenarioOutcome {
            index,
            intent: "test",
            verdict,
            exit_code: Some(0),
            error: error.map(str::to_owned),
            relay: None,
            artifacts: Vec::new(),
            duration_ms: 1,
        }
    }

    fn render<T: Render>(payload: &T) -> String {
        let mut buffer = Vec::new();
        payload
            .render_text(&mut buffer)
            .expect("text rendering should succeed");
        String::from_utf8(buffer).expect("valid UTF-8")
    }

    #[test]
    fn test_line_format() {
        assert_eq!(render(&TestLine(&outcome(3, Verdict::Pass, None))), "Test 3: PASS\n");
        assert_eq!(render(&TestLine(&outcome(11, Verdict::Fail, None))), "Test 11: FAIL\n");
    }

    #[test]
    fn test_summary_lists_internal_errors() {
        colored::control::set_override(false);
        let report = RunReport::new(
            uuid_nil(),
            vec![
                outcome(1, Verdict::Pass, None),
                outcome(7, Verdict::Fail, Some("relay: failed to bind 0.0.0.0:105")),
            ],
        );
        let output = render(&Summary(&report));
        assert!(output.starts_with("1 passed, 1 failed\n"));
        assert!(output.contains("Test 7: relay: failed to bind"));
        assert!(!output.contains("Test 1:"));
    }

    fn uuid_nil() -> uuid::Uuid {
        uuid::Uuid::nil()
    }
}
