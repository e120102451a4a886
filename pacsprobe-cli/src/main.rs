//! pacsprobe -- fault-injection test matrix for PACS query/retrieve endpoints.

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;

use pacsprobe_core::ProbeConfig;
use pacsprobe_core::config::GeneralConfig;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let code = u8::try_from(e.exit_code()).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.as_deref();
    let log_level = cli.log_level.as_deref();
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        // config subcommands report load failures themselves
        Commands::Config(args) => {
            init_logging(log_level, false, &GeneralConfig::default());
            commands::config::execute(args, config_path, &writer).await
        }
        Commands::Run(args) => {
            let config = prepare(config_path, log_level, args.verbose).await?;
            commands::run::execute(args, config, &writer).await
        }
        Commands::Scenarios => {
            prepare(config_path, log_level, false).await?;
            commands::scenarios::execute(&writer)
        }
    }
}

/// Load the effective configuration and initialize logging from it.
async fn prepare(
    config_path: Option<&Path>,
    log_level: Option<&str>,
    verbose: bool,
) -> Result<ProbeConfig, CliError> {
    let config = commands::config::load(config_path).await?;
    init_logging(log_level, verbose, &config.general);
    pacsprobe_core::metrics::describe_metrics();
    Ok(config)
}

/// Initialize tracing; a logging failure is reported but never aborts the command.
fn init_logging(explicit: Option<&str>, verbose: bool, general: &GeneralConfig) {
    let level = logging::effective_level(explicit, verbose, &general.log_level);
    if let Err(e) = logging::init_tracing(level, &general.log_format) {
        eprintln!("warning: {e}");
    }
}
