//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// pacsprobe -- fault-injection test matrix for PACS query/retrieve endpoints.
///
/// Use `pacsprobe <COMMAND> --help` for subcommand details.
#[derive(Parser, Debug)]
#[command(name = "pacsprobe", version, about, long_about = None)]
pub struct Cli {
    /// Path to a pacsprobe.toml configuration file (defaults + env overrides when omitted).
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override log level (trace, debug, info, warn, error).
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Output format.
    #[arg(long, global = true, default_value = "text")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output.
    Text,
    /// Machine-readable JSON.
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scenario matrix against a remote PACS.
    Run(RunArgs),

    /// List the scenario matrix.
    Scenarios,

    /// Manage configuration.
    Config(ConfigArgs),
}

// ---- run ----

/// Run the scenario matrix and print one PASS/FAIL line per scenario.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Patient ID that has studies in the date range.
    #[arg(short = 'g', long)]
    pub good_id: String,

    /// Patient ID that exists but has no studies in the date range.
    #[arg(short = 'e', long)]
    pub empty_id: String,

    /// Patient ID that does not exist.
    #[arg(short = 'b', long)]
    pub bad_id: String,

    /// DICOM date range, e.g. 20200101-20201231.
    #[arg(short = 'd', long)]
    pub date_range: String,

    /// Remote PACS host.
    #[arg(short = 'H', long)]
    pub host: String,

    /// Remote PACS port.
    #[arg(short = 'p', long, default_value_t = 104)]
    pub port: u16,

    /// Local port that receives C-MOVE sub-operations.
    #[arg(short = 'o', long, default_value_t = 104)]
    pub listen_port: u16,

    /// AE title of the remote PACS.
    #[arg(short = 'n', long)]
    pub remote_name: String,

    /// AE title of this tool.
    #[arg(short = 's', long)]
    pub self_name: String,

    /// AE title of the move destination.
    #[arg(short = 'm', long)]
    pub move_name: String,

    /// Print a summary and raise logging to debug.
    #[arg(short, long)]
    pub verbose: bool,

    /// Run only these scenario numbers (comma separated).
    #[arg(long, value_delimiter = ',')]
    pub only: Option<Vec<u8>>,

    /// Override the artifact directory for captured tool output.
    #[arg(long)]
    pub artifacts_dir: Option<PathBuf>,
}

// ---- config ----

/// Manage pacsprobe configuration.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Validate the configuration file and report errors.
    Validate,
    /// Show the effective configuration (file + env overrides + defaults).
    Show {
        /// Show only a specific section (general, relay, tools, artifacts, scenarios).
        #[arg(long)]
        section: Option<String>,
    },
}
