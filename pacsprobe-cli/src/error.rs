//! CLI-specific error types and exit code mapping

use pacsprobe_core::error::PacsProbeError;
use pacsprobe_scenario::ScenarioError;

/// CLI-specific error type.
///
/// Each variant carries enough context for a user-friendly message.
/// The `exit_code()` method maps errors to standard Unix exit codes.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Configuration loading or validation failure.
    #[error("configuration error: {0}")]
    Config(String),

    /// A subcommand-specific operation failed.
    #[error("{0}")]
    Command(String),

    /// The run completed but at least one scenario did not pass.
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed { failed: usize, total: usize },

    /// JSON serialisation failed during output rendering.
    #[error("json output error: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    /// IO error (file read, stdout write, etc.).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Wrapped domain error from pacsprobe-core.
    #[error("{0}")]
    Core(#[from] PacsProbeError),
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// | Code | Meaning                               |
    /// |------|---------------------------------------|
    /// | 0    | Success (every scenario passed)       |
    /// | 1    | General / command error               |
    /// | 2    | Configuration error                   |
    /// | 4    | One or more scenarios failed          |
    /// | 10   | IO error                              |
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Core(PacsProbeError::Config(_)) => 2,
            Self::ScenariosFailed { .. } => 4,
            Self::Io(_) | Self::Core(PacsProbeError::Io(_)) => 10,
            Self::JsonSerialize(_) | Self::Command(_) | Self::Core(_) => 1,
        }
    }
}

impl From<ScenarioError> for CliError {
    fn from(e: ScenarioError) -> Self {
        match e {
            ScenarioError::Config { .. } | ScenarioError::PortOverflow { .. } => {
                Self::Config(e.to_string())
            }
            other => Self::Command(other.to_string()),
        }
    }
}
