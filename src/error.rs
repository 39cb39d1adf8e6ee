//! Crate-level error types.
//!
//! Everything a caller of the binary can hit funnels into [`PackagerError`] so
//! `main` has one place to print and map to an exit code.

use thiserror::Error;

/// Result type alias for packager operations
pub type Result<T> = std::result::Result<T, PackagerError>;

/// Main error type for all packager operations
#[derive(Error, Debug)]
pub enum PackagerError {
    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Configuration errors
    #[error("Config error: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// Inputs rejected before a job could start
    #[error("Validation failed: {0}")]
    Validation(#[from] crate::packager::ValidationError),

    /// Job could not be started
    #[error("{0}")]
    Start(#[from] crate::packager::StartError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },
}

impl PackagerError {
    /// Short hint printed under the error message
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        use crate::packager::ValidationError as V;
        match self {
            PackagerError::Validation(V::UnsupportedExtension { .. }) => {
                Some("Select the .exe or .msi installer, not a script or archive")
            }
            PackagerError::Validation(V::SetupOutsideSource { .. }) => {
                Some("Pick a source folder that contains the setup file")
            }
            PackagerError::Validation(V::ToolMissing { .. }) => {
                Some("Install IntuneWinAppUtil.exe or pass its location with --tool")
            }
            PackagerError::Start(_) => Some("Wait for the running job to finish"),
            _ => None,
        }
    }
}
