//! Error types for the packaging job subsystem.
//!
//! Every variant here is recoverable: the caller reports it and no job is started.
//! Faults that happen while the external tool runs are not errors at this level,
//! they are folded into the job's [`JobResult`](super::JobResult).

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a set of raw inputs cannot become a [`PackagingRequest`](super::PackagingRequest).
///
/// Checks run in the order the variants are declared; the first failure wins.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Source folder is blank, cannot be normalized, or is not an existing directory
    #[error("Source folder is invalid: {path}")]
    SourceFolderInvalid {
        /// Path as given (or normalized, when normalization succeeded)
        path: PathBuf,
    },

    /// No setup file was chosen, or the chosen path is not an existing file
    #[error("Setup file is invalid: {path}")]
    SetupFileInvalid {
        /// Path as given (empty when nothing was selected)
        path: PathBuf,
    },

    /// Setup file is neither `.exe` nor `.msi`
    #[error("Unsupported setup file extension '{extension}' (expected .exe or .msi): {path}")]
    UnsupportedExtension {
        /// Offending setup file
        path: PathBuf,
        /// Extension found, empty if the file has none
        extension: String,
    },

    /// Setup file does not live under the source folder
    #[error("Setup file {setup} is not inside source folder {source_folder}")]
    SetupOutsideSource {
        /// Normalized setup file path
        setup: PathBuf,
        /// Normalized source folder path
        source_folder: PathBuf,
    },

    /// Output folder could not be normalized or created
    #[error("Output folder is unavailable: {path} ({reason})")]
    OutputFolderUnavailable {
        /// Normalized output folder path
        path: PathBuf,
        /// Underlying failure
        reason: String,
    },

    /// Packaging tool executable was not found
    #[error("Packaging tool not found: {path}")]
    ToolMissing {
        /// Location that was checked
        path: PathBuf,
    },
}

/// Reasons [`JobRunner::start`](super::JobRunner::start) refuses a request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StartError {
    /// Another job holds the busy gate
    #[error("A packaging job is already running")]
    AlreadyRunning,
}

/// Result alias for validation
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
