//! Win32 installer packaging for Intune.
//!
//! This library wraps the Win32 Content Prep Tool (`IntuneWinAppUtil.exe`)
//! in a single-flight background job:
//! - input validation into an immutable request
//! - out-of-process launch with fully buffered output
//! - non-blocking completion polling with a synthetic progress estimate
//! - layered success classification (exit code, completion marker, artifacts)
//!
//! It can be used both as a CLI tool and as a library dependency.

pub mod cli;
pub mod config;
pub mod error;
pub mod packager;

// Re-export commonly used types
pub use error::{CliError, PackagerError, Result};
