//! Single-flight packaging job subsystem.
//!
//! Drives `IntuneWinAppUtil.exe` (or any tool with the same flags) as one
//! background job at a time:
//!
//! 1. [`validate`] turns raw inputs into a [`PackagingRequest`]
//! 2. [`JobRunner::start`] launches the tool off the caller's loop
//! 3. [`JobRunner::tick`] is polled on a fixed period until it reports
//!    [`PollOutcome::Finished`]
//! 4. the [`Classifier`] decides success or failure from the [`JobResult`]
//!
//! # Example
//!
//! ```no_run
//! use intunewin_packager::config::PackagerConfig;
//! use intunewin_packager::packager::{JobRunner, LogCrateSink, PollOutcome, validate};
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PackagerConfig::default();
//! let request = validate(
//!     r"C:\pkg\src",
//!     r"C:\pkg\src\setup.exe",
//!     r"C:\pkg\out",
//!     Path::new(r"C:\Tools\IntuneWinAppUtil.exe"),
//! )?;
//!
//! let mut runner = JobRunner::new(
//!     tokio::runtime::Handle::current(),
//!     config.clone(),
//!     Arc::new(LogCrateSink),
//! );
//! runner.start(request)?;
//!
//! let mut interval = tokio::time::interval(config.poll_interval());
//! loop {
//!     interval.tick().await;
//!     if let PollOutcome::Finished { outcome, .. } = runner.tick() {
//!         println!("{outcome:?}");
//!         break;
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod artifacts;
mod classifier;
pub mod error;
mod gate;
mod job;
mod poller;
mod request;
mod runner;
mod sink;
mod tool;

pub use artifacts::{ArtifactReport, describe_artifact, discover_output_files};
pub use classifier::{Classifier, Outcome, SuccessSignal};
pub use error::{StartError, ValidationError};
pub use gate::BusyGate;
pub use job::{JobHandle, JobResult, JobState};
pub use poller::PollOutcome;
pub use request::{PackagingRequest, SetupChoice, is_descendant, validate};
pub use runner::JobRunner;
pub use sink::{LogCrateSink, LogEvent, LogLevel, LogSink, MemorySink};
pub use tool::{ToolInvocation, resolve_tool};
