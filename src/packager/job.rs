//! Job records and results.

use super::request::PackagingRequest;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

/// Lifecycle of the runner's single job slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum JobState {
    Idle,
    Running,
    /// The tool has exited and the result is waiting to be collected by `tick`
    Completed,
}

/// Caller-facing view of a started job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobHandle {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub request: PackagingRequest,
}

/// Everything observed about one finished run of the tool.
///
/// Produced exactly once per job and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JobResult {
    pub job_id: Uuid,
    /// `None` when the process ended without reporting one (e.g. killed by a signal)
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
    /// Package files in the output folder after exit, newest first
    pub output_files: Vec<PathBuf>,
    /// Quoted argument string passed to the tool
    pub args: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
}

impl JobResult {
    /// Result for a run that never produced a process status.
    pub(crate) fn fault(
        job_id: Uuid,
        args: String,
        started_at: DateTime<Utc>,
        elapsed: Duration,
        message: impl Into<String>,
    ) -> Self {
        Self {
            job_id,
            exit_code: Some(-1),
            stdout: String::new(),
            stderr: message.into(),
            output_files: Vec::new(),
            args,
            started_at,
            finished_at: Utc::now(),
            elapsed,
        }
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(value.as_millis()).unwrap_or(u64::MAX))
    }
}
