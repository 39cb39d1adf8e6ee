//! Out-of-process job execution.
//!
//! [`JobRunner`] owns the single job slot. `start` launches the packaging tool
//! on a tokio task and returns immediately; the task buffers both output
//! streams, waits for exit, scans the output folder and hands a [`JobResult`]
//! back through a oneshot channel that [`JobRunner::tick`] polls.

use super::artifacts::discover_output_files;
use super::classifier::{Classifier, Outcome};
use super::error::StartError;
use super::gate::BusyGate;
use super::job::{JobHandle, JobResult, JobState};
use super::request::PackagingRequest;
use super::sink::LogSink;
use super::tool::ToolInvocation;
use crate::config::PackagerConfig;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Windows process creation flag that suppresses the console window
#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// The job currently occupying the runner.
pub(super) struct ActiveJob {
    pub(super) handle: JobHandle,
    pub(super) args: String,
    pub(super) started: Instant,
    pub(super) progress: u8,
    pub(super) completion: oneshot::Receiver<JobResult>,
    pub(super) task: JoinHandle<()>,
}

/// Single-flight runner for packaging jobs.
///
/// All mutating operations take `&mut self`, so `tick`, `start` and `cancel`
/// are serialized with each other. Share a runner across threads behind a
/// mutex.
pub struct JobRunner {
    pub(super) runtime: Handle,
    pub(super) config: PackagerConfig,
    pub(super) classifier: Classifier,
    pub(super) sink: Arc<dyn LogSink>,
    pub(super) gate: BusyGate,
    pub(super) job: Option<ActiveJob>,
    pub(super) progress: u8,
    pub(super) last_result: Option<Arc<JobResult>>,
    pub(super) last_outcome: Option<Outcome>,
}

impl std::fmt::Debug for JobRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobRunner")
            .field("config", &self.config)
            .field("busy", &self.gate.is_busy())
            .field("job", &self.job.as_ref().map(|job| job.handle.id))
            .field("progress", &self.progress)
            .field("last_outcome", &self.last_outcome)
            .finish()
    }
}

impl JobRunner {
    /// Create a runner that spawns jobs on `runtime`.
    pub fn new(runtime: Handle, config: PackagerConfig, sink: Arc<dyn LogSink>) -> Self {
        let classifier = Classifier::new(config.completion_marker.clone());
        Self {
            runtime,
            config,
            classifier,
            sink,
            gate: BusyGate::new(),
            job: None,
            progress: 0,
            last_result: None,
            last_outcome: None,
        }
    }

    /// Launch the packaging tool for `request`.
    ///
    /// Fails with [`StartError::AlreadyRunning`] while another job holds the
    /// gate; the active job is left untouched in that case.
    pub fn start(&mut self, request: PackagingRequest) -> Result<JobHandle, StartError> {
        if !self.gate.try_acquire() {
            self.sink
                .warning("A packaging job is already running; wait for it to finish");
            return Err(StartError::AlreadyRunning);
        }

        let invocation = ToolInvocation::for_request(&request);
        let args = invocation.display_args().to_string();
        let handle = JobHandle {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            request,
        };
        let started = Instant::now();

        let (tx, rx) = oneshot::channel();
        let launch = Launch {
            job_id: handle.id,
            invocation,
            output_folder: handle.request.output_folder().to_path_buf(),
            package_extension: self.config.package_extension().to_string(),
            max_output_files: self.config.max_output_files,
            kill_on_cancel: self.config.kill_on_cancel,
            started_at: handle.started_at,
            started,
        };
        let task = self.runtime.spawn(async move {
            let result = execute(launch).await;
            // Receiver is gone if the job was cancelled
            let _ = tx.send(result);
        });

        self.sink.info(&format!(
            "Packaging {} into {}",
            handle.request.setup_file().display(),
            handle.request.output_folder().display()
        ));
        self.sink.info(&format!(
            "Running {} {}",
            handle.request.tool_path().display(),
            args
        ));
        log::debug!("Job {} started", handle.id);

        self.progress = 0;
        self.job = Some(ActiveJob {
            handle: handle.clone(),
            args,
            started,
            progress: 0,
            completion: rx,
            task,
        });

        Ok(handle)
    }

    /// Stop monitoring the active job.
    ///
    /// Releases the gate and drops the pending result. The tool process itself
    /// is only terminated when `kill_on_cancel` is configured; otherwise the
    /// task is detached and keeps draining the tool's output until it exits,
    /// so the tool may still write into the output folder. Returns `false`
    /// when there was nothing to cancel.
    pub fn cancel(&mut self) -> bool {
        let Some(job) = self.job.take() else {
            return false;
        };

        // Aborting drops the child, and with it the pipe read ends
        if self.config.kill_on_cancel {
            job.task.abort();
        }
        self.gate.release();
        self.progress = 0;

        if self.config.kill_on_cancel {
            self.sink
                .warning("Packaging cancelled; the tool process was terminated");
        } else {
            self.sink.warning(
                "Packaging cancelled; the tool process may keep running in the background",
            );
        }
        log::debug!("Job {} cancelled", job.handle.id);
        true
    }

    pub fn state(&self) -> JobState {
        match &self.job {
            None => JobState::Idle,
            Some(job) if job.task.is_finished() => JobState::Completed,
            Some(_) => JobState::Running,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.gate.is_busy()
    }

    /// Progress of the active job, or of the last finished one when idle
    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn current_job(&self) -> Option<&JobHandle> {
        self.job.as_ref().map(|job| &job.handle)
    }

    pub fn last_result(&self) -> Option<Arc<JobResult>> {
        self.last_result.clone()
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }
}

/// Everything the background task needs, owned.
struct Launch {
    job_id: Uuid,
    invocation: ToolInvocation,
    output_folder: PathBuf,
    package_extension: String,
    max_output_files: usize,
    kill_on_cancel: bool,
    started_at: DateTime<Utc>,
    started: Instant,
}

/// Run the tool to completion. Never fails: spawn and read errors become a
/// fault result with exit code -1.
async fn execute(launch: Launch) -> JobResult {
    let mut command = tokio::process::Command::new(launch.invocation.program());
    command
        .args(launch.invocation.args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(launch.kill_on_cancel);

    #[cfg(windows)]
    command.creation_flags(CREATE_NO_WINDOW);

    let output = match command.output().await {
        Ok(output) => output,
        Err(e) => {
            log::debug!(
                "Failed to run {}: {}",
                launch.invocation.program().display(),
                e
            );
            return JobResult::fault(
                launch.job_id,
                launch.invocation.display_args().to_string(),
                launch.started_at,
                launch.started.elapsed(),
                format!(
                    "Failed to run {}: {}",
                    launch.invocation.program().display(),
                    e
                ),
            );
        }
    };

    let output_files = discover_output_files(
        &launch.output_folder,
        &launch.package_extension,
        launch.max_output_files,
    )
    .await;

    JobResult {
        job_id: launch.job_id,
        exit_code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        output_files,
        args: launch.invocation.display_args().to_string(),
        started_at: launch.started_at,
        finished_at: Utc::now(),
        elapsed: launch.started.elapsed(),
    }
}
