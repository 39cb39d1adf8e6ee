//! Non-blocking completion polling.
//!
//! Callers invoke [`JobRunner::tick`] on a fixed period from their own event
//! loop. A tick never waits on the tool: it peeks at the completion channel,
//! nudges the synthetic progress estimate while the job runs, and classifies
//! the result once it arrives.

use super::classifier::Outcome;
use super::job::JobResult;
use super::runner::JobRunner;
use std::sync::Arc;
use tokio::sync::oneshot::error::TryRecvError;

/// What a single tick observed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// No job is active
    Idle,
    /// Job still running; carries the current progress estimate
    StillRunning(u8),
    /// Job finished on this tick. Delivered exactly once per job.
    Finished {
        result: Arc<JobResult>,
        outcome: Outcome,
    },
}

impl JobRunner {
    /// Poll the active job once.
    ///
    /// While running, the progress estimate grows by one per tick up to the
    /// configured ceiling (85 by default), so it never suggests completion
    /// before the result is classified.
    pub fn tick(&mut self) -> PollOutcome {
        let Some(job) = self.job.as_mut() else {
            return PollOutcome::Idle;
        };

        let result = match job.completion.try_recv() {
            Err(TryRecvError::Empty) => {
                job.progress = job
                    .progress
                    .saturating_add(1)
                    .min(self.config.progress_ceiling);
                self.progress = job.progress;
                return PollOutcome::StillRunning(job.progress);
            }
            Ok(result) => result,
            Err(TryRecvError::Closed) => JobResult::fault(
                job.handle.id,
                job.args.clone(),
                job.handle.started_at,
                job.started.elapsed(),
                "Job monitoring ended without a result",
            ),
        };

        self.job = None;
        self.gate.release();

        match result.exit_code {
            Some(code) => self.sink.info(&format!(
                "Packaging tool exited with code {} after {:.1}s",
                code,
                result.elapsed.as_secs_f64()
            )),
            None => self.sink.info(&format!(
                "Packaging tool exited after {:.1}s",
                result.elapsed.as_secs_f64()
            )),
        }

        let outcome = self.classifier.classify(&result, self.sink.as_ref());
        self.progress = match outcome {
            Outcome::Success { progress, .. } => progress,
            Outcome::Failure { .. } => 0,
        };

        let result = Arc::new(result);
        self.last_result = Some(Arc::clone(&result));
        self.last_outcome = Some(outcome);

        PollOutcome::Finished { result, outcome }
    }
}
