//! Success/failure classification of finished jobs.
//!
//! The tool's exit code is not reliable across versions, so success is the OR
//! of several independent signals, checked in a fixed order:
//!
//! 1. exit code 0
//! 2. the completion marker in stdout
//! 3. at least one package file in the output folder
//!
//! A missing exit code is always reported as a warning, even when another
//! signal later proves success.

use super::job::JobResult;
use super::sink::LogSink;
use serde::Serialize;
use std::fmt;

/// Progress reported with every successful outcome
pub const COMPLETE_PROGRESS: u8 = 100;

/// Reason code used when the process gave no exit code
pub const MISSING_EXIT_CODE: i32 = -1;

/// One independent piece of evidence that packaging succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SuccessSignal {
    ExitCodeZero,
    CompletionMarker,
    ArtifactPresent,
}

impl SuccessSignal {
    /// Evaluation order
    pub const ORDER: [SuccessSignal; 3] = [
        SuccessSignal::ExitCodeZero,
        SuccessSignal::CompletionMarker,
        SuccessSignal::ArtifactPresent,
    ];

    /// Whether this signal holds for `result`.
    pub fn holds(self, result: &JobResult, completion_marker: &str) -> bool {
        match self {
            SuccessSignal::ExitCodeZero => result.exit_code == Some(0),
            SuccessSignal::CompletionMarker => {
                !completion_marker.is_empty() && result.stdout.contains(completion_marker)
            }
            SuccessSignal::ArtifactPresent => !result.output_files.is_empty(),
        }
    }
}

impl fmt::Display for SuccessSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SuccessSignal::ExitCodeZero => "exit code 0",
            SuccessSignal::CompletionMarker => "completion marker in output",
            SuccessSignal::ArtifactPresent => "package file present",
        };
        f.write_str(text)
    }
}

/// Terminal verdict for a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Success {
        progress: u8,
        /// First signal in [`SuccessSignal::ORDER`] that held
        signal: SuccessSignal,
    },
    Failure {
        reason_code: i32,
    },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success { .. })
    }
}

/// Applies the success policy with a given completion marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classifier {
    completion_marker: String,
}

impl Classifier {
    pub fn new(completion_marker: impl Into<String>) -> Self {
        Self {
            completion_marker: completion_marker.into(),
        }
    }

    /// Classify without emitting anything.
    pub fn evaluate(&self, result: &JobResult) -> Outcome {
        match SuccessSignal::ORDER
            .into_iter()
            .find(|signal| signal.holds(result, &self.completion_marker))
        {
            Some(signal) => Outcome::Success {
                progress: COMPLETE_PROGRESS,
                signal,
            },
            None => Outcome::Failure {
                reason_code: result.exit_code.unwrap_or(MISSING_EXIT_CODE),
            },
        }
    }

    /// Classify and report the verdict to `sink`.
    pub fn classify(&self, result: &JobResult, sink: &dyn LogSink) -> Outcome {
        if result.exit_code.is_none() {
            sink.warning("Packaging tool exited without an exit code; relying on other signals");
        }

        let outcome = self.evaluate(result);
        match outcome {
            Outcome::Success { signal, .. } => {
                sink.success(&format!("Package created ({signal})"));
            }
            Outcome::Failure { reason_code } => {
                if result.exit_code.is_none() {
                    sink.warning("Result unclear: no exit code, completion marker or package file");
                }
                sink.error(&format!("Packaging failed with code {reason_code}"));
                let stderr = result.stderr.trim();
                if !stderr.is_empty() {
                    sink.error(&format!("Tool stderr: {stderr}"));
                }
                log::debug!("Failed invocation arguments: {}", result.args);
            }
        }
        outcome
    }
}
