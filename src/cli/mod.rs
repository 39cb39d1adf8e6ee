//! Command line interface for the packager.
//!
//! The CLI is one caller of the job subsystem: it validates the inputs, starts
//! a job, drives `tick` from a tokio interval and maps Ctrl-C to `cancel`.

mod args;
mod output;

pub use args::{Args, RuntimeConfig};
pub use output::OutputManager;

use crate::config::PackagerConfig;
use crate::error::{CliError, Result};
use crate::packager::{
    ArtifactReport, JobResult, JobRunner, LogCrateSink, LogSink, Outcome, PackagingRequest,
    PollOutcome, SetupChoice, describe_artifact, resolve_tool, validate,
};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::time::MissedTickBehavior;

/// Exit code reported when the user cancels with Ctrl-C
pub const EXIT_CANCELLED: i32 = 130;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    args.validate()
        .map_err(|reason| CliError::InvalidArguments { reason })?;
    let runtime_config = RuntimeConfig::from(&args);
    let config = args.resolve_config()?;
    execute(&args, config, &runtime_config).await
}

/// JSON report printed with `--json`
#[derive(Debug, Serialize)]
struct JobReport<'a> {
    request: &'a PackagingRequest,
    result: &'a JobResult,
    outcome: Outcome,
    artifact: Option<ArtifactReport>,
}

/// Validate, run one job to completion, and report it.
///
/// Returns the process exit code.
pub async fn execute(
    args: &Args,
    config: PackagerConfig,
    runtime_config: &RuntimeConfig,
) -> Result<i32> {
    let output = runtime_config.output();

    let tool = resolve_tool(&config.tool_path);
    let request = validate(&args.source, SetupChoice::chosen(&args.setup), &args.output, &tool)?;
    output.verbose(&format!("Tool: {}", request.tool_path().display()))?;

    let sink: Arc<dyn LogSink> = if runtime_config.quiet() {
        Arc::new(LogCrateSink)
    } else {
        Arc::new(output.clone())
    };

    let poll_interval = config.poll_interval();
    let mut runner = JobRunner::new(tokio::runtime::Handle::current(), config, sink);
    let job = runner.start(request)?;

    let mut interval = tokio::time::interval(poll_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let mut ctrl_c_armed = true;

    let (result, outcome) = loop {
        tokio::select! {
            _ = interval.tick() => match runner.tick() {
                PollOutcome::StillRunning(percent) => output.progress(percent)?,
                PollOutcome::Finished { result, outcome } => {
                    if let Outcome::Success { progress, .. } = outcome {
                        output.progress(progress)?;
                    }
                    output.finish_progress()?;
                    break (result, outcome);
                }
                PollOutcome::Idle => {
                    return Err(CliError::ExecutionFailed {
                        command: "poll packaging job".to_string(),
                        reason: format!("job {} disappeared before reporting a result", job.id),
                    }
                    .into());
                }
            },
            signal = &mut ctrl_c, if ctrl_c_armed => {
                ctrl_c_armed = false;
                match signal {
                    Ok(()) => {
                        output.finish_progress()?;
                        runner.cancel();
                        return Ok(EXIT_CANCELLED);
                    }
                    Err(e) => log::warn!("Ctrl-C handler unavailable: {}", e),
                }
            }
        }
    };

    output.section("tool stdout", &result.stdout)?;
    output.section("tool stderr", &result.stderr)?;

    let artifact = match (outcome.is_success(), result.output_files.first()) {
        (true, Some(newest)) => match checksum_package(newest).await {
            Ok(report) => {
                output.info(&format!(
                    "{} ({} bytes, sha256 {})",
                    report.path.display(),
                    report.size,
                    report.sha256
                ))?;
                Some(report)
            }
            Err(e) => {
                output.warn(&format!("{e:#}"))?;
                None
            }
        },
        _ => None,
    };

    if runtime_config.json() {
        let report = JobReport {
            request: &job.request,
            result: &result,
            outcome,
            artifact,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    Ok(if outcome.is_success() { 0 } else { 1 })
}

/// Size and digest of the produced package. Failure here does not fail the job.
async fn checksum_package(path: &Path) -> anyhow::Result<ArtifactReport> {
    describe_artifact(path)
        .await
        .with_context(|| format!("Could not checksum package {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn checksum_failure_names_the_package() {
        let temp = TempDir::new().expect("temp dir");
        let missing = temp.path().join("setup.intunewin");

        let err = checksum_package(&missing).await.unwrap_err();
        let message = format!("{err:#}");
        assert!(message.starts_with("Could not checksum package"));
        assert!(message.contains("setup.intunewin"));
        // io cause is kept in the chain
        assert!(err.chain().count() >= 2);
    }

    #[tokio::test]
    async fn checksum_reports_size() {
        let temp = TempDir::new().expect("temp dir");
        let package = temp.path().join("setup.intunewin");
        std::fs::write(&package, b"archive").expect("package");

        let report = checksum_package(&package).await.expect("readable");
        assert_eq!(report.size, 7);
    }
}
