//! Command line argument parsing and validation.
//!
//! This module provides CLI argument parsing using clap, plus the layering of
//! command line overrides on top of the config file.

use crate::config::{ConfigError, PackagerConfig};
use clap::Parser;
use std::path::PathBuf;

/// Package a Win32 installer into an .intunewin archive
#[derive(Parser, Debug)]
#[command(
    name = "intunewin-packager",
    version,
    about = "Package a Win32 installer into an .intunewin archive",
    long_about = "Runs the Win32 Content Prep Tool (IntuneWinAppUtil.exe) as a background job,
reporting progress until it finishes, then checks exit code, tool output and the output folder
to decide whether the package was created.

Usage:
  intunewin-packager --source C:\\pkg\\src --setup C:\\pkg\\src\\setup.exe --output C:\\pkg\\out
  intunewin-packager -c ./src -s ./src/app.msi -o ./out --tool ./IntuneWinAppUtil.exe --json

Exit code 0 = package created, 1 = validation or packaging failure, 130 = cancelled."
)]
pub struct Args {
    /// Folder containing the installer and all of its payload
    #[arg(short = 'c', long, value_name = "DIR")]
    pub source: String,

    /// Installer to package (.exe or .msi inside the source folder)
    #[arg(short = 's', long, value_name = "FILE")]
    pub setup: String,

    /// Folder that receives the .intunewin file (created if missing)
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output: String,

    /// Packaging tool location; overrides the config file
    #[arg(short = 't', long, value_name = "PATH", env = "INTUNEWIN_TOOL")]
    pub tool: Option<String>,

    /// Config file (default: <config dir>/intunewin-packager/config.toml)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Poll period in milliseconds; overrides the config file
    #[arg(long, value_name = "MS")]
    pub poll_interval_ms: Option<u64>,

    /// Terminate the packaging tool on Ctrl-C instead of leaving it running
    #[arg(long)]
    pub kill_on_cancel: bool,

    /// Print a JSON report of the job on stdout
    #[arg(long)]
    pub json: bool,

    /// Only report warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show tool output after the job finishes
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.source.trim().is_empty() {
            return Err("Source folder cannot be empty".to_string());
        }
        if self.setup.trim().is_empty() {
            return Err("Setup file cannot be empty".to_string());
        }
        if self.output.trim().is_empty() {
            return Err("Output folder cannot be empty".to_string());
        }
        if self.poll_interval_ms == Some(0) {
            return Err("Poll interval must be greater than zero".to_string());
        }
        Ok(())
    }

    /// Load the config file and apply command line overrides.
    pub fn resolve_config(&self) -> Result<PackagerConfig, ConfigError> {
        let mut config = PackagerConfig::load_or_default(self.config.as_deref())?;
        if let Some(tool) = &self.tool {
            config.tool_path = tool.clone();
        }
        if let Some(ms) = self.poll_interval_ms {
            config.poll_interval_ms = ms;
        }
        if self.kill_on_cancel {
            config.kill_on_cancel = true;
        }
        config.validate()?;
        Ok(config)
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for terminal output
    output: super::OutputManager,
    json: bool,
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        let output = super::OutputManager::new(args.verbose, args.quiet || args.json);
        Self {
            output,
            json: args.json,
        }
    }
}

impl RuntimeConfig {
    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }

    /// Whether a JSON report goes to stdout
    pub fn json(&self) -> bool {
        self.json
    }

    /// Whether core log events should bypass the terminal and go to `log`
    pub fn quiet(&self) -> bool {
        self.output.is_quiet()
    }
}
