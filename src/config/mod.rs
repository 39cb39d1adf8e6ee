//! Packager configuration.
//!
//! Values come from built-in defaults, optionally overlaid by a TOML file, then
//! by command line flags. Only the file layer lives here; the CLI applies its
//! overrides on top of the loaded value.
//!
//! ```toml
//! tool_path = 'C:\Tools\IntuneWinAppUtil.exe'
//! poll_interval_ms = 350
//! completion_marker = "Done!!!"
//! kill_on_cancel = false
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default executable name of the Win32 Content Prep Tool
pub const DEFAULT_TOOL: &str = "IntuneWinAppUtil.exe";

/// Period at which callers should invoke `tick`
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 350;

/// Progress estimate never reaches this value before a result is classified
pub const DEFAULT_PROGRESS_CEILING: u8 = 85;

/// Text the tool prints once the archive has been written
pub const DEFAULT_COMPLETION_MARKER: &str = "Done!!!";

/// Extension of the archives the tool produces
pub const DEFAULT_PACKAGE_EXTENSION: &str = "intunewin";

/// Cap on artifacts recorded per job
pub const DEFAULT_MAX_OUTPUT_FILES: usize = 5;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`PackagerConfig`]
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// A value is out of range
    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Settings for the job subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PackagerConfig {
    /// Tool location: absolute path, relative path, or bare name looked up on `PATH`
    pub tool_path: String,

    /// Caller poll period in milliseconds
    pub poll_interval_ms: u64,

    /// Upper bound for the synthetic progress estimate while running
    pub progress_ceiling: u8,

    /// Case-sensitive stdout substring that signals a completed package
    pub completion_marker: String,

    /// Artifact extension, without the leading dot
    pub package_extension: String,

    /// Maximum number of artifacts recorded in a job result
    pub max_output_files: usize,

    /// Terminate the tool process when a job is cancelled.
    ///
    /// Off by default: cancelling only stops monitoring and the tool runs to
    /// completion in the background.
    pub kill_on_cancel: bool,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            tool_path: DEFAULT_TOOL.to_string(),
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            progress_ceiling: DEFAULT_PROGRESS_CEILING,
            completion_marker: DEFAULT_COMPLETION_MARKER.to_string(),
            package_extension: DEFAULT_PACKAGE_EXTENSION.to_string(),
            max_output_files: DEFAULT_MAX_OUTPUT_FILES,
            kill_on_cancel: false,
        }
    }
}

impl PackagerConfig {
    /// Default config file location (`<config dir>/intunewin-packager/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("intunewin-packager").join("config.toml"))
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `explicit` if given; otherwise the default location if it exists;
    /// otherwise built-in defaults.
    ///
    /// A missing explicit file is an error, a missing default file is not.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tool_path.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "tool_path",
                reason: "must not be empty".to_string(),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "poll_interval_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.progress_ceiling >= 100 {
            return Err(ConfigError::Invalid {
                field: "progress_ceiling",
                reason: format!("{} must be below 100", self.progress_ceiling),
            });
        }
        if self.package_extension.trim_start_matches('.').is_empty() {
            return Err(ConfigError::Invalid {
                field: "package_extension",
                reason: "must not be empty".to_string(),
            });
        }
        if self.max_output_files == 0 {
            return Err(ConfigError::Invalid {
                field: "max_output_files",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Extension without a leading dot
    pub fn package_extension(&self) -> &str {
        self.package_extension.trim_start_matches('.')
    }
}
