//! Shared fixtures: a temp packaging workspace and a shell-script stand-in for
//! the packaging tool.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Source folder with a setup file, plus an (initially missing) output folder
pub struct Workspace {
    _temp: TempDir,
    pub root: PathBuf,
    pub source: PathBuf,
    pub setup: PathBuf,
    pub output: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let root = temp.path().to_path_buf();
        let source = root.join("pkg").join("src");
        fs::create_dir_all(&source).expect("source dir");
        let setup = source.join("setup.exe");
        fs::write(&setup, b"MZ installer").expect("setup file");
        let output = root.join("pkg").join("out");
        Self {
            _temp: temp,
            root,
            source,
            setup,
            output,
        }
    }

    /// Write an extra file under the workspace root
    pub fn file(&self, relative: &str) -> PathBuf {
        let path = self.root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, b"payload").expect("file");
        path
    }

    /// Empty config file, so a user config in the real config dir is ignored
    pub fn empty_config(&self) -> PathBuf {
        let path = self.root.join("config.toml");
        fs::write(&path, "").expect("config file");
        path
    }
}

pub fn s(path: &Path) -> &str {
    path.to_str().expect("utf-8 temp path")
}

/// How the stand-in tool behaves.
///
/// The tool receives `-c <src> -s <setup> -o <out> -q`, so the output folder
/// is `$6` inside the script.
#[derive(Debug, Clone)]
pub struct FakeTool {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub write_artifact: bool,
    pub delay_secs: Option<&'static str>,
    /// End with SIGKILL so no exit code is available
    pub killed: bool,
}

impl Default for FakeTool {
    fn default() -> Self {
        Self {
            exit_code: 0,
            stdout: "[Info] Compressing...".to_string(),
            stderr: String::new(),
            write_artifact: false,
            delay_secs: None,
            killed: false,
        }
    }
}

impl FakeTool {
    #[cfg(unix)]
    pub fn install(&self, dir: &Path) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let mut script = String::from("#!/bin/sh\nout=\"$6\"\n");
        if let Some(delay) = self.delay_secs {
            script.push_str(&format!("sleep {delay}\n"));
        }
        script.push_str(&format!("printf '%s\\n' '{}'\n", self.stdout));
        if !self.stderr.is_empty() {
            script.push_str(&format!("printf '%s\\n' '{}' >&2\n", self.stderr));
        }
        // Written after the output so a closed pipe would stop the tool first
        if self.write_artifact {
            script.push_str("printf 'archive' > \"$out/setup.intunewin\"\n");
        }
        if self.killed {
            script.push_str("kill -9 $$\n");
        }
        script.push_str(&format!("exit {}\n", self.exit_code));

        let path = dir.join("IntuneWinAppUtil.sh");
        fs::write(&path, script).expect("tool script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod");
        path
    }
}
