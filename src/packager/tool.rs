//! Packaging tool location and invocation arguments.

use super::request::PackagingRequest;
use path_absolutize::Absolutize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Resolve a configured tool location to a path.
///
/// - An existing file (absolute or relative) is returned absolutized.
/// - A bare program name is looked up on `PATH`.
/// - Anything else is returned as given; validation then reports it missing.
pub fn resolve_tool(raw: &str) -> PathBuf {
    let raw = raw.trim();
    let candidate = Path::new(raw);

    if candidate.is_file() {
        return candidate
            .absolutize()
            .map(|p| p.into_owned())
            .unwrap_or_else(|_| candidate.to_path_buf());
    }

    let is_bare_name = candidate.components().count() == 1 && !candidate.is_absolute();
    if is_bare_name {
        match which::which(raw) {
            Ok(path) => {
                log::debug!("Found {} at: {}", raw, path.display());
                return path;
            }
            Err(e) => log::debug!("{} not found in PATH: {}", raw, e),
        }
    }

    candidate.to_path_buf()
}

/// Arguments for one run of the packaging tool.
///
/// The argv is `-c <source> -s <setup> -o <output> -q`. The display form quotes
/// each path and is kept in the job result for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    program: PathBuf,
    args: Vec<OsString>,
    display: String,
}

impl ToolInvocation {
    pub fn for_request(request: &PackagingRequest) -> Self {
        let source = request.source_folder();
        let setup = request.setup_file();
        let output = request.output_folder();

        let args = vec![
            OsString::from("-c"),
            source.as_os_str().to_owned(),
            OsString::from("-s"),
            setup.as_os_str().to_owned(),
            OsString::from("-o"),
            output.as_os_str().to_owned(),
            OsString::from("-q"),
        ];

        let display = format!(
            "-c \"{}\" -s \"{}\" -o \"{}\" -q",
            source.display(),
            setup.display(),
            output.display()
        );

        Self {
            program: request.tool_path().to_path_buf(),
            args,
            display,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Quoted argument string, as recorded in the job result
    pub fn display_args(&self) -> &str {
        &self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packager::request::validate;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn invocation_uses_fixed_flag_order() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let source = temp.path().join("src");
        fs::create_dir_all(&source)?;
        let setup = source.join("setup.exe");
        fs::write(&setup, b"x")?;
        let tool = temp.path().join("IntuneWinAppUtil.exe");
        fs::write(&tool, b"x")?;
        let output = temp.path().join("out");

        let request = validate(
            source.to_str().ok_or("path")?,
            setup.to_str().ok_or("path")?,
            output.to_str().ok_or("path")?,
            &tool,
        )?;
        let invocation = ToolInvocation::for_request(&request);

        let flags: Vec<_> = invocation
            .args()
            .iter()
            .step_by(2)
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(flags, vec!["-c", "-s", "-o", "-q"]);
        assert_eq!(invocation.args()[3].as_os_str(), setup.as_os_str());
        assert_eq!(
            invocation.display_args(),
            format!(
                "-c \"{}\" -s \"{}\" -o \"{}\" -q",
                source.display(),
                setup.display(),
                output.display()
            )
        );
        assert_eq!(invocation.program(), tool.as_path());
        Ok(())
    }

    #[test]
    fn existing_relative_tool_is_absolutized() -> Result<(), Box<dyn std::error::Error>> {
        let temp = TempDir::new()?;
        let tool = temp.path().join("tool.exe");
        fs::write(&tool, b"x")?;

        let resolved = resolve_tool(tool.to_str().ok_or("path")?);
        assert!(resolved.is_absolute());
        assert_eq!(resolved, tool);
        Ok(())
    }

    #[test]
    fn unknown_bare_name_is_returned_unchanged() {
        let resolved = resolve_tool("definitely-not-a-real-packager-7f3a");
        assert_eq!(resolved, PathBuf::from("definitely-not-a-real-packager-7f3a"));
    }
}
