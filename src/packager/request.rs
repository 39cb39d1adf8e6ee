//! Input validation.
//!
//! Turns raw, possibly malformed path strings into an immutable
//! [`PackagingRequest`]. Checks short-circuit in a fixed order; the only side
//! effect is creating the output folder.

use super::error::{ValidationError, ValidationResult};
use path_absolutize::Absolutize;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};

/// Installer extensions the packaging tool accepts (lower case)
pub const SUPPORTED_SETUP_EXTENSIONS: [&str; 2] = ["exe", "msi"];

/// A validated packaging job description.
///
/// Only [`validate`] builds one, and nothing mutates it afterwards. Every job
/// start consumes a fresh request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackagingRequest {
    source_folder: PathBuf,
    setup_file: PathBuf,
    output_folder: PathBuf,
    tool_path: PathBuf,
}

impl PackagingRequest {
    pub fn source_folder(&self) -> &Path {
        &self.source_folder
    }

    pub fn setup_file(&self) -> &Path {
        &self.setup_file
    }

    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    pub fn tool_path(&self) -> &Path {
        &self.tool_path
    }
}

/// Which setup file the caller wants packaged.
///
/// A file the user picked explicitly wins over one found by auto-detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupChoice<'a> {
    pub chosen: Option<&'a str>,
    pub detected: Option<&'a str>,
}

impl<'a> SetupChoice<'a> {
    pub fn chosen(path: &'a str) -> Self {
        Self {
            chosen: Some(path),
            detected: None,
        }
    }

    pub fn preferring(chosen: Option<&'a str>, detected: Option<&'a str>) -> Self {
        Self { chosen, detected }
    }

    /// The effective raw path, ignoring blank entries
    pub fn pick(&self) -> Option<&'a str> {
        self.chosen
            .filter(|raw| !clean_raw(raw).is_empty())
            .or_else(|| self.detected.filter(|raw| !clean_raw(raw).is_empty()))
    }
}

impl<'a> From<&'a str> for SetupChoice<'a> {
    fn from(path: &'a str) -> Self {
        Self::chosen(path)
    }
}

/// Validate raw inputs into a [`PackagingRequest`].
///
/// Order of checks:
/// 1. source folder exists
/// 2. setup file exists
/// 3. setup extension is `.exe` or `.msi`
/// 4. setup file is inside the source folder
/// 5. output folder exists or can be created
/// 6. tool executable exists
///
/// Calling this twice with the same inputs and no filesystem change in between
/// yields equal requests.
pub fn validate<'a>(
    raw_source_folder: &str,
    setup: impl Into<SetupChoice<'a>>,
    raw_output_folder: &str,
    tool_path: &Path,
) -> ValidationResult<PackagingRequest> {
    let source_folder = match normalize(raw_source_folder) {
        Some(path) if path.is_dir() => path,
        Some(path) => return Err(ValidationError::SourceFolderInvalid { path }),
        None => {
            return Err(ValidationError::SourceFolderInvalid {
                path: PathBuf::from(clean_raw(raw_source_folder)),
            });
        }
    };

    let setup = setup.into();
    let raw_setup = setup.pick().unwrap_or_default();
    let setup_file = match normalize(raw_setup) {
        Some(path) if path.is_file() => path,
        Some(path) => return Err(ValidationError::SetupFileInvalid { path }),
        None => {
            return Err(ValidationError::SetupFileInvalid {
                path: PathBuf::from(clean_raw(raw_setup)),
            });
        }
    };

    if !has_supported_extension(&setup_file) {
        let extension = setup_file
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(ValidationError::UnsupportedExtension {
            path: setup_file,
            extension,
        });
    }

    if !is_descendant(&setup_file, &source_folder) {
        return Err(ValidationError::SetupOutsideSource {
            setup: setup_file,
            source_folder,
        });
    }

    let output_folder = prepare_output_folder(raw_output_folder)?;

    let tool_path = match tool_path.absolutize() {
        Ok(path) if path.is_file() => path.into_owned(),
        Ok(path) => {
            return Err(ValidationError::ToolMissing {
                path: path.into_owned(),
            });
        }
        Err(_) => {
            return Err(ValidationError::ToolMissing {
                path: tool_path.to_path_buf(),
            });
        }
    };

    log::debug!(
        "Validated request: setup={} source={} output={}",
        setup_file.display(),
        source_folder.display(),
        output_folder.display()
    );

    Ok(PackagingRequest {
        source_folder,
        setup_file,
        output_folder,
        tool_path,
    })
}

/// Strip surrounding whitespace and one pair of double quotes.
fn clean_raw(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// Absolute, lexically normalized form of a raw path; `None` if blank or unresolvable.
fn normalize(raw: &str) -> Option<PathBuf> {
    let cleaned = clean_raw(raw);
    if cleaned.is_empty() {
        return None;
    }
    Path::new(cleaned)
        .absolutize()
        .ok()
        .map(|path| path.into_owned())
}

fn has_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .is_some_and(|e| SUPPORTED_SETUP_EXTENSIONS.contains(&e.as_str()))
}

/// Whether `child` lies strictly below `ancestor`.
///
/// Compares whole path components case-insensitively, so `/pkgfoo/a.exe` is
/// not below `/pkg`. Both paths must already be absolute and normalized.
pub fn is_descendant(child: &Path, ancestor: &Path) -> bool {
    let mut child_components = child.components().filter(|c| !matches!(c, Component::CurDir));
    for expected in ancestor.components().filter(|c| !matches!(c, Component::CurDir)) {
        match child_components.next() {
            Some(actual) if components_match(actual, expected) => {}
            _ => return false,
        }
    }
    child_components.next().is_some()
}

fn components_match(a: Component<'_>, b: Component<'_>) -> bool {
    a.as_os_str().to_string_lossy().to_lowercase() == b.as_os_str().to_string_lossy().to_lowercase()
}

fn prepare_output_folder(raw: &str) -> ValidationResult<PathBuf> {
    let path = normalize(raw).ok_or_else(|| ValidationError::OutputFolderUnavailable {
        path: PathBuf::from(clean_raw(raw)),
        reason: "no output folder given".to_string(),
    })?;

    if path.exists() && !path.is_dir() {
        return Err(ValidationError::OutputFolderUnavailable {
            path,
            reason: "path exists and is not a directory".to_string(),
        });
    }

    // Idempotent: succeeds when the directory already exists
    std::fs::create_dir_all(&path).map_err(|e| ValidationError::OutputFolderUnavailable {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    struct Fixture {
        _temp: TempDir,
        root: PathBuf,
        source: PathBuf,
        tool: PathBuf,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().expect("temp dir");
            let root = temp.path().to_path_buf();
            let source = root.join("pkg").join("src");
            fs::create_dir_all(&source).expect("source dir");
            let tool = root.join("IntuneWinAppUtil.exe");
            fs::write(&tool, b"tool").expect("tool file");
            Self {
                _temp: temp,
                root,
                source,
                tool,
            }
        }

        fn file(&self, relative: &str) -> PathBuf {
            let path = self.root.join(relative);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("parent dir");
            }
            fs::write(&path, b"payload").expect("file");
            path
        }

        fn output(&self) -> PathBuf {
            self.root.join("pkg").join("out")
        }
    }

    fn s(path: &Path) -> &str {
        path.to_str().expect("utf-8 temp path")
    }

    #[test]
    fn valid_inputs_create_output_folder() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/src/setup.exe");
        let output = fx.output();
        assert!(!output.exists());

        let request = validate(s(&fx.source), s(&setup), s(&output), &fx.tool)
            .expect("valid request");

        assert!(output.is_dir());
        assert_eq!(request.setup_file(), setup.as_path());
        assert_eq!(request.output_folder(), output.as_path());
        assert_eq!(request.tool_path(), fx.tool.as_path());
    }

    #[test]
    fn validating_twice_yields_equal_requests() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/src/nested/app.MSI");
        let output = fx.output();

        let first = validate(s(&fx.source), s(&setup), s(&output), &fx.tool).expect("first");
        let second = validate(s(&fx.source), s(&setup), s(&output), &fx.tool).expect("second");
        assert_eq!(first, second);
    }

    #[test]
    fn blank_or_missing_source_is_rejected() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/src/setup.exe");
        let output = fx.output();

        assert!(matches!(
            validate("   ", s(&setup), s(&output), &fx.tool),
            Err(ValidationError::SourceFolderInvalid { .. })
        ));
        let missing = fx.root.join("nope");
        assert!(matches!(
            validate(s(&missing), s(&setup), s(&output), &fx.tool),
            Err(ValidationError::SourceFolderInvalid { .. })
        ));
    }

    #[test]
    fn missing_setup_is_rejected() {
        let fx = Fixture::new();
        let output = fx.output();
        let missing = fx.source.join("ghost.exe");

        assert!(matches!(
            validate(s(&fx.source), s(&missing), s(&output), &fx.tool),
            Err(ValidationError::SetupFileInvalid { .. })
        ));
        assert!(matches!(
            validate(s(&fx.source), SetupChoice::default(), s(&output), &fx.tool),
            Err(ValidationError::SetupFileInvalid { .. })
        ));
    }

    #[test]
    fn unsupported_extension_wins_even_inside_source() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/src/install.bat");
        let output = fx.output();

        let err = validate(s(&fx.source), s(&setup), s(&output), &fx.tool).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedExtension { ref extension, .. } if extension == "bat"
        ));
        assert!(!output.exists(), "no output folder before the setup checks pass");
    }

    #[test]
    fn setup_outside_source_is_rejected_for_any_supported_extension() {
        let fx = Fixture::new();
        let output = fx.output();

        for name in ["other/app.msi", "other/APP.EXE"] {
            let setup = fx.file(name);
            assert!(matches!(
                validate(s(&fx.source), s(&setup), s(&output), &fx.tool),
                Err(ValidationError::SetupOutsideSource { .. })
            ));
        }
    }

    #[test]
    fn extension_is_checked_before_containment() {
        let fx = Fixture::new();
        let notes = fx.file("other/readme.txt");
        let output = fx.output();

        let err = validate(s(&fx.source), s(&notes), s(&output), &fx.tool).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::UnsupportedExtension { ref extension, .. } if extension == "txt"
        ));
    }

    #[test]
    fn sibling_with_shared_prefix_is_not_an_ancestor() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/srcfoo/setup.exe");
        let output = fx.output();

        assert!(matches!(
            validate(s(&fx.source), s(&setup), s(&output), &fx.tool),
            Err(ValidationError::SetupOutsideSource { .. })
        ));
    }

    #[test]
    fn explicit_choice_beats_detected_setup() {
        let fx = Fixture::new();
        let chosen = fx.file("pkg/src/chosen.msi");
        let detected = fx.file("pkg/src/detected.exe");
        let output = fx.output();

        let request = validate(
            s(&fx.source),
            SetupChoice::preferring(Some(s(&chosen)), Some(s(&detected))),
            s(&output),
            &fx.tool,
        )
        .expect("valid request");
        assert_eq!(request.setup_file(), chosen.as_path());

        let request = validate(
            s(&fx.source),
            SetupChoice::preferring(Some("  "), Some(s(&detected))),
            s(&output),
            &fx.tool,
        )
        .expect("falls back to detected");
        assert_eq!(request.setup_file(), detected.as_path());
    }

    #[test]
    fn quoted_paths_are_accepted() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/src/setup.exe");
        let output = fx.output();
        let quoted_source = format!("  \"{}\" ", fx.source.display());

        let request = validate(&quoted_source, s(&setup), s(&output), &fx.tool)
            .expect("quoted source");
        assert_eq!(request.source_folder(), fx.source.as_path());
    }

    #[test]
    fn output_path_occupied_by_file_is_unavailable() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/src/setup.exe");
        let blocker = fx.file("pkg/out");

        assert!(matches!(
            validate(s(&fx.source), s(&setup), s(&blocker), &fx.tool),
            Err(ValidationError::OutputFolderUnavailable { .. })
        ));
    }

    #[test]
    fn missing_tool_is_reported_last() {
        let fx = Fixture::new();
        let setup = fx.file("pkg/src/setup.exe");
        let output = fx.output();
        let tool = fx.root.join("missing-tool.exe");

        assert!(matches!(
            validate(s(&fx.source), s(&setup), s(&output), &tool),
            Err(ValidationError::ToolMissing { .. })
        ));
        assert!(output.is_dir(), "output folder creation precedes the tool check");
    }

    #[test]
    fn descendant_check_is_component_wise_and_case_insensitive() {
        assert!(is_descendant(Path::new("/pkg/src/a.exe"), Path::new("/pkg/src")));
        assert!(is_descendant(Path::new("/PKG/Src/sub/a.exe"), Path::new("/pkg/src")));
        assert!(!is_descendant(Path::new("/pkg/srcfoo/a.exe"), Path::new("/pkg/src")));
        assert!(!is_descendant(Path::new("/pkg/src"), Path::new("/pkg/src")));
        assert!(!is_descendant(Path::new("/other/a.msi"), Path::new("/pkg/src")));
    }
}
