//! Artifact discovery and checksums for packaged output.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::io::AsyncReadExt;

/// Find package files in `output_dir`, newest first, at most `limit` entries.
///
/// Only regular files whose extension matches `extension` (case-insensitive,
/// no leading dot) are considered. Unreadable entries are skipped; an
/// unreadable directory yields an empty list.
pub async fn discover_output_files(output_dir: &Path, extension: &str, limit: usize) -> Vec<PathBuf> {
    let mut entries = match tokio::fs::read_dir(output_dir).await {
        Ok(entries) => entries,
        Err(e) => {
            log::debug!("Cannot scan {} for artifacts: {}", output_dir.display(), e);
            return Vec::new();
        }
    };

    let mut found: Vec<(SystemTime, PathBuf)> = Vec::new();
    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                log::debug!("Skipping unreadable entry in {}: {}", output_dir.display(), e);
                continue;
            }
        };
        let path = entry.path();

        let matches_extension = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(extension));
        if !matches_extension {
            continue;
        }

        let metadata = match tokio::fs::symlink_metadata(&path).await {
            Ok(metadata) if metadata.is_file() => metadata,
            _ => continue,
        };
        let modified = metadata.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        log::debug!("  Artifact: {}", path.display());
        found.push((modified, path));
    }

    // Newest first; ties broken by path for a stable order
    found.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    found.into_iter().take(limit).map(|(_, path)| path).collect()
}

/// Size and digest of a produced package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactReport {
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

/// Hash a file with SHA-256, streaming it in 8 KiB chunks.
pub async fn describe_artifact(path: &Path) -> std::io::Result<ArtifactReport> {
    let mut file = tokio::fs::File::open(path).await?;
    let size = file.metadata().await?.len();

    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];
    loop {
        let n = file.read(&mut buffer).await?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(ArtifactReport {
        path: path.to_path_buf(),
        size,
        sha256: hex::encode(hasher.finalize()),
    })
}
