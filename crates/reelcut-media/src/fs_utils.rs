//! Filesystem utilities for pipeline outputs.

use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::error::{MediaError, MediaResult};

/// Delete `path` if it exists. Returns whether a file was removed.
pub async fn remove_if_exists(path: impl AsRef<Path>) -> MediaResult<bool> {
    let path = path.as_ref();
    match fs::remove_file(path).await {
        Ok(()) => {
            tracing::debug!("Removed pre-existing file: {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(MediaError::from(e)),
    }
}

/// Replace `dst` with a byte copy of `src`.
pub async fn copy_replacing(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> MediaResult<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.exists() {
        return Err(MediaError::FileNotFound(src.to_path_buf()));
    }

    remove_if_exists(dst).await?;
    fs::copy(src, dst).await.map_err(|e| {
        tracing::error!(
            "Failed to copy file: {} -> {}: {}",
            src.display(),
            dst.display(),
            e
        );
        MediaError::from(e)
    })?;

    Ok(())
}

/// Delete every file matching a glob pattern, except the files in `keep`.
/// Returns how many were removed.
///
/// `keep` entries are compared after canonicalization, so relative and
/// absolute spellings of the same file are both honoured. Individual failures
/// are logged and skipped.
pub async fn remove_matching(pattern: &str, keep: &[&Path]) -> MediaResult<usize> {
    let paths = glob::glob(pattern)
        .map_err(|e| MediaError::internal(format!("invalid glob '{}': {}", pattern, e)))?;

    let mut kept = Vec::with_capacity(keep.len());
    for path in keep {
        if let Ok(canonical) = fs::canonicalize(path).await {
            kept.push(canonical);
        }
    }

    let mut removed = 0;
    for entry in paths {
        match entry {
            Ok(path) if path.is_file() => {
                let canonical = fs::canonicalize(&path).await.unwrap_or_else(|_| path.clone());
                if kept.contains(&canonical) {
                    tracing::debug!("Keeping {}", path.display());
                    continue;
                }
                match fs::remove_file(&path).await {
                    Ok(()) => removed += 1,
                    Err(e) => tracing::warn!("Failed to remove {}: {}", path.display(), e),
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Unreadable glob entry: {}", e),
        }
    }

    Ok(removed)
}
