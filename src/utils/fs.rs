//! File system helpers used by the resolver, the compile orchestrator and
//! the invalidation tracker.
//!
//! Every helper is async and goes through [`tokio::fs`]. Failures are mapped
//! onto [`RbinError`] at the call site so the propagation policy stays in one
//! place: probes return `bool`, reads return [`RbinError::Read`], directory
//! creation and writes return [`RbinError::Write`].

use sha2::{Digest, Sha256};
use std::path::{Component, Path, PathBuf};
use tokio::fs;

use crate::core::RbinError;

/// Normalizes a path by resolving `.` and `..` components.
///
/// Purely lexical: symbolic links are not followed and the path does not
/// need to exist.
///
/// # Examples
///
/// ```rust,no_run
/// use ractive_bin::utils::fs::normalize_path;
/// use std::path::{Path, PathBuf};
///
/// let path = Path::new("/views/./shared/../button.ract");
/// assert_eq!(normalize_path(path), PathBuf::from("/views/button.ract"));
/// ```
#[must_use]
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                components.pop();
            }
            c => components.push(c),
        }
    }

    components.iter().collect()
}

/// Makes `path` absolute against the current directory and normalizes it.
///
/// Cache keys for dependencies and artifacts are always produced by this
/// function so that change notifications match regardless of how the host
/// spells the path.
#[must_use]
pub fn absolute_path(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    normalize_path(&absolute)
}

/// Returns `true` if `path` names an existing regular file.
///
/// Any error (missing file, permission problem on a parent directory) counts
/// as "does not exist"; the resolver uses this to walk candidates.
pub async fn file_exists(path: &Path) -> bool {
    match fs::metadata(path).await {
        Ok(meta) => meta.is_file(),
        Err(_) => false,
    }
}

/// Reads a UTF-8 text file.
pub async fn read_text(path: &Path) -> Result<String, RbinError> {
    fs::read_to_string(path).await.map_err(|source| RbinError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Ensures a directory exists, creating it and all parents if necessary.
///
/// Idempotent when the directory is already present.
pub async fn ensure_dir(path: &Path) -> Result<(), RbinError> {
    fs::create_dir_all(path).await.map_err(|source| RbinError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes `content` to `path`, creating parent directories first.
pub async fn write_text(path: &Path, content: &str) -> Result<(), RbinError> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent).await?;
    }

    fs::write(path, content).await.map_err(|source| RbinError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// SHA-256 fingerprint of some content, formatted as `sha256:<hex>`.
#[must_use]
pub fn fingerprint(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

/// Fingerprint of a file's current content, or `None` if it cannot be read.
pub async fn fingerprint_file(path: &Path) -> Option<String> {
    match fs::read(path).await {
        Ok(bytes) => Some(fingerprint(&bytes)),
        Err(e) => {
            tracing::debug!("Cannot fingerprint {}: {}", path.display(), e);
            None
        }
    }
}
