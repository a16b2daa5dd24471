//! Partial loader handed to the component compiler.
//!
//! The compiler calls [`PartialLoader::load`] once per partial or import it
//! encounters. Each successful load is recorded so that the compile record
//! knows every file it has to watch.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use crate::core::RbinError;
use crate::utils::fs::{absolute_path, read_text};

/// A partial reference as written in a template.
///
/// Either a single relative path (`"shared/button.ract"`) or a list of
/// segments to join (`["shared", "button.ract"]`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PartialRef {
    /// A single path
    Path(String),
    /// Path segments joined in order
    Segments(Vec<String>),
}

impl PartialRef {
    /// The reference as a relative path.
    #[must_use]
    pub fn to_path(&self) -> PathBuf {
        match self {
            Self::Path(path) => PathBuf::from(path),
            Self::Segments(segments) => segments.iter().collect(),
        }
    }
}

impl From<&str> for PartialRef {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

impl From<String> for PartialRef {
    fn from(path: String) -> Self {
        Self::Path(path)
    }
}

impl From<Vec<String>> for PartialRef {
    fn from(segments: Vec<String>) -> Self {
        Self::Segments(segments)
    }
}

impl From<&[&str]> for PartialRef {
    fn from(segments: &[&str]) -> Self {
        Self::Segments(segments.iter().map(|s| (*s).to_string()).collect())
    }
}

/// Reads partials relative to the template being compiled and records them.
///
/// One loader is created per compile call. It is only "used" if the
/// compiler calls it; a template without partials leaves
/// [`visited`](Self::visited) empty.
#[derive(Debug)]
pub struct PartialLoader {
    base_dir: PathBuf,
    visited: Mutex<Vec<PathBuf>>,
}

impl PartialLoader {
    /// Creates a loader resolving references against `source_path`'s directory.
    #[must_use]
    pub fn new(source_path: &Path) -> Self {
        let base_dir = source_path.parent().map(Path::to_path_buf).unwrap_or_default();
        Self {
            base_dir,
            visited: Mutex::new(Vec::new()),
        }
    }

    /// Reads a partial and records its absolute path.
    ///
    /// # Errors
    ///
    /// [`RbinError::Read`] if the partial cannot be read. Failed reads are
    /// not recorded.
    pub async fn load(&self, reference: impl Into<PartialRef>) -> Result<String, RbinError> {
        let path = self.base_dir.join(reference.into().to_path());
        let content = read_text(&path).await?;

        let resolved = absolute_path(&path);
        tracing::debug!("Loaded partial {}", resolved.display());

        let mut visited = self.visited.lock().unwrap_or_else(PoisonError::into_inner);
        if !visited.contains(&resolved) {
            visited.push(resolved);
        }

        Ok(content)
    }

    /// Absolute paths of every partial loaded so far, in load order.
    #[must_use]
    pub fn visited(&self) -> Vec<PathBuf> {
        self.visited.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Consumes the loader and returns the recorded paths.
    #[must_use]
    pub fn into_visited(self) -> Vec<PathBuf> {
        self.visited.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}
