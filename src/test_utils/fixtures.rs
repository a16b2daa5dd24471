//! Filesystem and host fixtures.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::TempDir;

use crate::plugin::WatchRegistry;

/// A temporary project directory holding template files.
///
/// The directory is removed when the fixture is dropped.
#[derive(Debug)]
pub struct TemplateProject {
    temp_dir: TempDir,
}

impl TemplateProject {
    /// Creates an empty project directory.
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new().context("Failed to create temp directory")?;
        Ok(Self {
            temp_dir,
        })
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Absolute path of `rel` inside the project.
    #[must_use]
    pub fn path(&self, rel: &str) -> PathBuf {
        self.temp_dir.path().join(rel)
    }

    /// Writes `content` to `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> Result<PathBuf> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Reads `rel` back as text.
    pub fn read(&self, rel: &str) -> Result<String> {
        let path = self.path(rel);
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))
    }
}

/// Watch registry that records every registration.
#[derive(Debug, Default)]
pub struct RecordingHost {
    watched: Mutex<Vec<PathBuf>>,
}

impl RecordingHost {
    /// Creates a host with nothing watched.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every registered path, in registration order, duplicates included.
    #[must_use]
    pub fn watched(&self) -> Vec<PathBuf> {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// `true` if `path` was registered at least once.
    #[must_use]
    pub fn is_watching(&self, path: &Path) -> bool {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner).iter().any(|p| p == path)
    }

}

impl WatchRegistry for RecordingHost {
    fn add_watch_file(&self, path: &Path) {
        self.watched.lock().unwrap_or_else(PoisonError::into_inner).push(path.to_path_buf());
    }
}
