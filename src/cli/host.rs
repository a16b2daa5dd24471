//! Polling watch set for the command-line host.

use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::plugin::WatchRegistry;
use crate::utils::fs::absolute_path;

/// Last observed state of a watched file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Baseline {
    /// Registered but not polled yet.
    Unseen,
    /// Did not exist at the last poll.
    Missing,
    /// Modification time at the last poll.
    At(SystemTime),
}

impl Baseline {
    fn observed(modified: Option<SystemTime>) -> Self {
        modified.map_or(Self::Missing, Self::At)
    }
}

/// Files the plugin asked the host to watch, with their last seen mtime.
///
/// Registration only records the path; the first [`poll`](Self::poll)
/// after registration takes the baseline.
#[derive(Debug, Default)]
pub struct WatchSet {
    files: DashMap<PathBuf, Baseline>,
}

impl WatchSet {
    /// Creates an empty watch set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `path`; already watched paths keep their baseline.
    pub fn watch(&self, path: &Path) {
        self.files.entry(absolute_path(path)).or_insert(Baseline::Unseen);
    }

    /// Number of watched files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` if nothing is watched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// `true` if `path` is watched.
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        self.files.contains_key(&absolute_path(path))
    }

    /// Records a new baseline for every file without reporting changes.
    pub async fn settle(&self) {
        self.scan(false).await;
    }

    /// Files whose modification time changed since the last poll.
    ///
    /// A file that disappears counts as changed once, and so does a missing
    /// file that reappears.
    pub async fn poll(&self) -> Vec<PathBuf> {
        self.scan(true).await
    }

    async fn scan(&self, report: bool) -> Vec<PathBuf> {
        let snapshot: Vec<(PathBuf, Baseline)> =
            self.files.iter().map(|entry| (entry.key().clone(), *entry.value())).collect();

        let mut changed = Vec::new();
        for (path, previous) in snapshot {
            let current = match tokio::fs::metadata(&path).await {
                Ok(meta) => Baseline::observed(meta.modified().ok()),
                Err(_) => Baseline::Missing,
            };

            if report && previous != Baseline::Unseen && current != previous {
                changed.push(path.clone());
            }
            self.files.insert(path, current);
        }
        changed
    }
}

impl WatchRegistry for WatchSet {
    fn add_watch_file(&self, path: &Path) {
        tracing::debug!("Watching {}", path.display());
        self.watch(path);
    }
}
