//! Compile cache for the lifetime of a build or watch session.
//!
//! The store keeps two kinds of records in two maps:
//!
//! - [`SourceRecord`] keyed by logical id (`views/card`): where the template
//!   lives, where its artifact went, and every file the last compile read
//! - [`ArtifactRecord`] keyed by absolute artifact path: a mirror of the
//!   dependency list, a back-reference to the id, the redo marker and the
//!   write revision used to recognise echoes of our own writes
//!
//! A third map indexes dependency path → ids so that a change to a shared
//! partial finds its dependents without scanning every record.
//!
//! The store is owned by a [`Plugin`](crate::plugin::Plugin) and is never
//! persisted; records live until the plugin is dropped.

mod invalidation;
mod revision;

pub use invalidation::ChangeOutcome;
pub use revision::WriteRevision;

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use crate::compiler::CompileOutput;

/// Forward record for one logical id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// Template source as resolved.
    pub source_path: PathBuf,
    /// Artifact written for this id, if output redirection is configured.
    pub artifact_path: Option<PathBuf>,
    /// Absolute paths read by the last compile, source first.
    pub dependencies: Vec<PathBuf>,
    /// Next load must recompile before serving.
    pub pending_recompile: bool,
    /// Generated code, kept for in-memory compiles only.
    pub(crate) code: Option<String>,
}

impl SourceRecord {
    /// Cached generated code of an in-memory compile.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }
}

/// Reverse record for one emitted artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    /// Logical id of the forward record.
    pub source_id: String,
    /// Mirror of the forward record's dependencies.
    pub watches: Vec<PathBuf>,
    /// Source id to recompile before the next load.
    pub redo: Option<String>,
    /// Bookkeeping of our own writes to this artifact.
    pub revision: WriteRevision,
}

/// Session-scoped compile cache.
#[derive(Debug, Default)]
pub struct CacheStore {
    sources: HashMap<String, SourceRecord>,
    artifacts: HashMap<PathBuf, ArtifactRecord>,
    dependents: HashMap<PathBuf, BTreeSet<String>>,
    hits: usize,
    misses: usize,
}

impl CacheStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward record for `id`.
    #[must_use]
    pub fn source(&self, id: &str) -> Option<&SourceRecord> {
        self.sources.get(id)
    }

    /// Reverse record for an artifact path.
    #[must_use]
    pub fn artifact(&self, path: &Path) -> Option<&ArtifactRecord> {
        self.artifacts.get(path)
    }

    /// Number of forward records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    /// `true` if nothing has been compiled yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Ids whose last compile read `path`.
    #[must_use]
    pub fn dependents_of(&self, path: &Path) -> Vec<String> {
        self.dependents
            .get(path)
            .map(|ids| ids.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Record the result of an in-memory compile and clear any pending flag.
    pub fn record_in_memory(&mut self, id: &str, source_path: &Path, output: CompileOutput) {
        let CompileOutput {
            code,
            dependencies,
        } = output;

        self.set_dependencies(id, &dependencies);
        self.sources.insert(
            id.to_string(),
            SourceRecord {
                source_path: source_path.to_path_buf(),
                artifact_path: None,
                dependencies,
                pending_recompile: false,
                code: Some(code),
            },
        );
        tracing::debug!("Cached in-memory compile of {}", id);
    }

    /// Record a redirected compile: the forward/reverse pair plus the write
    /// about to be made to `artifact_path`.
    ///
    /// The artifact's revision is bumped and remembers `fingerprint`, so the
    /// change notification caused by the write is recognised as an echo.
    /// Returns the new revision number.
    pub fn record_redirected(
        &mut self,
        id: &str,
        source_path: &Path,
        artifact_path: &Path,
        dependencies: Vec<PathBuf>,
        fingerprint: String,
    ) -> u64 {
        self.set_dependencies(id, &dependencies);

        let artifact = self.artifacts.entry(artifact_path.to_path_buf()).or_insert_with(|| {
            ArtifactRecord {
                source_id: id.to_string(),
                watches: Vec::new(),
                redo: None,
                revision: WriteRevision::default(),
            }
        });
        artifact.source_id = id.to_string();
        artifact.watches = dependencies.clone();
        artifact.redo = None;
        let revision = artifact.revision.record_write(fingerprint);

        self.sources.insert(
            id.to_string(),
            SourceRecord {
                source_path: source_path.to_path_buf(),
                artifact_path: Some(artifact_path.to_path_buf()),
                dependencies,
                pending_recompile: false,
                code: None,
            },
        );
        tracing::debug!("Cached artifact {} for {} (revision {})", artifact_path.display(), id, revision);
        revision
    }

    /// Count a load served without compiling.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Count a load that had to compile.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// `(hits, misses)` since the store was created.
    #[must_use]
    pub const fn stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }

    /// Hit rate as a percentage.
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }

    /// Replace the dependency set of `id` in the reverse index.
    ///
    /// Replacement is wholesale: partials the template no longer reads stop
    /// invalidating it.
    fn set_dependencies(&mut self, id: &str, dependencies: &[PathBuf]) {
        if let Some(previous) = self.sources.get(id) {
            for old in &previous.dependencies {
                if let Some(ids) = self.dependents.get_mut(old) {
                    ids.remove(id);
                    if ids.is_empty() {
                        self.dependents.remove(old);
                    }
                }
            }
        }

        for dep in dependencies {
            self.dependents.entry(dep.clone()).or_default().insert(id.to_string());
        }
    }
}
