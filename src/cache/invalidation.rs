//! Change notifications against the cache.

use std::path::Path;

use super::CacheStore;

/// What a change notification did to the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The notification was the echo of our own artifact write.
    EchoSuppressed,
    /// These ids will recompile on their next load.
    Invalidated(Vec<String>),
    /// Nothing in the cache depends on the path.
    Unaffected,
}

impl CacheStore {
    /// Handle a change to a path that may be one of our artifacts.
    ///
    /// Returns `None` if `path` is not a known artifact. Otherwise the
    /// change is either recognised as the echo of our latest write
    /// (`observed_fingerprint` equals what we wrote and the write is not yet
    /// acknowledged) or treated as an external edit that schedules the
    /// source for recompilation.
    pub fn artifact_changed(
        &mut self,
        path: &Path,
        observed_fingerprint: Option<&str>,
    ) -> Option<ChangeOutcome> {
        let artifact = self.artifacts.get_mut(path)?;

        if artifact.revision.is_echo(observed_fingerprint) {
            artifact.revision.acknowledge();
            tracing::debug!(
                "Ignoring our own write to {} (revision {})",
                path.display(),
                artifact.revision.written()
            );
            return Some(ChangeOutcome::EchoSuppressed);
        }

        let id = artifact.source_id.clone();
        tracing::warn!("Artifact {} changed externally, scheduling {}", path.display(), id);
        self.mark_pending(&id);
        Some(ChangeOutcome::Invalidated(vec![id]))
    }

    /// Handle a change to a source or partial.
    ///
    /// Every id whose last compile read `path` is marked for recompilation.
    pub fn dependency_changed(&mut self, path: &Path) -> ChangeOutcome {
        let ids = self.dependents_of(path);
        if ids.is_empty() {
            tracing::debug!("No cached template depends on {}", path.display());
            return ChangeOutcome::Unaffected;
        }

        for id in &ids {
            self.mark_pending(id);
        }
        tracing::warn!("{} changed, invalidated {}", path.display(), ids.join(", "));
        ChangeOutcome::Invalidated(ids)
    }

    /// Force `id` to recompile on its next load.
    ///
    /// Sets the forward pending flag and, for redirected compiles, the redo
    /// marker on the artifact so both records agree.
    pub fn mark_pending(&mut self, id: &str) {
        let Some(source) = self.sources.get_mut(id) else {
            return;
        };
        source.pending_recompile = true;

        if let Some(artifact_path) = &source.artifact_path {
            if let Some(artifact) = self.artifacts.get_mut(artifact_path) {
                artifact.redo = Some(id.to_string());
            }
        }
    }

    /// `true` if `id` must recompile before being served.
    #[must_use]
    pub fn needs_recompile(&self, id: &str) -> bool {
        let Some(source) = self.sources.get(id) else {
            return true;
        };
        if source.pending_recompile {
            return true;
        }
        source
            .artifact_path
            .as_ref()
            .and_then(|path| self.artifacts.get(path))
            .is_some_and(|artifact| artifact.redo.is_some())
    }
}
