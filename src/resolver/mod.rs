//! Template id resolution.
//!
//! Maps a module id requested by the host onto a template file:
//!
//! 1. Ids that do not start with the configured `root` are declined.
//! 2. Ids without an extension are tried with every configured extension, in
//!    declared order; the first existing regular file wins.
//! 3. Ids that already end with a configured extension are checked as-is.
//! 4. Ids with any other extension are declined.
//!
//! A failed probe only means "try the next candidate". The resolver never
//! reads or compiles; handing a found file to the compile pipeline is the
//! plugin's job.

use std::path::{Path, PathBuf};

use crate::config::PluginConfig;
use crate::core::RbinError;
use crate::utils::fs::file_exists;

/// Extension-driven id resolver.
#[derive(Debug, Clone)]
pub struct Resolver {
    root: String,
    extensions: Vec<String>,
}

impl Resolver {
    /// Builds a resolver from the plugin configuration.
    #[must_use]
    pub fn new(config: &PluginConfig) -> Self {
        Self {
            root: config.root.clone(),
            extensions: config.extensions.clone(),
        }
    }

    /// `true` if `id` falls under the configured root.
    #[must_use]
    pub fn handles(&self, id: &str) -> bool {
        id.starts_with(&self.root)
    }

    /// Candidate files for `id`, in the order they are probed.
    ///
    /// Empty when the id is declined outright.
    #[must_use]
    pub fn candidates(&self, id: &str) -> Vec<PathBuf> {
        if !self.handles(id) {
            return Vec::new();
        }

        if Path::new(id).extension().is_none() {
            return self.extensions.iter().map(|ext| PathBuf::from(format!("{id}{ext}"))).collect();
        }

        if self.extensions.iter().any(|ext| id.ends_with(ext.as_str())) {
            return vec![PathBuf::from(id)];
        }

        Vec::new()
    }

    /// Checks that `candidate` is an existing regular file.
    ///
    /// # Errors
    ///
    /// [`RbinError::NotFound`] otherwise.
    pub async fn probe(&self, candidate: &Path) -> Result<PathBuf, RbinError> {
        if file_exists(candidate).await {
            Ok(candidate.to_path_buf())
        } else {
            Err(RbinError::NotFound {
                path: candidate.to_path_buf(),
            })
        }
    }

    /// Finds the template file for `id`, or `None` to decline.
    pub async fn locate(&self, id: &str) -> Option<PathBuf> {
        for candidate in self.candidates(id) {
            match self.probe(&candidate).await {
                Ok(found) => {
                    tracing::debug!("Resolved {} to {}", id, found.display());
                    return Some(found);
                }
                Err(e) => tracing::debug!("{}", e),
            }
        }
        None
    }
}
