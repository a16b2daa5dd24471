//! One-shot build of entry ids.

use anyhow::Result;
use clap::Args;
use futures::future::try_join_all;
use std::path::PathBuf;
use std::sync::Arc;

use super::common::{build_entry, create_plugin, load_config, report};
use super::host::WatchSet;

/// Resolve and load every id concurrently.
///
/// Redirected builds print the artifact path for each id; in-memory builds
/// print the generated code unless `--summary` is given.
#[derive(Args)]
pub struct BuildCommand {
    /// Module ids to build
    #[arg(required = true)]
    ids: Vec<String>,

    /// Write artifacts here (overrides `output_dir` from the configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Only print one line per id
    #[arg(short, long)]
    summary: bool,
}

impl BuildCommand {
    /// Builds every id; the first failure aborts the build.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config = load_config(config_path, self.output_dir).await?;
        let host = Arc::new(WatchSet::new());
        let plugin = create_plugin(config, host.clone())?;

        let results =
            try_join_all(self.ids.iter().map(|id| build_entry(&plugin, &host, id))).await?;

        for (id, built) in self.ids.iter().zip(&results) {
            report(id, built, !self.summary);
        }

        let ((hits, misses), hit_rate) =
            plugin.with_cache(|cache| (cache.stats(), cache.hit_rate()));
        tracing::debug!(
            "Built {} ids ({} compiles, {} cache hits, {:.1}% hit rate, {} files watched)",
            results.len(),
            misses,
            hits,
            hit_rate,
            host.len()
        );
        Ok(())
    }
}
