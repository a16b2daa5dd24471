//! Show what ids resolve to.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

use super::common::{create_plugin, load_config};
use super::host::WatchSet;

/// Run the resolve hook for each id and print the outcome.
///
/// With `output_dir` configured this compiles the templates, exactly as a
/// bundler's resolve step would.
#[derive(Args)]
pub struct ResolveCommand {
    /// Module ids to resolve
    #[arg(required = true)]
    ids: Vec<String>,
}

impl ResolveCommand {
    /// Resolves every id in order.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config = load_config(config_path, None).await?;
        let plugin = create_plugin(config, Arc::new(WatchSet::new()))?;

        for id in &self.ids {
            let resolved =
                plugin.resolve(id).await.with_context(|| format!("Failed to resolve {id}"))?;
            match resolved {
                Some(path) => println!("{} -> {}", id, path.display()),
                None => println!("{} -> {}", id, "declined".yellow()),
            }
        }

        Ok(())
    }
}
