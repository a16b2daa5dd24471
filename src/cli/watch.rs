//! Rebuild entry ids whenever a watched file changes.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::common::{build_entry, create_plugin, load_config, report};
use super::host::WatchSet;
use crate::cache::ChangeOutcome;
use crate::compiler::ComponentCompiler;
use crate::plugin::Plugin;

/// Build once, then poll the watch set until Ctrl-C.
///
/// Every change is forwarded to the plugin. Echoes of the plugin's own
/// artifact writes are ignored; any other change that invalidates a cached
/// template triggers a rebuild of all entry ids.
#[derive(Args)]
pub struct WatchCommand {
    /// Module ids to build
    #[arg(required = true)]
    ids: Vec<String>,

    /// Write artifacts here (overrides `output_dir` from the configuration)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Polling interval in milliseconds
    #[arg(short, long, default_value_t = 500)]
    interval_ms: u64,
}

impl WatchCommand {
    /// Runs until interrupted.
    pub async fn execute(self, config_path: Option<PathBuf>) -> Result<()> {
        let config = load_config(config_path, self.output_dir.clone()).await?;
        let host = Arc::new(WatchSet::new());
        let plugin = create_plugin(config, host.clone())?;

        self.rebuild(&plugin, &host).await;
        host.settle().await;
        println!("{} Watching {} files (Ctrl-C to stop)", "→".cyan(), host.len());

        let mut ticker = tokio::time::interval(Duration::from_millis(self.interval_ms.max(10)));
        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    println!("{} Stopped", "✓".green());
                    return Ok(());
                }
                _ = ticker.tick() => {
                    if self.process_changes(&plugin, &host).await {
                        self.rebuild(&plugin, &host).await;
                    }
                }
            }
        }
    }

    /// Forwards pending changes; `true` if anything was invalidated.
    async fn process_changes<C: ComponentCompiler>(
        &self,
        plugin: &Plugin<C>,
        host: &WatchSet,
    ) -> bool {
        let mut invalidated = false;
        for path in host.poll().await {
            match plugin.on_file_changed(&path).await {
                ChangeOutcome::Invalidated(ids) => {
                    println!("{} {} changed ({})", "↻".yellow(), path.display(), ids.join(", "));
                    invalidated = true;
                }
                ChangeOutcome::EchoSuppressed | ChangeOutcome::Unaffected => {}
            }
        }
        invalidated
    }

    /// Builds every entry, logging failures instead of stopping the watch.
    async fn rebuild<C: ComponentCompiler>(&self, plugin: &Plugin<C>, host: &WatchSet) {
        for id in &self.ids {
            match build_entry(plugin, host, id).await {
                Ok(built) => report(id, &built, false),
                Err(e) => {
                    tracing::error!("{:#}", e);
                    println!("{} {}", "✗".red(), id);
                }
            }
        }
    }
}
