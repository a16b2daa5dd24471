//! Shared plumbing for commands that drive the plugin.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::host::WatchSet;
use crate::compiler::{ComponentCompiler, ProcessCompiler};
use crate::config::PluginConfig;
use crate::core::RbinError;
use crate::plugin::Plugin;

/// Plugin type used by the command-line host.
pub type CliPlugin = Plugin<ProcessCompiler>;

/// What loading one entry id produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Built {
    /// The template was written to this artifact.
    Artifact(PathBuf),
    /// The template was compiled in memory.
    Code(String),
}

/// Loads the configuration and applies a command-line output directory.
pub async fn load_config(
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<PluginConfig> {
    let mut config = PluginConfig::load_with_optional(config_path).await?;
    if output_dir.is_some() {
        config.output_dir = output_dir;
    }
    Ok(config)
}

/// Creates a plugin backed by the configured compiler process.
pub fn create_plugin(config: PluginConfig, host: Arc<WatchSet>) -> Result<CliPlugin> {
    let compiler = ProcessCompiler::from_config(&config.compiler)?;
    let plugin = Plugin::new(config, compiler, host)?;
    Ok(plugin)
}

/// Resolves and loads one entry id the way a bundler would.
///
/// When `load` hands back `None` the host reads the artifact itself, so the
/// artifact joins the watch set.
pub async fn build_entry<C: ComponentCompiler>(
    plugin: &Plugin<C>,
    host: &WatchSet,
    id: &str,
) -> Result<Built> {
    let resolved = plugin
        .resolve(id)
        .await
        .with_context(|| format!("Failed to resolve {id}"))?
        .ok_or_else(|| RbinError::NotFound {
            path: PathBuf::from(id),
        })?;

    let key = resolved.to_string_lossy();
    match plugin.load(&key).await.with_context(|| format!("Failed to load {id}"))? {
        Some(code) => Ok(Built::Code(code)),
        None => {
            host.watch(&resolved);
            Ok(Built::Artifact(resolved))
        }
    }
}

/// Prints the outcome of one entry.
pub fn report(id: &str, built: &Built, print_code: bool) {
    match built {
        Built::Artifact(path) => {
            println!("{} {} -> {}", "✓".green(), id, display_path(path));
        }
        Built::Code(code) => {
            println!("{} {} ({} bytes, in memory)", "✓".green(), id, code.len());
            if print_code {
                println!("{code}");
            }
        }
    }
}

fn display_path(path: &Path) -> String {
    std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(cwd).ok().map(Path::to_path_buf))
        .unwrap_or_else(|| path.to_path_buf())
        .display()
        .to_string()
}
