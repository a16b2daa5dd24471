//! Command-line host for ractive-bin.
//!
//! The binary plays the part of a module bundler: it resolves and loads ids
//! through a [`Plugin`](crate::plugin::Plugin), keeps the watch set the
//! plugin asks for and forwards file changes back to it.
//!
//! # Commands
//!
//! - `init` - write a starter `ractive.toml`
//! - `resolve` - show what each id resolves to
//! - `build` - resolve and load ids, printing artifacts or generated code
//! - `watch` - build, then rebuild whenever a watched file changes
//!
//! # Global options
//!
//! - `--verbose` - debug logging
//! - `--quiet` - errors only
//! - `--config <PATH>` - configuration file instead of `./ractive.toml`
//!
//! `RUST_LOG` takes precedence over both verbosity flags.
//!
//! ```bash
//! ractive-bin init
//! ractive-bin build views/card views/list --output-dir build/views
//! ractive-bin --verbose watch views/app
//! ```

mod build;
mod common;
mod host;
mod init;
mod resolve;
mod watch;

pub use build::BuildCommand;
pub use host::WatchSet;
pub use init::InitCommand;
pub use resolve::ResolveCommand;
pub use watch::WatchCommand;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Settings derived from the global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Filter used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Explicit configuration file.
    pub config_path: Option<PathBuf>,
}

/// Resolve, compile and cache Ractive component templates.
#[derive(Parser)]
#[command(name = "ractive-bin", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Path to the configuration file (defaults to ./ractive.toml)
    #[arg(short, long, global = true, env = "RACTIVE_BIN_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a ractive.toml with default settings
    Init(InitCommand),
    /// Resolve ids to template files or artifacts
    Resolve(ResolveCommand),
    /// Resolve and load ids once
    Build(BuildCommand),
    /// Build, then rebuild on changes until interrupted
    Watch(WatchCommand),
}

impl Cli {
    /// Run the parsed command.
    pub async fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config).await
    }

    /// Translate the global flags into a [`CliConfig`].
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            config_path: self.config.clone(),
        }
    }

    /// Run the selected command with an explicit configuration.
    pub async fn execute_with_config(self, config: CliConfig) -> Result<()> {
        init_logging(&config.log_level);

        match self.command {
            Commands::Init(cmd) => cmd.execute().await,
            Commands::Resolve(cmd) => cmd.execute(config.config_path).await,
            Commands::Build(cmd) => cmd.execute(config.config_path).await,
            Commands::Watch(cmd) => cmd.execute(config.config_path).await,
        }
    }
}

/// Install the global `tracing` subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `default_level`. Calling this twice is harmless.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
