//! Create a starter `ractive.toml`.
//!
//! ```bash
//! ractive-bin init
//! ractive-bin init --path ./web
//! ractive-bin init --force
//! ```
//!
//! Fails if the file already exists unless `--force` is given.

use anyhow::{Context, Result, anyhow};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tokio::fs;

use crate::config::{CONFIG_FILE_NAME, PluginConfig};

/// Command to write a default configuration file.
#[derive(Args)]
pub struct InitCommand {
    /// Directory to create the configuration in (defaults to current directory)
    #[arg(short, long)]
    path: Option<PathBuf>,

    /// Overwrite an existing configuration
    #[arg(short, long)]
    force: bool,
}

impl InitCommand {
    /// Writes `ractive.toml` into the target directory, creating it if needed.
    pub async fn execute(self) -> Result<()> {
        let target_dir = self.path.unwrap_or_else(|| PathBuf::from("."));
        let config_path = target_dir.join(CONFIG_FILE_NAME);

        if fs::try_exists(&config_path).await.unwrap_or(false) && !self.force {
            return Err(anyhow!(
                "Configuration already exists at {}. Use --force to overwrite",
                config_path.display()
            ));
        }

        fs::create_dir_all(&target_dir)
            .await
            .with_context(|| format!("Failed to create directory {}", target_dir.display()))?;

        fs::write(&config_path, PluginConfig::init_template())
            .await
            .with_context(|| format!("Failed to write {}", config_path.display()))?;

        println!("{} Initialized {} at {}", "✓".green(), CONFIG_FILE_NAME, config_path.display());
        println!("\n{}", "Next steps:".cyan());
        println!("  Set {} to the prefix of your template ids", "root".bright_white());
        println!("  Then run {}", "ractive-bin build <ids...>".bright_white());

        Ok(())
    }
}
