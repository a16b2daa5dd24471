//! Configuration for ractive-bin
//!
//! The plugin is configured once at construction. The command-line host reads
//! the configuration from `ractive.toml` in the working directory (or the
//! path given with `--config`); library users build a [`PluginConfig`]
//! directly.
//!
//! # Configuration file
//!
//! ```toml
//! # Candidate suffixes, tried in this order for extensionless ids
//! extensions = [".ract.html", ".ractive.html", ".ractive", ".ract"]
//!
//! # Only ids starting with this prefix are handled
//! root = "views"
//!
//! # Write compiled artifacts here instead of compiling in memory
//! output_dir = "build/views"
//! output_extension = ".js"
//!
//! [compiler]
//! # "{bridge}" stands for the bridge script shipped inside the binary
//! command = ["node", "-e", "{bridge}"]
//! timeout_secs = 300
//!
//! # Forwarded verbatim to the component compiler
//! [compile]
//! autoExport = true
//! delimiters = ["{{", "}}"]
//! csp = true
//! ```
//!
//! Every key is optional; a missing file yields [`PluginConfig::default`].

mod options;

pub use options::{CompileOptions, DelimiterPair};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::core::RbinError;

/// Default configuration file name, looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "ractive.toml";

/// Default artifact extension when `output_extension` is not set.
pub const DEFAULT_OUTPUT_EXTENSION: &str = ".js";

/// Compiler argument replaced by the source of the bundled bridge script.
///
/// The default command runs the script with `node -e`, so `ractive` is
/// resolved from the project the binary runs in.
pub const BUNDLED_BRIDGE: &str = "{bridge}";

/// Default timeout for one external compiler invocation.
pub const DEFAULT_COMPILER_TIMEOUT_SECS: u64 = 300;

fn default_extensions() -> Vec<String> {
    [".ract.html", ".ractive.html", ".ractive", ".ract"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_output_extension() -> String {
    DEFAULT_OUTPUT_EXTENSION.to_string()
}

fn default_compiler_command() -> Vec<String> {
    vec!["node".to_string(), "-e".to_string(), BUNDLED_BRIDGE.to_string()]
}

const fn default_timeout_secs() -> u64 {
    DEFAULT_COMPILER_TIMEOUT_SECS
}

/// Plugin configuration.
///
/// # Examples
///
/// ```rust,no_run
/// use ractive_bin::config::PluginConfig;
/// use std::path::PathBuf;
///
/// let config = PluginConfig {
///     root: "views".to_string(),
///     extensions: vec![".ract".to_string()],
///     output_dir: Some(PathBuf::from("build")),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Candidate filename suffixes in priority order.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Identifier prefix filter. Empty matches every id.
    #[serde(default)]
    pub root: String,

    /// Directory receiving compiled artifacts.
    ///
    /// When unset, templates are compiled in memory and the generated code
    /// is handed to the host directly.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,

    /// Suffix appended to the id to name an artifact.
    #[serde(default = "default_output_extension")]
    pub output_extension: String,

    /// How to reach the external compiler.
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Options forwarded to the compiler.
    #[serde(default)]
    pub compile: CompileOptions,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            root: String::new(),
            output_dir: None,
            output_extension: default_output_extension(),
            compiler: CompilerConfig::default(),
            compile: CompileOptions::default(),
        }
    }
}

/// Settings for the process-bridge compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Program and arguments to spawn for each compile.
    #[serde(default = "default_compiler_command")]
    pub command: Vec<String>,

    /// Seconds before a compile is abandoned. `0` disables the timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            command: default_compiler_command(),
            timeout_secs: DEFAULT_COMPILER_TIMEOUT_SECS,
        }
    }
}

impl PluginConfig {
    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config in {}", path.display()))?;

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load configuration from an optional path.
    ///
    /// With `None`, looks for [`CONFIG_FILE_NAME`] in the current directory
    /// and falls back to the defaults when it does not exist. An explicit
    /// path must exist.
    pub async fn load_with_optional(path: Option<PathBuf>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from(&path).await,
            None => {
                let path = PathBuf::from(CONFIG_FILE_NAME);
                if fs::try_exists(&path).await.unwrap_or(false) {
                    Self::load_from(&path).await
                } else {
                    tracing::debug!("No {} found, using defaults", CONFIG_FILE_NAME);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Save configuration as pretty TOML, creating parent directories.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write config to {}", path.display()))
    }

    /// Checks the values the plugin itself relies on.
    ///
    /// # Errors
    ///
    /// [`RbinError::Config`] when an extension is empty or lacks its leading
    /// dot, the output extension is malformed, the compiler command is empty,
    /// or a delimiter pair is invalid.
    pub fn validate(&self) -> Result<(), RbinError> {
        let invalid = |message: String| RbinError::Config {
            message,
        };

        if self.extensions.is_empty() {
            return Err(invalid("extensions must list at least one suffix".to_string()));
        }

        for ext in &self.extensions {
            if ext.len() < 2 || !ext.starts_with('.') {
                return Err(invalid(format!("extension '{ext}' must start with '.'")));
            }
        }

        if self.output_extension.len() < 2 || !self.output_extension.starts_with('.') {
            return Err(invalid(format!(
                "output_extension '{}' must start with '.'",
                self.output_extension
            )));
        }

        if self.compiler.command.is_empty() {
            return Err(invalid("compiler.command must name a program".to_string()));
        }

        self.compile.validate().map_err(invalid)
    }

    /// Returns the configured extension that `id` ends with, if any.
    #[must_use]
    pub fn matching_extension(&self, id: &str) -> Option<&str> {
        self.extensions.iter().map(String::as_str).find(|ext| id.ends_with(ext))
    }

    /// A commented starter configuration, written by `ractive-bin init`.
    #[must_use]
    pub fn init_template() -> &'static str {
        r#"# ractive-bin configuration

# Candidate suffixes, tried in this order for extensionless ids
extensions = [".ract.html", ".ractive.html", ".ractive", ".ract"]

# Only ids starting with this prefix are handled ("" handles everything)
root = ""

# Uncomment to write compiled artifacts instead of compiling in memory
# output_dir = "build/views"
output_extension = ".js"

[compiler]
# "{bridge}" is replaced by the bridge script shipped with ractive-bin
command = ["node", "-e", "{bridge}"]
timeout_secs = 300

# Forwarded verbatim to the component compiler
[compile]
# autoExport = true
# delimiters = ["{{", "}}"]
# staticDelimiters = ["[[", "]]"]
# tripleDelimiters = ["{{{", "}}}"]
# staticTripleDelimiters = ["[[[", "]]]"]
# escapeUnicode = false
# csp = true
"#
    }
}
