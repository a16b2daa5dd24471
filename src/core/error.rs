//! Error handling for ractive-bin
//!
//! Two layers, mirroring how the plugin is used:
//! 1. [`RbinError`] - strongly-typed errors returned by the plugin hooks
//!    (`resolve`, `load`, `on_file_changed`) and the compile orchestrator
//! 2. [`ErrorContext`] - a user-facing wrapper with details and a suggestion,
//!    produced by [`user_friendly_error`] for the command-line host
//!
//! # Propagation policy
//!
//! Existence probes are expected to fail and drive control flow: the resolver
//! swallows [`RbinError::NotFound`] per candidate and simply declines. Anything
//! that happens after a file is known to exist ([`RbinError::Read`],
//! [`RbinError::Compile`], [`RbinError::Write`]) is fatal for the module being
//! built and is returned to the host unchanged. Nothing is retried.
//!
//! # Examples
//!
//! ```rust,no_run
//! use ractive_bin::core::{RbinError, user_friendly_error};
//!
//! let err = RbinError::Compile {
//!     path: "views/card.ract".into(),
//!     message: "Unexpected template content".to_string(),
//! };
//! let ctx = user_friendly_error(anyhow::Error::from(err));
//! ctx.display(); // coloured error, details and suggestion on stderr
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for plugin operations.
///
/// Each variant corresponds to one stage of the resolve → compile → emit
/// pipeline, so callers can tell a missing file from a broken template
/// without string matching.
#[derive(Error, Debug)]
pub enum RbinError {
    /// A candidate file does not exist.
    ///
    /// Produced by existence probes. The resolver swallows it and moves on to
    /// the next candidate extension, so it only reaches callers that probe a
    /// single explicit path.
    #[error("File not found: {}", path.display())]
    NotFound {
        /// The path that was probed
        path: PathBuf,
    },

    /// A file that exists could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Read {
        /// File being read (template source or partial)
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The external component compiler rejected the template.
    #[error("Failed to compile {}: {message}", path.display())]
    Compile {
        /// Template source being compiled
        path: PathBuf,
        /// Message reported by the compiler
        message: String,
    },

    /// Creating the artifact directory or writing the artifact failed.
    #[error("Failed to write {}: {source}", path.display())]
    Write {
        /// Artifact path or directory being created
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The plugin configuration is invalid.
    #[error("Invalid configuration: {message}")]
    Config {
        /// What is wrong with the configuration
        message: String,
    },

    /// The process bridge to the external compiler misbehaved.
    ///
    /// Covers spawn failures, timeouts and protocol violations. The
    /// orchestrator reports these as compile failures for the affected
    /// module.
    #[error("Compiler bridge error: {message}")]
    Bridge {
        /// Description of the failure
        message: String,
    },
}

impl RbinError {
    /// Returns `true` for errors that the resolver treats as "keep looking".
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Error wrapper carrying user-facing guidance.
///
/// Built by [`user_friendly_error`] at the top of the command-line host and
/// printed with [`ErrorContext::display`].
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: anyhow::Error,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub fn new(error: impl Into<anyhow::Error>) -> Self {
        Self {
            error: error.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error
    ///
    /// Suggestions should be actionable steps. They are displayed in green.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add additional details explaining the error
    ///
    /// Details are displayed in yellow, below the error itself.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Display the error context to stderr with terminal colors
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {:#}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

/// Convert any error into an [`ErrorContext`] with tailored guidance.
///
/// Looks through the `anyhow` chain for a [`RbinError`], a TOML parse error
/// or an I/O error and attaches matching details and suggestions. Unknown
/// errors are wrapped without guidance.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    let rbin = error.chain().find_map(|cause| cause.downcast_ref::<RbinError>());

    if let Some(rbin) = rbin {
        let (details, suggestion) = match rbin {
            RbinError::NotFound { .. } => (
                "No file exists at the requested location",
                "Check the id against the configured `root` and `extensions`",
            ),
            RbinError::Read { .. } => (
                "The file exists but could not be read as UTF-8 text",
                "Check file permissions and encoding",
            ),
            RbinError::Compile { .. } => (
                "The component compiler rejected the template; nothing was cached for it",
                "Fix the template and rebuild. Run with --verbose to see compiler output",
            ),
            RbinError::Write { .. } => (
                "The compiled artifact could not be written to the output directory",
                "Check that `output_dir` is writable",
            ),
            RbinError::Config { .. } => (
                "ractive.toml contains a value the plugin cannot use",
                "Run `ractive-bin init --force` to regenerate a default configuration",
            ),
            RbinError::Bridge { .. } => (
                "The external compiler process could not be driven",
                "Check `[compiler] command` in ractive.toml and that the command is installed",
            ),
        };
        return ErrorContext::new(error).with_details(details).with_suggestion(suggestion);
    }

    if error.chain().any(|cause| cause.downcast_ref::<toml::de::Error>().is_some()) {
        return ErrorContext::new(error)
            .with_details("TOML parsing errors are usually missing quotes or mismatched brackets")
            .with_suggestion("Check the syntax of ractive.toml");
    }

    if let Some(io_error) = error.chain().find_map(|cause| cause.downcast_ref::<std::io::Error>())
    {
        match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => {
                return ErrorContext::new(error)
                    .with_suggestion("Check file ownership and permissions");
            }
            std::io::ErrorKind::NotFound => {
                return ErrorContext::new(error)
                    .with_suggestion("Check that the file or directory exists and the path is correct");
            }
            _ => {}
        }
    }

    ErrorContext::new(error)
}
