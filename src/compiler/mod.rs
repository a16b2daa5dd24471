//! Component compilation
//!
//! The template language itself is handled by an external component
//! compiler. This module defines the seam to it and drives it:
//!
//! - [`ComponentCompiler`] - the collaborator interface: source text, opaque
//!   options and a [`PartialLoader`] in, generated module code out
//! - [`compile`] - the orchestrator: reads the source, runs the compiler and
//!   collects every file the compile touched
//! - [`ProcessCompiler`] - an implementation that drives an external process
//!   over a JSON-lines protocol
//!
//! # Example
//!
//! ```rust,no_run
//! use ractive_bin::compiler::{ComponentCompiler, PartialLoader, compile};
//! use ractive_bin::config::CompileOptions;
//! use std::path::Path;
//!
//! struct Verbatim;
//!
//! impl ComponentCompiler for Verbatim {
//!     async fn build(
//!         &self,
//!         source: &str,
//!         _options: &CompileOptions,
//!         _loader: &PartialLoader,
//!     ) -> anyhow::Result<String> {
//!         Ok(format!("export default {};", serde_json::to_string(source)?))
//!     }
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let output = compile(&Verbatim, Path::new("views/card.ract"), &CompileOptions::default()).await?;
//! println!("{} depends on {} files", output.code.len(), output.dependencies.len());
//! # Ok(())
//! # }
//! ```

mod loader;
mod orchestrator;
mod process;

pub use loader::{PartialLoader, PartialRef};
pub use orchestrator::{CompileOutput, compile};
pub use process::ProcessCompiler;

use std::future::Future;

use crate::config::CompileOptions;

/// The external component compiler.
///
/// Implementations turn the raw text of a single-file component into module
/// code. They may call `loader` any number of times to read partials and
/// imports; the orchestrator records every successful read as a dependency
/// of the compiled module.
///
/// Errors are reported as `anyhow::Error`; the orchestrator turns them into
/// [`RbinError::Compile`](crate::core::RbinError::Compile) with the full
/// message chain.
pub trait ComponentCompiler: Send + Sync {
    /// Compile `source` into module code.
    fn build(
        &self,
        source: &str,
        options: &CompileOptions,
        loader: &PartialLoader,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;
}
