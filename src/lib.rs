//! ractive-bin - Ractive component templates for module bundlers
//!
//! A bundler plugin core that turns single-file Ractive components into
//! JavaScript modules, and remembers enough about each compile to rebuild
//! only what a file change affects.
//!
//! # Architecture Overview
//!
//! The host (a bundler, or the bundled `ractive-bin` binary) drives three
//! hooks on a [`plugin::Plugin`]:
//!
//! - **resolve** - map a module id onto a template file by trying the
//!   configured extensions; with `output_dir` set, compile the template to an
//!   artifact file right away
//! - **load** - return generated code, recompiling first if something the
//!   template depends on changed, and tell the host which files to watch
//! - **on_file_changed** - mark every template that read the changed file for
//!   recompilation, ignoring notifications caused by our own artifact writes
//!
//! Compilation itself is delegated to an external component compiler behind
//! the [`compiler::ComponentCompiler`] trait. The compiler reads partials
//! through a [`compiler::PartialLoader`], which is how the plugin learns the
//! dependencies of each template.
//!
//! # Core Modules
//!
//! - [`plugin`] - host-facing hooks and the watch registry seam
//! - [`resolver`] - id → template file resolution
//! - [`compiler`] - compiler trait, partial loader, compile orchestrator and
//!   the process bridge
//! - [`cache`] - session cache: forward/reverse records, reverse dependency
//!   index, write revisions and invalidation
//! - [`config`] - `ractive.toml` and compile options
//! - [`core`] - error types and user-facing error rendering
//! - [`utils`] - filesystem helpers and fingerprints
//! - [`cli`] - the command-line host
//!
//! # Configuration (ractive.toml)
//!
//! ```toml
//! root = "views"
//! extensions = [".ract.html", ".ractive.html", ".ractive", ".ract"]
//! output_dir = "build/views"
//!
//! [compile]
//! autoExport = true
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! ractive-bin init
//! ractive-bin resolve views/card
//! ractive-bin build views/card views/list
//! ractive-bin watch views/app --output-dir build/views
//! ```

pub mod cache;
pub mod cli;
pub mod compiler;
pub mod config;
pub mod core;
pub mod plugin;
pub mod resolver;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
