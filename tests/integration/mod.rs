//! Integration test suite for ractive-bin
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! - **lifecycle**: resolve/load behaviour of the plugin hooks
//! - **invalidation**: dependency tracking and recompilation on change
//! - **echo**: suppression of notifications caused by our own writes
//! - **cli**: the `ractive-bin` binary

#[path = "../common/mod.rs"]
mod common;

mod cli;
mod echo;
mod invalidation;
mod lifecycle;
