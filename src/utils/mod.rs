//! Shared utilities
//!
//! - [`fs`] - async file helpers, path normalization and content fingerprints

pub mod fs;

pub use fs::{absolute_path, normalize_path};
