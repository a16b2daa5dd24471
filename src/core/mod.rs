//! Core types shared across ractive-bin
//!
//! Currently this is the error layer: [`RbinError`] for the plugin hooks and
//! [`ErrorContext`] / [`user_friendly_error`] for presenting failures to
//! users of the command-line host.

pub mod error;

pub use error::{ErrorContext, RbinError, user_friendly_error};
