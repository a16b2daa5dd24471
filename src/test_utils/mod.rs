//! Test utilities for ractive-bin
//!
//! Helpers shared by unit tests and the integration suite:
//! - [`StubCompiler`] - an in-process component compiler that inlines
//!   `{{> partial }}` references and counts invocations
//! - [`RecordingHost`] - a watch registry that remembers every path
//! - [`TemplateProject`] - a temporary directory with template files
//!
//! # Example
//!
//! ```rust,no_run
//! use ractive_bin::config::PluginConfig;
//! use ractive_bin::plugin::Plugin;
//! use ractive_bin::test_utils::{RecordingHost, StubCompiler, TemplateProject};
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let project = TemplateProject::new()?;
//! let source = project.write("a.ract", "<p>{{> b.ract }}</p>")?;
//! project.write("b.ract", "<b/>")?;
//!
//! let host = Arc::new(RecordingHost::new());
//! let plugin = Plugin::new(PluginConfig::default(), StubCompiler::new(), host.clone())?;
//! plugin.load(source.to_str().unwrap()).await?;
//! assert!(host.is_watching(&project.path("b.ract")));
//! # Ok(())
//! # }
//! ```

mod fixtures;
mod stub;

pub use fixtures::{RecordingHost, TemplateProject};
pub use stub::StubCompiler;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Only the first call has an effect. Uses `level` if given, otherwise
/// `RUST_LOG`; with neither, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=ractive_bin=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
