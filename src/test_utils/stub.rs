//! In-process stand-in for the component compiler.

use anyhow::{Result, bail};
use regex::Regex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, LazyLock};

use crate::compiler::{ComponentCompiler, PartialLoader};
use crate::config::CompileOptions;

static PARTIAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{>\s*([^\s}]+)\s*\}\}").expect("partial pattern is valid")
});

/// Compiler double for tests.
///
/// Every `{{> path }}` reference is loaded through the [`PartialLoader`]
/// (relative to the template) and inlined, one level deep. The result is
/// emitted as
///
/// ```text
/// export default { template: "<expanded>", options: {...} };
/// ```
///
/// Clones share one invocation counter.
#[derive(Debug, Clone, Default)]
pub struct StubCompiler {
    invocations: Arc<AtomicUsize>,
    failure: Option<String>,
}

impl StubCompiler {
    /// A compiler that succeeds whenever every partial can be read.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A compiler that always fails with `message`.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            invocations: Arc::default(),
            failure: Some(message.into()),
        }
    }

    /// Number of `build` calls so far.
    #[must_use]
    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }

    /// Partial references in `source`, in order of appearance.
    #[must_use]
    pub fn partials(source: &str) -> Vec<String> {
        PARTIAL_RE.captures_iter(source).map(|caps| caps[1].to_string()).collect()
    }
}

impl ComponentCompiler for StubCompiler {
    async fn build(
        &self,
        source: &str,
        options: &CompileOptions,
        loader: &PartialLoader,
    ) -> Result<String> {
        self.invocations.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            bail!("{message}");
        }

        let mut template = source.to_string();
        for name in Self::partials(source) {
            let content = loader.load(name.as_str()).await?;
            let reference = PARTIAL_RE
                .find_iter(&template)
                .find(|m| PARTIAL_RE.captures(m.as_str()).is_some_and(|caps| caps[1] == *name))
                .map(|m| m.range());
            if let Some(range) = reference {
                template.replace_range(range, &content);
            }
        }

        Ok(format!(
            "export default {{ template: {}, options: {} }};",
            serde_json::to_string(&template)?,
            options.to_json()
        ))
    }
}
