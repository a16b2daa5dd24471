//! Compile options forwarded to the external component compiler.
//!
//! The plugin never interprets these values. They are read from the
//! `[compile]` table of `ractive.toml` and serialized verbatim (camelCase
//! keys, unknown keys preserved) into the compiler invocation.

use serde::{Deserialize, Serialize};

/// A pair of opening and closing mustache delimiters, e.g. `["{{", "}}"]`.
pub type DelimiterPair = [String; 2];

/// Opaque options for the component compiler.
///
/// Known options are typed so that `ractive-bin init` can document them and
/// obvious mistakes are caught early; everything else lands in [`extra`] and
/// is passed through untouched.
///
/// [`extra`]: CompileOptions::extra
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompileOptions {
    /// Export `{ template, css }` automatically for components without a
    /// script section.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_export: Option<bool>,

    /// Standard mustache delimiters (compiler default `{{ }}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delimiters: Option<DelimiterPair>,

    /// Static mustache delimiters (compiler default `[[ ]]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_delimiters: Option<DelimiterPair>,

    /// Triple mustache delimiters (compiler default `{{{ }}}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triple_delimiters: Option<DelimiterPair>,

    /// Static triple mustache delimiters (compiler default `[[[ ]]]`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub static_triple_delimiters: Option<DelimiterPair>,

    /// Emit non-ASCII characters as unicode escapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub escape_unicode: Option<bool>,

    /// Precompile template expressions into functions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub csp: Option<bool>,

    /// Unrecognised options, forwarded as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl CompileOptions {
    /// Validates the typed options.
    ///
    /// Returns a description of the first problem found.
    pub fn validate(&self) -> Result<(), String> {
        let pairs = [
            ("delimiters", &self.delimiters),
            ("staticDelimiters", &self.static_delimiters),
            ("tripleDelimiters", &self.triple_delimiters),
            ("staticTripleDelimiters", &self.static_triple_delimiters),
        ];

        for (name, pair) in pairs {
            let Some([open, close]) = pair else {
                continue;
            };
            if open.is_empty() || close.is_empty() {
                return Err(format!("compile.{name} must contain two non-empty strings"));
            }
        }

        Ok(())
    }

    /// The options as a JSON object, the shape the compiler receives.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|_| serde_json::Value::Object(Default::default()))
    }
}
