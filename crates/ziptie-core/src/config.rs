#![forbid(unsafe_code)]

//! Binder configuration.
//!
//! [`BinderConfig`] is built with `with_*` setters or read from the
//! environment:
//!
//! | Variable | Values | Default |
//! |----------|--------|---------|
//! | `ZIPTIE_RECONCILE` | `none`, `first`, `second` | `none` |
//! | `ZIPTIE_CONTENT_FALLBACK` | `mutation`, `untracked` | `mutation` |
//! | `ZIPTIE_EVIDENCE` | `stdout`, `off`, or a file path | `off` |
//!
//! Unrecognised values are logged and ignored.

use serde::Serialize;

use crate::evidence::EvidenceConfig;

/// Fasten-time reconciliation of divergent initial values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Reconcile {
    /// Leave both values as they were.
    #[default]
    None,
    /// Copy the first endpoint's value onto the second.
    FirstWins,
    /// Copy the second endpoint's value onto the first.
    SecondWins,
}

impl Reconcile {
    /// Parse `none` / `first` / `second` (case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "" => Some(Self::None),
            "first" | "first-wins" | "first_wins" => Some(Self::FirstWins),
            "second" | "second-wins" | "second_wins" => Some(Self::SecondWins),
            _ => None,
        }
    }
}

/// How content-only widgets (no dedicated input event) are observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentFallback {
    /// Listen to the widget's `mutation` event.
    #[default]
    MutationObserver,
    /// Attach nothing; the half is listener-less and `snip` reports it.
    Untracked,
}

impl ContentFallback {
    /// Parse `mutation` / `untracked` (case-insensitive).
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "mutation" | "observe" | "" => Some(Self::MutationObserver),
            "untracked" | "none" => Some(Self::Untracked),
            _ => None,
        }
    }
}

/// Configuration for a [`Binder`](crate::Binder).
#[derive(Debug, Clone, Default)]
pub struct BinderConfig {
    /// Reconciliation performed right after a fastening is registered.
    pub reconcile: Reconcile,
    /// Observation strategy for content-only widgets.
    pub content_fallback: ContentFallback,
    /// JSONL evidence output.
    pub evidence: EvidenceConfig,
}

impl BinderConfig {
    /// Default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read configuration from `ZIPTIE_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup function.
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = get_env("ZIPTIE_RECONCILE") {
            match Reconcile::parse(&raw) {
                Some(reconcile) => config.reconcile = reconcile,
                None => tracing::warn!(value = %raw, "ignoring unknown ZIPTIE_RECONCILE"),
            }
        }
        if let Some(raw) = get_env("ZIPTIE_CONTENT_FALLBACK") {
            match ContentFallback::parse(&raw) {
                Some(fallback) => config.content_fallback = fallback,
                None => tracing::warn!(value = %raw, "ignoring unknown ZIPTIE_CONTENT_FALLBACK"),
            }
        }
        if let Some(raw) = get_env("ZIPTIE_EVIDENCE") {
            config.evidence = match raw.trim() {
                "" | "0" | "off" | "false" => EvidenceConfig::disabled(),
                "stdout" | "-" => EvidenceConfig::enabled_stdout(),
                path => EvidenceConfig::enabled_file(path),
            };
        }
        config
    }

    /// Set the reconciliation policy.
    #[must_use]
    pub fn with_reconcile(mut self, reconcile: Reconcile) -> Self {
        self.reconcile = reconcile;
        self
    }

    /// Set the content-widget fallback.
    #[must_use]
    pub fn with_content_fallback(mut self, fallback: ContentFallback) -> Self {
        self.content_fallback = fallback;
        self
    }

    /// Set the evidence sink configuration.
    #[must_use]
    pub fn with_evidence(mut self, evidence: EvidenceConfig) -> Self {
        self.evidence = evidence;
        self
    }
}
