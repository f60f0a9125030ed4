//! Rewrite Engine
//!
//! Pure function of `(uri, defaults, context)`: combines the URI Analyzer and
//! the defaults document into a new connection string. The input string is
//! never modified; a new one is returned even when nothing changed.

pub mod params;
pub mod rules;
pub mod template;

pub use params::*;
pub use rules::*;
pub use template::*;

use crate::config::{BaselineProfile, QuickConnectConfig, RewritePolicy};
use crate::defaults::DefaultsDocument;
use crate::target::{format_stamp_iso, ParsedTarget};

/// Values substituted into name templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteContext {
    pub stamp: String,
    /// Sanitized protocol, `conn` when unknown
    pub protocol: String,
    /// Sanitized host, `host` when unknown
    pub host: String,
}

impl RewriteContext {
    /// Context for `uri`: document stamp if present, else the current time
    pub fn resolve(uri: &str, defaults: &DefaultsDocument) -> Self {
        let stamp = defaults
            .stamp()
            .map(str::to_string)
            .unwrap_or_else(format_stamp_iso);
        Self::with_stamp(uri, stamp)
    }

    /// Context for `uri` with an explicit stamp
    pub fn with_stamp(uri: &str, stamp: impl Into<String>) -> Self {
        let target = ParsedTarget::analyze(uri.trim());
        Self {
            stamp: stamp.into(),
            protocol: target.name_protocol(),
            host: target.name_host(),
        }
    }
}

/// Applies one rule set to connection strings
#[derive(Debug, Clone, Default)]
pub struct RewriteEngine {
    policy: RewritePolicy,
    baseline: BaselineProfile,
}

impl RewriteEngine {
    pub fn new(policy: RewritePolicy, baseline: BaselineProfile) -> Self {
        Self { policy, baseline }
    }

    pub fn from_config(config: &QuickConnectConfig) -> Self {
        Self::new(config.policy, config.baseline.clone())
    }

    pub fn policy(&self) -> RewritePolicy {
        self.policy
    }

    /// Rewrite `uri`. Surrounding whitespace is dropped; blank input is
    /// returned as-is.
    pub fn apply(&self, uri: &str, defaults: &DefaultsDocument, ctx: &RewriteContext) -> String {
        let url = uri.trim();
        if url.is_empty() {
            return uri.to_string();
        }
        match self.policy {
            RewritePolicy::ServerDefaults => server_defaults_rules(url, defaults, ctx),
            RewritePolicy::Baseline => baseline_rules(url, &self.baseline, ctx),
        }
    }

    /// `apply` with a context resolved from the URI and document
    pub fn rewrite(&self, uri: &str, defaults: &DefaultsDocument) -> String {
        let ctx = RewriteContext::resolve(uri, defaults);
        self.apply(uri, defaults, &ctx)
    }
}
