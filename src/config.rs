//! Configuration types and defaults for the Quick Connect integration
//!
//! Passed from JavaScript as a plain object to `install()`; every field is
//! optional and falls back to the values used by the deployed extension.

use serde::{Deserialize, Serialize};
use std::fmt;

/// REST endpoint the defaults document is served from
pub const DEFAULT_DEFAULTS_ENDPOINT: &str = "/api/ext/quickconnect-recording-defaults/defaults";

/// Base directory the baseline recording/typescript paths live under
pub const DEFAULT_RECORDING_BASE: &str = "/var/lib/guacamole/recordings";

// =============================================================================
// Policies
// =============================================================================

/// Which rule set the rewrite engine runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RewritePolicy {
    /// Fixed recording parameters, inserted only when the user has not set them.
    /// No network access; the rewrite happens while the event propagates.
    Baseline,

    /// Server defaults document, authoritative over user-set values.
    /// The submit is deferred until the document has been fetched.
    #[default]
    ServerDefaults,
}

impl fmt::Display for RewritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Baseline => write!(f, "baseline"),
            Self::ServerDefaults => write!(f, "server-defaults"),
        }
    }
}

impl RewritePolicy {
    /// Parse the kebab-case name used in JS config objects
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "baseline" => Some(Self::Baseline),
            "server-defaults" | "server_defaults" | "defaults" => Some(Self::ServerDefaults),
            _ => None,
        }
    }

    /// Whether a cycle under this policy needs the defaults document
    pub fn needs_defaults(&self) -> bool {
        matches!(self, Self::ServerDefaults)
    }
}

/// How often the defaults document is fetched within one page session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DefaultsCachePolicy {
    /// Fetch on every interception cycle; the cache only bridges failures
    #[default]
    RefetchEachCycle,

    /// Fetch until the first success, then reuse that document
    Once,
}

// =============================================================================
// Sections
// =============================================================================

/// Fixed values the baseline rule set inserts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaselineProfile {
    /// Screen recording directory for rdp/vnc
    pub recording_path: String,
    /// Typescript directory for ssh/telnet
    pub typescript_path: String,
    /// Name pattern for screen recordings
    pub recording_name_template: String,
    /// Name pattern for typescripts
    pub typescript_name_template: String,
    /// Value for `recording-include-keys`
    pub include_keys: bool,
    /// Value for `recording-write-existing` / `typescript-write-existing`
    pub write_existing: bool,
    /// Protocol-agnostic parameters appended last (name, value)
    pub extra: Vec<(String, String)>,
}

impl Default for BaselineProfile {
    fn default() -> Self {
        Self {
            recording_path: format!("{}/rec", DEFAULT_RECORDING_BASE),
            typescript_path: format!("{}/ts", DEFAULT_RECORDING_BASE),
            recording_name_template: "${STAMP}-rec-${PROTO}-${HOST}-${GUAC_USERNAME}".to_string(),
            typescript_name_template: "${STAMP}-ts-${PROTO}-${HOST}-${GUAC_USERNAME}".to_string(),
            include_keys: true,
            write_existing: true,
            extra: vec![
                ("security".to_string(), "nla".to_string()),
                ("ignore-cert".to_string(), "true".to_string()),
            ],
        }
    }
}

/// CSS selectors locating the Quick Connect markup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Text input holding the connection URI
    pub input: String,
    /// Button (or any clickable) that starts the connection
    pub trigger: String,
    /// Form whose submit starts the connection
    pub form: String,
    /// Ancestor levels searched above a click target. Default: 2 (three elements in all)
    pub ancestor_depth: usize,
}

impl Default for Selectors {
    fn default() -> Self {
        Self {
            input: r#"input.quickconnect-field, [ng-model="uri"]"#.to_string(),
            trigger: r#"button.quickconnect-button, [ng-click="quickConnect()"]"#.to_string(),
            form: r#"form[ng-submit="quickConnect()"]"#.to_string(),
            ancestor_depth: 2,
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete integration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuickConnectConfig {
    /// Rule set applied on submit. Default: server-defaults
    pub policy: RewritePolicy,
    /// Defaults document URL. Default: /api/ext/quickconnect-recording-defaults/defaults
    pub defaults_endpoint: String,
    /// Abort the defaults fetch after this many milliseconds; 0 disables. Default: 10000
    pub fetch_timeout_ms: u32,
    /// Defaults re-fetch policy. Default: refetch-each-cycle
    pub cache_policy: DefaultsCachePolicy,
    /// Values for the baseline rule set
    pub baseline: BaselineProfile,
    /// DOM selectors
    pub selectors: Selectors,
    /// Log every rewritten URI to the console. Default: true
    pub log_rewrites: bool,
}

impl Default for QuickConnectConfig {
    fn default() -> Self {
        Self {
            policy: RewritePolicy::default(),
            defaults_endpoint: DEFAULT_DEFAULTS_ENDPOINT.to_string(),
            fetch_timeout_ms: 10_000,
            cache_policy: DefaultsCachePolicy::default(),
            baseline: BaselineProfile::default(),
            selectors: Selectors::default(),
            log_rewrites: true,
        }
    }
}

impl QuickConnectConfig {
    /// Configuration for the fixed-baseline deployment
    pub fn baseline() -> Self {
        Self {
            policy: RewritePolicy::Baseline,
            ..Self::default()
        }
    }

    /// Check invariants serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.policy.needs_defaults() && self.defaults_endpoint.trim().is_empty() {
            return Err(ConfigError::EmptyEndpoint);
        }
        for (name, selector) in [
            ("input", &self.selectors.input),
            ("trigger", &self.selectors.trigger),
            ("form", &self.selectors.form),
        ] {
            if selector.trim().is_empty() {
                return Err(ConfigError::EmptySelector(name));
            }
        }
        Ok(())
    }
}

/// Rejected configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    EmptyEndpoint,
    EmptySelector(&'static str),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyEndpoint => write!(f, "defaults_endpoint must not be empty"),
            ConfigError::EmptySelector(which) => write!(f, "{} selector must not be empty", which),
            ConfigError::Invalid(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
