//! DefaultsDocument: normalized server defaults
//!
//! Two payload shapes are recognized:
//! - `{ "defaults": { ... }, "stamp": "..." }` (current endpoint)
//! - `{ ... }` flat entries object (legacy endpoint, no stamp)
//!
//! Environment-style keys (`QUICKCONNECT_DEFAULT_ENABLE_FONT_SMOOTHING`) are
//! rewritten to parameter names (`enable-font-smoothing`) on ingestion.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

/// Environment-style key prefix, matched case-insensitively
pub const ENV_KEY_PREFIX: &str = "QUICKCONNECT_DEFAULT_";
/// Raw key carrying the screen recording name template
pub const RECORDING_TEMPLATE_KEY: &str = "QUICKCONNECT_DEFAULT_RECORDING_NAME_TEMPLATE";
/// Raw key carrying the typescript name template
pub const TYPESCRIPT_TEMPLATE_KEY: &str = "QUICKCONNECT_DEFAULT_TYPESCRIPT_NAME_TEMPLATE";

fn env_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^QUICKCONNECT_DEFAULT_").expect("env prefix pattern"))
}

/// `QUICKCONNECT_DEFAULT_RECORDING_PATH` -> `recording-path`; other keys verbatim
pub fn normalize_key(key: &str) -> String {
    if !env_prefix_re().is_match(key) {
        return key.to_string();
    }
    env_prefix_re()
        .replace(key, "")
        .to_lowercase()
        .replace('_', "-")
}

/// JSON scalar as a parameter value; `null` is dropped
fn coerce_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(number_text(n)),
        other => Some(other.to_string()),
    }
}

/// Number as JavaScript's `String(n)` renders it: integral values carry no fraction
fn number_text(n: &Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        Some(f) if f == 0.0 => "0".to_string(),
        Some(f) if f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        Some(f) => f.to_string(),
        None => n.to_string(),
    }
}

/// Server-provided parameter defaults for one fetch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsDocument {
    /// Parameter-style entries in payload order, names unique
    entries: Vec<(String, String)>,
    /// Raw template keys exactly as received
    templates: Vec<(String, String)>,
    /// Server-side timestamp for generated names
    stamp: Option<String>,
}

impl DefaultsDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a response body. Non-object payloads yield an empty document.
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        let payload: Value = serde_json::from_str(body)?;
        Ok(Self::from_value(&payload))
    }

    /// Recognize the payload shape and ingest its entries
    pub fn from_value(payload: &Value) -> Self {
        let Some(root) = payload.as_object() else {
            return Self::default();
        };

        match root.get("defaults").and_then(Value::as_object) {
            Some(defaults) => {
                let stamp = root
                    .get("stamp")
                    .and_then(coerce_value)
                    .filter(|s| !s.is_empty());
                Self::from_entries(defaults, stamp)
            }
            None => Self::from_entries(root, None),
        }
    }

    fn from_entries(source: &Map<String, Value>, stamp: Option<String>) -> Self {
        let mut doc = Self {
            stamp,
            ..Self::default()
        };

        for (key, value) in source {
            let Some(value) = coerce_value(value) else {
                continue;
            };
            if key == RECORDING_TEMPLATE_KEY || key == TYPESCRIPT_TEMPLATE_KEY {
                doc.templates.push((key.clone(), value.clone()));
            }
            doc.upsert(normalize_key(key), value);
        }

        doc
    }

    /// Insert or replace an entry; a replaced entry keeps its position
    pub fn upsert(&mut self, name: String, value: String) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn with_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = Some(stamp.into());
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entries in payload order
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Raw template value by its exact uppercase key
    pub fn raw_template(&self, key: &str) -> Option<&str> {
        self.templates
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Template for `name`: the raw key wins, then the normalized
    /// `<name>-template` entry. Empty templates count as absent.
    pub fn template(&self, raw_key: &str, normalized: &str) -> Option<&str> {
        self.raw_template(raw_key)
            .filter(|t| !t.is_empty())
            .or_else(|| self.get(normalized).filter(|t| !t.is_empty()))
    }

    pub fn recording_name_template(&self) -> Option<&str> {
        self.template(RECORDING_TEMPLATE_KEY, "recording-name-template")
    }

    pub fn typescript_name_template(&self) -> Option<&str> {
        self.template(TYPESCRIPT_TEMPLATE_KEY, "typescript-name-template")
    }

    pub fn stamp(&self) -> Option<&str> {
        self.stamp.as_deref()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty() && self.templates.is_empty() && self.stamp.is_none()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DefaultsDocument {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut doc = Self::default();
        for (k, v) in iter {
            doc.upsert(k.into(), v.into());
        }
        doc
    }
}
