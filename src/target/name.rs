//! Filename-safe tokens: sanitized protocol/host names and timestamp stamps

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;

fn unsafe_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9._-]+").expect("unsafe run pattern"))
}

/// Lowercase, collapse runs outside `[a-z0-9._-]` to `_`, trim `_` at both ends
pub fn sanitize_for_name(s: &str) -> String {
    if s.is_empty() {
        return String::new();
    }
    let lowered = s.to_lowercase();
    unsafe_run_re()
        .replace_all(&lowered, "_")
        .trim_matches('_')
        .to_string()
}

/// ISO-8601 UTC without sub-seconds, `:` replaced by `-`
///
/// `2025-09-01T08:15:30.123Z` becomes `2025-09-01T08-15-30Z`.
pub fn format_stamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H-%M-%SZ").to_string()
}

/// `format_stamp` for the current instant
pub fn format_stamp_iso() -> String {
    format_stamp(Utc::now())
}
