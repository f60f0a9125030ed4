//! Extraction strategies for the URI Analyzer
//!
//! Each strategy is a pure `fn(&str) -> Option<String>`. Strategies are
//! grouped into ordered chains; the first one that produces a non-empty
//! value wins. A structured parse comes first, then regex fallbacks for
//! strings the URL grammar rejects, then query-parameter lookups.

use std::sync::OnceLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

/// Strategy signature shared by the protocol and host chains
pub type Extractor = fn(&str) -> Option<String>;

/// Protocol chain: structured scheme, leading `scheme://`, `protocol=` query
pub const PROTOCOL_CHAIN: &[Extractor] = &[structured_scheme, leading_scheme, protocol_query];

/// Host chain: structured host, leading authority, `hostname`/`host`/`destination` query
pub const HOST_CHAIN: &[Extractor] = &[structured_host, leading_authority, host_query];

/// Query keys tried for a host, highest priority first
pub const HOST_QUERY_KEYS: [&str; 3] = ["hostname", "host", "destination"];

/// Run a chain; first non-empty result wins
pub fn first_match(chain: &[Extractor], uri: &str) -> Option<String> {
    chain
        .iter()
        .filter_map(|extract| extract(uri))
        .find(|value| !value.is_empty())
}

// =============================================================================
// Structured parse
// =============================================================================

/// Absolute URI with an authority component (`scheme://...`).
///
/// Strings such as `server1:3389` parse as scheme `server1` with an opaque
/// path; those are rejected here so the fallbacks can handle them.
fn parse_absolute(uri: &str) -> Option<Url> {
    Url::parse(uri.trim()).ok().filter(|u| u.has_authority())
}

pub fn structured_scheme(uri: &str) -> Option<String> {
    parse_absolute(uri).map(|u| u.scheme().to_string())
}

pub fn structured_host(uri: &str) -> Option<String> {
    parse_absolute(uri).and_then(|u| u.host_str().map(str::to_string))
}

pub fn structured_port(uri: &str) -> bool {
    parse_absolute(uri).and_then(|u| u.port()).is_some()
}

// =============================================================================
// Regex fallbacks
// =============================================================================

fn leading_scheme_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\w+)://").expect("leading scheme pattern"))
}

fn leading_authority_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:\w+://)?([^/:?#&]+)").expect("leading authority pattern"))
}

fn scheme_host_port_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z][a-z0-9+.-]*://[^/?#:]+:\d+").expect("scheme host port pattern")
    })
}

fn bare_host_port_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[^/?#:]+:\d+").expect("bare host port pattern"))
}

fn port_query_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)[?&]port=\d+").expect("port query pattern"))
}

pub fn leading_scheme(uri: &str) -> Option<String> {
    leading_scheme_re()
        .captures(uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn leading_authority(uri: &str) -> Option<String> {
    leading_authority_re()
        .captures(uri)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn scheme_host_port(uri: &str) -> bool {
    scheme_host_port_re().is_match(uri)
}

pub fn bare_host_port(uri: &str) -> bool {
    bare_host_port_re().is_match(uri)
}

pub fn port_query(uri: &str) -> bool {
    port_query_re().is_match(uri)
}

// =============================================================================
// Query lookups
// =============================================================================

/// Value spans `(start, end)` of every `[?&]name=` occurrence, in order.
///
/// `name` is compared byte for byte; a value runs to the next `&`, `#` or
/// the end of the string and may be empty.
pub fn param_spans<'a>(haystack: &'a str, name: &'a str) -> impl Iterator<Item = (usize, usize)> + 'a {
    let bytes = haystack.as_bytes();
    haystack.match_indices(name).filter_map(move |(at, _)| {
        let eq = at + name.len();
        let delimited = at > 0 && matches!(bytes[at - 1], b'?' | b'&');
        if !delimited || bytes.get(eq) != Some(&b'=') {
            return None;
        }
        let start = eq + 1;
        let end = haystack[start..]
            .find(['&', '#'])
            .map_or(haystack.len(), |i| start + i);
        Some((start, end))
    })
}

/// Value of the first `[?&]key=` occurrence, key matched case-insensitively,
/// value percent-decoded. Empty values do not count as present.
pub fn query_value(uri: &str, key: &str) -> Option<String> {
    // ASCII lowercasing keeps byte offsets, so spans index `uri` directly
    let lowered = uri.to_ascii_lowercase();
    let key = key.to_ascii_lowercase();
    let (start, end) = param_spans(&lowered, &key).find(|(start, end)| end > start)?;
    Some(percent_decode_str(&uri[start..end]).decode_utf8_lossy().into_owned())
}

pub fn protocol_query(uri: &str) -> Option<String> {
    query_value(uri, "protocol")
}

pub fn host_query(uri: &str) -> Option<String> {
    HOST_QUERY_KEYS.iter().find_map(|key| query_value(uri, key))
}
