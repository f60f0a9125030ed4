//! Query parameter upserts on an opaque connection string
//!
//! The string is never re-serialized: parameters are located with a
//! `[?&]name=` scan and edited in place, so everything else stays
//! byte-identical.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::target::strategies::param_spans;

/// Characters `encodeURIComponent` leaves alone: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// True if `name=` appears as a query key anywhere (case-sensitive)
pub fn has_param(url: &str, name: &str) -> bool {
    param_spans(url, name).next().is_some()
}

fn append_param(url: &str, name: &str, value: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}={}", url, sep, name, encode_component(value))
}

/// Insert `name=value` unless `name` is already present. Never overwrites.
pub fn ensure_param(url: &str, name: &str, value: &str) -> String {
    if has_param(url, name) {
        return url.to_string();
    }
    append_param(url, name, value)
}

/// Replace the first `name=` value in place, else insert it
pub fn set_param(url: &str, name: &str, value: &str) -> String {
    match param_spans(url, name).next() {
        Some((start, end)) => format!("{}{}{}", &url[..start], encode_component(value), &url[end..]),
        None => append_param(url, name, value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_component_matches_js() {
        assert_eq!(encode_component("/var/lib/rec"), "%2Fvar%2Flib%2Frec");
        assert_eq!(encode_component("${GUAC_USERNAME}"), "%24%7BGUAC_USERNAME%7D");
        assert_eq!(encode_component("a b&c=d"), "a%20b%26c%3Dd");
        assert_eq!(encode_component("keep-_.!~*'()"), "keep-_.!~*'()");
        assert_eq!(encode_component("é"), "%C3%A9");
    }

    #[test]
    fn test_ensure_param_separator() {
        assert_eq!(ensure_param("rdp://h", "security", "nla"), "rdp://h?security=nla");
        assert_eq!(ensure_param("rdp://h?a=1", "security", "nla"), "rdp://h?a=1&security=nla");
    }

    #[test]
    fn test_ensure_param_never_overwrites() {
        let url = "rdp://h?security=rdp";
        assert_eq!(ensure_param(url, "security", "nla"), url);
        // Case-sensitive key match: a differently cased key is a different key
        assert_eq!(ensure_param("rdp://h?Security=rdp", "security", "nla"), "rdp://h?Security=rdp&security=nla");
    }

    #[test]
    fn test_ensure_param_idempotent() {
        let once = ensure_param("ssh://h", "typescript-path", "/t s");
        let twice = ensure_param(&once, "typescript-path", "/t s");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_ensure_param_ignores_suffix_keys() {
        // Only a key preceded by `?` or `&` counts
        assert!(!has_param("h?recording-name=x", "name"));
        assert!(!has_param("h?xname=1", "name"));
        assert!(has_param("h?a=1&name=1", "name"));
    }

    #[test]
    fn test_set_param_replaces_in_place() {
        let url = "rdp://h?a=1&recording-path=%2Fold&b=2#frag";
        assert_eq!(
            set_param(url, "recording-path", "/new"),
            "rdp://h?a=1&recording-path=%2Fnew&b=2#frag"
        );
    }

    #[test]
    fn test_set_param_inserts_when_absent() {
        assert_eq!(set_param("vnc://h", "port", "5900"), "vnc://h?port=5900");
    }

    #[test]
    fn test_set_param_twice_touches_only_target() {
        let base = "rdp://h?x=%20keep&recording-path=a&y=z";
        let first = set_param(base, "recording-path", "/one");
        let second = set_param(&first, "recording-path", "/two");
        assert_eq!(second, "rdp://h?x=%20keep&recording-path=%2Ftwo&y=z");
    }

    #[test]
    fn test_set_param_empty_value_replaced() {
        assert_eq!(set_param("h?port=&a=1", "port", "5900"), "h?port=5900&a=1");
    }

    #[test]
    fn test_set_param_escapes_name_metacharacters() {
        assert_eq!(set_param("h?a.b=1&axb=2", "a.b", "3"), "h?a.b=3&axb=2");
    }
}
