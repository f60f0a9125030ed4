//! URI Analyzer contract tests

use super::*;

// ============================================================================
// protocol()
// ============================================================================

#[test]
fn test_protocol_from_scheme() {
    assert_eq!(protocol("rdp://server1"), "rdp");
    assert_eq!(protocol("SSH://user@box:22"), "ssh");
}

#[test]
fn test_protocol_query_without_scheme() {
    // Contract: an explicit protocol= parameter is honored without a scheme prefix
    for uri in [
        "server1?protocol=RDP",
        "server1:3389?protocol=Rdp",
        "?hostname=box&protocol=vnc",
        "box&PROTOCOL=Telnet",
        "box?protocol=s%53h",
    ] {
        let expected = query_value_lower(uri);
        assert_eq!(protocol(uri), expected, "uri: {}", uri);
    }
}

fn query_value_lower(uri: &str) -> String {
    strategies::query_value(uri, "protocol").unwrap().to_lowercase()
}

#[test]
fn test_protocol_unknown_is_empty() {
    assert_eq!(protocol("server1"), "");
    assert_eq!(protocol(""), "");
}

// ============================================================================
// host()
// ============================================================================

#[test]
fn test_host_from_structured_parse() {
    assert_eq!(host("rdp://Server1:3389/?x=1"), "Server1");
}

#[test]
fn test_host_regex_fallback() {
    assert_eq!(host("server1:3389"), "server1");
    assert_eq!(host("server1"), "server1");
}

#[test]
fn test_host_query_fallback() {
    assert_eq!(host("?protocol=ssh&host=jump%2D1"), "jump-1");
    assert_eq!(host(""), "");
}

// ============================================================================
// has_port()
// ============================================================================

#[test]
fn test_has_port_scheme_host_port() {
    for uri in ["rdp://server1:3389", "vnc://server1:5901/", "ssh://h:22/x?y=1"] {
        assert!(has_port(uri), "uri: {}", uri);
    }
}

#[test]
fn test_has_port_false_without_signal() {
    for uri in ["rdp://server1/", "vnc://server1", "vnc://server1/?a=b"] {
        assert!(!has_port(uri), "uri: {}", uri);
    }
}

#[test]
fn test_has_port_other_signals() {
    assert!(has_port("server1:5900"));
    assert!(has_port("vnc://server1?port=5901"));
}

// ============================================================================
// ParsedTarget
// ============================================================================

#[test]
fn test_parsed_target_analyze() {
    let target = ParsedTarget::analyze("vnc://Lab Box?port=5901");
    assert_eq!(target.protocol, "vnc");
    assert_eq!(target.host, "Lab Box");
    assert!(target.has_port);
    assert_eq!(target.name_host(), "lab_box");
}

#[test]
fn test_parsed_target_fallback_tokens() {
    let target = ParsedTarget::analyze("");
    assert_eq!(target, ParsedTarget::default());
    assert_eq!(target.name_protocol(), FALLBACK_PROTOCOL);
    assert_eq!(target.name_host(), FALLBACK_HOST);
}
