//! URI Analyzer
//!
//! Best-effort extraction of protocol, host and port presence from a
//! free-form Quick Connect string. Nothing here fails: exhausted fallback
//! chains yield empty strings and callers substitute their own literals.

pub mod name;
pub mod strategies;

pub use name::*;

use serde::{Deserialize, Serialize};

use strategies::{bare_host_port, first_match, port_query, scheme_host_port, structured_port};

/// Fallback token for an unknown protocol
pub const FALLBACK_PROTOCOL: &str = "conn";
/// Fallback token for an unknown host
pub const FALLBACK_HOST: &str = "host";

/// Protocol of the connection string, lowercased; empty when unknown
pub fn protocol(uri: &str) -> String {
    first_match(strategies::PROTOCOL_CHAIN, uri)
        .map(|p| p.to_lowercase())
        .unwrap_or_default()
}

/// Host of the connection string, case preserved; empty when unknown
pub fn host(uri: &str) -> String {
    first_match(strategies::HOST_CHAIN, uri).unwrap_or_default()
}

/// Any port signal: structured port, `scheme://host:N`, `host:N` or `port=N`
pub fn has_port(uri: &str) -> bool {
    structured_port(uri) || scheme_host_port(uri) || bare_host_port(uri) || port_query(uri)
}

/// Read-only view of a connection string
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedTarget {
    pub protocol: String,
    pub host: String,
    pub has_port: bool,
}

impl ParsedTarget {
    pub fn analyze(uri: &str) -> Self {
        Self {
            protocol: protocol(uri),
            host: host(uri),
            has_port: has_port(uri),
        }
    }

    /// Protocol made filename-safe, `conn` when unknown
    pub fn name_protocol(&self) -> String {
        name_token(&self.protocol, FALLBACK_PROTOCOL)
    }

    /// Host made filename-safe, `host` when unknown
    pub fn name_host(&self) -> String {
        name_token(&self.host, FALLBACK_HOST)
    }
}

fn name_token(value: &str, fallback: &str) -> String {
    let raw = if value.is_empty() { fallback } else { value };
    sanitize_for_name(raw)
}

#[cfg(test)]
mod tests;
