//! Rule sets applied by the RewriteEngine
//!
//! - Server defaults: `set_param`, server policy beats values already in the URI
//! - Baseline: `ensure_param`, never overrides what the user typed

use std::sync::OnceLock;

use regex::Regex;

use super::params::{ensure_param, set_param};
use super::template::{apply_template, TemplateValues};
use super::RewriteContext;
use crate::config::BaselineProfile;
use crate::defaults::DefaultsDocument;
use crate::target::has_port;

/// Port injected for VNC targets without any port signal
pub const VNC_DEFAULT_PORT: &str = "5900";

/// Screen recording parameters copied from defaults for graphical protocols
pub const RECORDING_PARAMS: [&str; 4] = [
    "recording-path",
    "create-recording-path",
    "recording-include-keys",
    "recording-write-existing",
];

/// Typescript parameters copied from defaults for text protocols
pub const TYPESCRIPT_PARAMS: [&str; 3] = [
    "typescript-path",
    "create-typescript-path",
    "typescript-write-existing",
];

/// Capture kind implied by a protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolFamily {
    /// rdp, vnc: screen recording
    Graphical,
    /// ssh, telnet: typescript
    Text,
    Other,
}

impl ProtocolFamily {
    pub fn of(protocol: &str) -> Self {
        match protocol {
            "rdp" | "vnc" => Self::Graphical,
            "ssh" | "telnet" => Self::Text,
            _ => Self::Other,
        }
    }
}

fn template_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\btemplate$").expect("template suffix pattern"))
}

/// Template entries configure names, they are never sent as parameters
pub fn is_template_param(name: &str) -> bool {
    template_suffix_re().is_match(name)
}

fn values(ctx: &RewriteContext) -> TemplateValues<'_> {
    TemplateValues {
        stamp: &ctx.stamp,
        proto: &ctx.protocol,
        host: &ctx.host,
    }
}

// =============================================================================
// Server defaults
// =============================================================================

pub fn server_defaults_rules(uri: &str, defaults: &DefaultsDocument, ctx: &RewriteContext) -> String {
    let mut url = uri.to_string();
    let family = ProtocolFamily::of(&ctx.protocol);

    // Port first: the recording block below must see the final port state
    if ctx.protocol == "vnc" && !has_port(&url) {
        url = set_param(&url, "port", VNC_DEFAULT_PORT);
    }

    match family {
        ProtocolFamily::Graphical => {
            url = copy_params(url, defaults, &RECORDING_PARAMS);
            if let Some(tpl) = defaults.recording_name_template() {
                url = set_param(&url, "recording-name", &apply_template(tpl, &values(ctx)));
            }
        }
        ProtocolFamily::Text => {
            url = copy_params(url, defaults, &TYPESCRIPT_PARAMS);
            if let Some(tpl) = defaults.typescript_name_template() {
                url = set_param(&url, "typescript-name", &apply_template(tpl, &values(ctx)));
            }
        }
        ProtocolFamily::Other => {}
    }

    // Protocol-agnostic passthrough of everything else the server pushes
    for (name, value) in defaults.entries() {
        if is_template_param(name) {
            continue;
        }
        url = set_param(&url, name, value);
    }

    url
}

fn copy_params(mut url: String, defaults: &DefaultsDocument, names: &[&str]) -> String {
    for name in names {
        if let Some(value) = defaults.get(name) {
            url = set_param(&url, name, value);
        }
    }
    url
}

// =============================================================================
// Baseline
// =============================================================================

pub fn baseline_rules(uri: &str, profile: &BaselineProfile, ctx: &RewriteContext) -> String {
    let mut url = uri.to_string();
    let flag = |b: bool| if b { "true" } else { "false" };

    match ProtocolFamily::of(&ctx.protocol) {
        ProtocolFamily::Graphical => {
            let name = apply_template(&profile.recording_name_template, &values(ctx));
            url = ensure_param(&url, "recording-path", &profile.recording_path);
            url = ensure_param(&url, "recording-name", &name);
            url = ensure_param(&url, "create-recording-path", "true");
            url = ensure_param(&url, "recording-include-keys", flag(profile.include_keys));
            url = ensure_param(&url, "recording-write-existing", flag(profile.write_existing));
        }
        ProtocolFamily::Text => {
            let name = apply_template(&profile.typescript_name_template, &values(ctx));
            url = ensure_param(&url, "typescript-path", &profile.typescript_path);
            url = ensure_param(&url, "create-typescript-path", "true");
            url = ensure_param(&url, "typescript-name", &name);
            url = ensure_param(&url, "typescript-write-existing", flag(profile.write_existing));
        }
        ProtocolFamily::Other => {}
    }

    for (name, value) in &profile.extra {
        url = ensure_param(&url, name, value);
    }

    url
}
