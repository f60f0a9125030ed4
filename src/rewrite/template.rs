//! `${NAME}` template expansion for recording/typescript names
//!
//! Only `${STAMP}`, `${PROTO}` and `${HOST}` are expanded here. Every other
//! token (e.g. `${GUAC_USERNAME}`) is left verbatim for server-side expansion.

/// Values for the locally expanded tokens
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateValues<'a> {
    pub stamp: &'a str,
    pub proto: &'a str,
    pub host: &'a str,
}

pub fn apply_template(template: &str, values: &TemplateValues<'_>) -> String {
    template
        .replace("${STAMP}", values.stamp)
        .replace("${PROTO}", values.proto)
        .replace("${HOST}", values.host)
}
