//! RFC 1123 label check for names the platform will accept.

use super::MAX_NAME_LEN;
use regex::Regex;
use std::sync::OnceLock;

fn label_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("DNS label pattern is valid")
    })
}

/// Lowercase alphanumerics and `-`, alphanumeric at both ends, at most 63 chars.
pub fn is_dns_label(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LEN && label_re().is_match(name)
}
