//! Pattern expansion
//!
//! Turns a user pattern such as `example.com` or `*.linkedin.*` into the
//! hostnames written to the hosts region. The hosts file has no wildcard
//! support, so wildcards are approximated with fixed lists of common
//! subdomains and TLDs.

/// The wildcard marker accepted in patterns
pub const WILDCARD: char = '*';

/// Subdomains added for patterns with a leading wildcard (`*.example.com`)
pub const COMMON_SUBDOMAINS: [&str; 7] = ["m", "mobile", "app", "api", "mail", "login", "account"];

/// TLDs added for patterns with a trailing wildcard (`example.*`)
pub const COMMON_TLDS: [&str; 4] = ["com", "net", "org", "io"];

const PROTOCOL_PREFIXES: [&str; 2] = ["http://", "https://"];

/// Expand one pattern into hostnames, in a fixed order.
///
/// Duplicates are possible (e.g. `*.www.example.com`) and left in place.
pub fn expand_pattern(pattern: &str) -> Vec<String> {
    let pattern = normalize(pattern);
    if pattern.is_empty() {
        return Vec::new();
    }

    if !pattern.contains(WILDCARD) {
        let mut hosts = vec![pattern.to_string()];
        if !pattern.starts_with("www.") {
            hosts.push(format!("www.{pattern}"));
        }
        return hosts;
    }

    let stripped = pattern.replace(WILDCARD, "");
    let base = stripped.trim_matches('.');
    if base.is_empty() {
        return Vec::new();
    }

    let mut hosts = vec![base.to_string(), format!("www.{base}")];

    if pattern.starts_with(WILDCARD) {
        hosts.extend(COMMON_SUBDOMAINS.iter().map(|sub| format!("{sub}.{base}")));
    }

    if pattern.ends_with(".*") {
        for tld in COMMON_TLDS {
            hosts.push(format!("{base}.{tld}"));
            hosts.push(format!("www.{base}.{tld}"));
        }
    }

    hosts
}

/// Expand every pattern, concatenating results in input order
pub fn expand_patterns<S: AsRef<str>>(patterns: &[S]) -> Vec<String> {
    patterns
        .iter()
        .flat_map(|p| expand_pattern(p.as_ref()))
        .collect()
}

fn normalize(pattern: &str) -> &str {
    let mut pattern = pattern.trim();
    for prefix in PROTOCOL_PREFIXES {
        if let Some(rest) = pattern.strip_prefix(prefix) {
            pattern = rest;
            break;
        }
    }
    pattern.trim()
}
