//! Public Suffix List checks for cookie domains.
//!
//! Rejects cookies declared on public suffixes like `.com` or `.co.uk`,
//! which would otherwise be sent to every site under that suffix.

use psl::{List, Psl};

/// Check if a domain is a public suffix (e.g., "com", "co.uk").
pub fn is_public_suffix(domain: &str) -> bool {
    let domain = domain.trim_start_matches('.').to_lowercase();
    let bytes = domain.as_bytes();
    match List.suffix(bytes) {
        Some(suffix) => suffix.as_bytes() == bytes,
        None => false,
    }
}

/// `host` equals `domain` or is a subdomain of it, at a dot boundary.
///
/// `sub.example.com` matches `example.com`; `notexample.com` does not.
pub fn domain_matches(host: &str, domain: &str) -> bool {
    let domain = domain.trim_start_matches('.');
    if domain.is_empty() {
        return false;
    }
    let host = host.to_lowercase();
    let domain = domain.to_lowercase();
    host == domain
        || (host.len() > domain.len()
            && host.ends_with(&domain)
            && host.as_bytes()[host.len() - domain.len() - 1] == b'.')
}

/// A `Domain` attribute is acceptable from `url_host` when it is not a
/// public suffix and the host domain-matches it.
pub fn is_valid_cookie_domain(cookie_domain: &str, url_host: &str) -> bool {
    !is_public_suffix(cookie_domain) && domain_matches(url_host, cookie_domain)
}
