// canary-assert/src/allowlist.rs
// ============================================================================
// Module: URL Allowlist
// Description: The shared host-allowlist predicate used by every asset-URL
//              check (spec.md §4.6, §8 quantified invariant).
// Purpose: Implement the allowlist match rules exactly once: exact host,
//          `*.` suffix entries, and the special-cased `s3.amazonaws.com`.
// Dependencies: none
// ============================================================================

/// Returns whether `url` is accepted by the allowlist: it starts with
/// `https://`, is not a `data:` URI, and its host satisfies one of the
/// allowlist's match rules (spec.md §4.6, §8).
#[must_use]
pub fn url_allowed(url: &str, allowlist: &[String]) -> bool {
    if !url.starts_with("https://") || url.starts_with("data:") {
        return false;
    }
    let Some(host) = extract_host(url) else {
        return false;
    };
    allowlist.iter().any(|entry| host_matches(&host, entry))
}

/// Extracts the host component of a `https://` URL, dropping any userinfo,
/// port, path, query, or fragment.
#[must_use]
pub fn extract_host(url: &str) -> Option<String> {
    let rest = url.strip_prefix("https://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    let after_userinfo = authority.rsplit('@').next()?;
    let host = after_userinfo.split(':').next()?;
    if host.is_empty() { None } else { Some(host.to_lowercase()) }
}

fn host_matches(host: &str, entry: &str) -> bool {
    let entry = entry.to_lowercase();
    if let Some(suffix) = entry.strip_prefix("*.") {
        return host.ends_with(suffix) && host.len() > suffix.len();
    }
    if entry == "s3.amazonaws.com" {
        return host == entry || host.ends_with(".s3.amazonaws.com");
    }
    host == entry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_https_and_data_uris() {
        let allowlist = vec!["cdn.example.com".to_string()];
        assert!(!url_allowed("http://cdn.example.com/x.png", &allowlist));
        assert!(!url_allowed("data:image/png;base64,abcd", &allowlist));
    }

    #[test]
    fn exact_host_matches() {
        let allowlist = vec!["cdn.example.com".to_string()];
        assert!(url_allowed("https://cdn.example.com/x.png", &allowlist));
        assert!(!url_allowed("https://evil.example.com/x.png", &allowlist));
    }

    #[test]
    fn wildcard_suffix_matches() {
        let allowlist = vec!["*.example.com".to_string()];
        assert!(url_allowed("https://cdn.example.com/x.png", &allowlist));
        assert!(!url_allowed("https://example.com/x.png", &allowlist));
    }

    #[test]
    fn s3_entry_also_matches_subdomain_buckets() {
        let allowlist = vec!["s3.amazonaws.com".to_string()];
        assert!(url_allowed("https://my-bucket.s3.amazonaws.com/x.png", &allowlist));
        assert!(url_allowed("https://s3.amazonaws.com/bucket/x.png", &allowlist));
    }

    #[test]
    fn forced_bad_host_rejects_everything_else() {
        let allowlist = vec!["bad.example.com".to_string()];
        assert!(!url_allowed("https://cdn.example.com/headshot.png", &allowlist));
    }
}
