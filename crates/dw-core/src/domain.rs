//! URL → hostname extraction and watched-domain matching.

use url::Url;

/// Extracts the hostname from a URL string.
///
/// Malformed input yields an empty string; parse failures never propagate.
/// An empty result is treated everywhere as "no domain".
#[must_use]
pub fn extract_domain(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| parsed.host_str().map(str::to_owned))
        .unwrap_or_default()
}

/// Whether `current` counts as being on the watched domain.
///
/// Substring containment, not exact host equality: `www.example.com` matches a
/// watched `example.com`, and so does `notexample.com.evil.com`. An empty
/// current domain never matches anything.
#[must_use]
pub fn domain_matches(current: &str, watched: &str) -> bool {
    !current.is_empty() && current.contains(watched)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_domain_returns_hostname() {
        assert_eq!(extract_domain("https://example.com/a/b?q=1"), "example.com");
        assert_eq!(
            extract_domain("https://sub.example.com:8080/path"),
            "sub.example.com"
        );
        assert_eq!(extract_domain("http://127.0.0.1/"), "127.0.0.1");
    }

    #[test]
    fn extract_domain_is_empty_for_malformed_input() {
        assert_eq!(extract_domain(""), "");
        assert_eq!(extract_domain("not a url"), "");
        assert_eq!(extract_domain("https://"), "");
    }

    #[test]
    fn extract_domain_is_empty_for_hostless_schemes() {
        assert_eq!(extract_domain("about:blank"), "");
        assert_eq!(extract_domain("data:text/plain,hello"), "");
    }

    #[test]
    fn matches_subdomains_by_substring() {
        assert!(domain_matches("example.com", "example.com"));
        assert!(domain_matches("www.example.com", "example.com"));
    }

    #[test]
    fn matches_accidental_substrings() {
        // Permissive on purpose; see DESIGN.md.
        assert!(domain_matches("notexample.com.evil.com", "example.com"));
    }

    #[test]
    fn empty_current_domain_never_matches() {
        assert!(!domain_matches("", "example.com"));
        assert!(!domain_matches("", ""));
    }

    #[test]
    fn empty_watched_domain_matches_any_nonempty_domain() {
        assert!(domain_matches("example.com", ""));
    }

    #[test]
    fn unrelated_domains_do_not_match() {
        assert!(!domain_matches("other.com", "example.com"));
    }
}
