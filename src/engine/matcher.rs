use super::traits::TrustMatcher;
use rustc_hash::FxHashSet;

/// Static allowlist backed by an `FxHashSet<Box<str>>`.
#[derive(Debug)]
pub struct HashedTrustMatcher {
    domains: FxHashSet<Box<str>>,
}

impl HashedTrustMatcher {
    pub fn new(domains: &[String]) -> Self {
        let domains = domains
            .iter()
            .map(|d| d.trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .map(String::into_boxed_str)
            .collect();
        Self { domains }
    }

    pub fn len(&self) -> usize {
        self.domains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.domains.is_empty()
    }
}

impl TrustMatcher for HashedTrustMatcher {
    fn matches_host(&self, host: &str) -> bool {
        // Iterative suffix match: "a.b.example.com" -> "b.example.com" -> "example.com" -> "com"
        let mut part = host;
        loop {
            if self.domains.contains(part) {
                return true;
            }

            match part.find('.') {
                Some(idx) => {
                    part = &part[idx + 1..];
                    if part.is_empty() {
                        break;
                    }
                }
                None => break,
            }
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher() -> HashedTrustMatcher {
        HashedTrustMatcher::new(&["github.com".to_string(), "En.Wikipedia.org".to_string()])
    }

    #[test]
    fn test_matcher_logic() {
        let matcher = matcher();

        // Exact match
        assert!(matcher.matches_host("github.com"));

        // Subdomain match
        assert!(matcher.matches_host("gist.github.com"));
        assert!(matcher.matches_host("a.b.github.com"));

        // Configured entries are lower-cased
        assert!(matcher.matches_host("en.wikipedia.org"));
        assert!(!matcher.matches_host("de.wikipedia.org"));

        // Suffix without a dot boundary is not a subdomain
        assert!(!matcher.matches_host("evilgithub.com"));
        assert!(!matcher.matches_host("github.com.evil.test"));
    }

    #[test]
    fn test_is_trusted_parses_url() {
        let matcher = matcher();
        assert!(matcher.is_trusted("https://GitHub.com/rust-lang/rust"));
        assert!(matcher.is_trusted("http://api.github.com:8080/?q=1"));
        assert!(!matcher.is_trusted("https://example-bank-login.test"));
    }

    #[test]
    fn test_malformed_url_is_not_trusted() {
        let matcher = matcher();
        assert!(!matcher.is_trusted("http://"));
        assert!(!matcher.is_trusted("not a url at all"));
        assert!(!matcher.is_trusted("github.com"));
    }
}
