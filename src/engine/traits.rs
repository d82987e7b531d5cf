/// The "Hot Path" check for trusted hosts.
pub trait TrustMatcher: Send + Sync {
    /// Returns true if `host` (already lower-cased) equals or is a subdomain of a trusted domain.
    fn matches_host(&self, host: &str) -> bool;

    /// Parses `url` and checks its hostname. Unparsable URLs are never trusted.
    fn is_trusted(&self, url: &str) -> bool {
        match url::Url::parse(url) {
            Ok(parsed) => match parsed.host_str() {
                Some(host) => self.matches_host(&host.to_ascii_lowercase()),
                None => false,
            },
            Err(_) => false,
        }
    }
}
