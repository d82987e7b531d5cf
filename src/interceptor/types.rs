use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque browser tab handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationPhase {
    Loading,
    Other,
}

impl NavigationPhase {
    /// Maps the browser's tab status string.
    pub fn from_status(status: &str) -> Self {
        if status == "loading" {
            NavigationPhase::Loading
        } else {
            NavigationPhase::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationEvent {
    pub tab_id: TabId,
    pub url: String,
    pub phase: NavigationPhase,
}

impl NavigationEvent {
    pub fn loading(tab_id: TabId, url: impl Into<String>) -> Self {
        Self {
            tab_id,
            url: url.into(),
            phase: NavigationPhase::Loading,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    NotLoading,
    OwnPage,
    NotHttp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowReason {
    Bypassed,
    Approved,
    Cached,
    Trusted,
    Safe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationOutcome {
    Ignored(IgnoreReason),
    Allowed(AllowReason),
    HardBlocked,
    SoftBlocked,
}

pub(crate) fn is_http(url: &str) -> bool {
    let bytes = url.as_bytes();
    (bytes.len() >= 7 && bytes[..7].eq_ignore_ascii_case(b"http://"))
        || (bytes.len() >= 8 && bytes[..8].eq_ignore_ascii_case(b"https://"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_http() {
        assert!(is_http("http://example.test"));
        assert!(is_http("HTTPS://example.test/x"));
        assert!(is_http("http://"));
        assert!(!is_http("ftp://example.test"));
        assert!(!is_http("chrome-extension://abc/warning.html"));
        assert!(!is_http("about:blank"));
        assert!(!is_http("httpé://x"));
    }

    #[test]
    fn test_phase_from_status() {
        assert_eq!(NavigationPhase::from_status("loading"), NavigationPhase::Loading);
        assert_eq!(NavigationPhase::from_status("complete"), NavigationPhase::Other);
    }
}
