use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;
use tokio::time::Instant;

/// User decisions made on interstitial pages.
///
/// Approvals last for the process lifetime. A bypass is consumed by the next
/// navigation to its URL and lapses after `bypass_ttl` if that never comes.
#[derive(Debug, Clone)]
pub struct SessionState {
    // URLs the user approved from the soft-block page.
    approved: Arc<RwLock<FxHashSet<String>>>,
    // URLs allowed through exactly once from the hard-block page, with grant time.
    bypass_once: Arc<RwLock<FxHashMap<String, Instant>>>,
    bypass_ttl: Duration,
}

impl SessionState {
    pub fn new(bypass_ttl: Duration) -> Self {
        Self {
            approved: Arc::default(),
            bypass_once: Arc::default(),
            bypass_ttl,
        }
    }

    pub fn approve(&self, url: &str) {
        let mut guard = self.approved.write().unwrap_or_else(PoisonError::into_inner);
        guard.insert(url.to_string());
    }

    pub fn is_approved(&self, url: &str) -> bool {
        let guard = self.approved.read().unwrap_or_else(PoisonError::into_inner);
        guard.contains(url)
    }

    pub fn grant_bypass(&self, url: &str, now: Instant) {
        let mut guard = self
            .bypass_once
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.insert(url.to_string(), now);
    }

    /// Consumes a pending bypass for `url`, returning whether it was still valid at `now`.
    pub fn take_bypass(&self, url: &str, now: Instant) -> bool {
        let mut guard = self
            .bypass_once
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match guard.remove(url) {
            Some(granted) => now.saturating_duration_since(granted) < self.bypass_ttl,
            None => false,
        }
    }
}
