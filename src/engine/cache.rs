use rustc_hash::FxHashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;

/// URL -> last time an oracle check was started for it.
///
/// Keys are exact URL strings. Entries are never evicted, only overwritten
/// by a newer check.
#[derive(Debug)]
pub struct DecisionCache {
    cooldown: Duration,
    entries: Mutex<FxHashMap<Box<str>, Instant>>,
}

impl DecisionCache {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            entries: Mutex::new(FxHashMap::default()),
        }
    }

    /// True iff `url` was checked less than `cooldown` before `now`.
    pub fn should_skip(&self, url: &str, now: Instant) -> bool {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(url) {
            Some(&last_checked) => now.saturating_duration_since(last_checked) < self.cooldown,
            None => false,
        }
    }

    pub fn record_checked(&self, url: &str, now: Instant) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.insert(url.into(), now);
    }

    pub fn last_checked(&self, url: &str) -> Option<Instant> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.get(url).copied()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
