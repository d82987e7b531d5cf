use crate::oracle::Verdict;
use futures::future::{BoxFuture, FutureExt, Shared};
use rustc_hash::FxHashMap;
use std::sync::{Mutex, PoisonError};

pub type SharedVerdict = Shared<BoxFuture<'static, Verdict>>;

/// Oracle checks currently in flight, keyed by exact URL.
#[derive(Default)]
pub struct PendingChecks {
    inflight: Mutex<FxHashMap<Box<str>, SharedVerdict>>,
}

pub enum Join {
    /// This caller started the check. Hold the guard until the verdict is in.
    Leader(SharedVerdict),
    /// Another navigation already owns the check.
    Follower(SharedVerdict),
}

/// Removes the in-flight entry when dropped, even if the leader is cancelled mid-check.
pub struct PendingGuard<'a> {
    checks: &'a PendingChecks,
    url: &'a str,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.checks.finish(self.url);
    }
}

impl PendingChecks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str) -> Option<SharedVerdict> {
        let inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        inflight.get(url).cloned()
    }

    /// Returns the in-flight check for `url`, or registers `start()` as the new one.
    pub fn join_or_start<F>(&self, url: &str, start: F) -> Join
    where
        F: FnOnce() -> BoxFuture<'static, Verdict>,
    {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = inflight.get(url) {
            return Join::Follower(existing.clone());
        }
        let shared = start().shared();
        inflight.insert(url.into(), shared.clone());
        Join::Leader(shared)
    }

    pub fn guard<'a>(&'a self, url: &'a str) -> PendingGuard<'a> {
        PendingGuard { checks: self, url }
    }

    pub fn finish(&self, url: &str) {
        let mut inflight = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        inflight.remove(url);
    }
}
