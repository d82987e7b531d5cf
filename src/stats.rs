use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::time::{self, Duration};
use tracing::info;

#[derive(Debug, Default)]
pub struct StatsCollector {
    // Navigation pipeline
    navigations: AtomicU64,
    ignored: AtomicU64,
    trusted: AtomicU64,
    cache_hits: AtomicU64,
    approved: AtomicU64,

    // Oracle
    oracle_calls: AtomicU64,
    oracle_failures: AtomicU64,
    safe: AtomicU64,
    hard_blocks: AtomicU64,
    soft_blocks: AtomicU64,

    // Interstitial outcomes
    proceeds: AtomicU64,
    cancels: AtomicU64,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub navigations: u64,
    pub ignored: u64,
    pub trusted: u64,
    pub cache_hits: u64,
    pub approved: u64,
    pub oracle_calls: u64,
    pub oracle_failures: u64,
    pub safe: u64,
    pub hard_blocks: u64,
    pub soft_blocks: u64,
    pub proceeds: u64,
    pub cancels: u64,
}

impl StatsCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Spawns the periodic dump task.
    pub fn start_reporter(self: &Arc<Self>, log_interval_sec: u64) {
        let stats = self.clone();
        let interval = Duration::from_secs(log_interval_sec.max(1));
        tokio::spawn(async move {
            stats.run_logger(interval).await;
        });
    }

    pub fn inc_navigations(&self) {
        self.navigations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_ignored(&self) {
        self.ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_trusted(&self) {
        self.trusted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_approved(&self) {
        self.approved.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_oracle_calls(&self) {
        self.oracle_calls.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_oracle_failures(&self) {
        self.oracle_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_safe(&self) {
        self.safe.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_hard_blocks(&self) {
        self.hard_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_soft_blocks(&self) {
        self.soft_blocks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_proceeds(&self) {
        self.proceeds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn inc_cancels(&self) {
        self.cancels.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            navigations: self.navigations.load(Ordering::Relaxed),
            ignored: self.ignored.load(Ordering::Relaxed),
            trusted: self.trusted.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            approved: self.approved.load(Ordering::Relaxed),
            oracle_calls: self.oracle_calls.load(Ordering::Relaxed),
            oracle_failures: self.oracle_failures.load(Ordering::Relaxed),
            safe: self.safe.load(Ordering::Relaxed),
            hard_blocks: self.hard_blocks.load(Ordering::Relaxed),
            soft_blocks: self.soft_blocks.load(Ordering::Relaxed),
            proceeds: self.proceeds.load(Ordering::Relaxed),
            cancels: self.cancels.load(Ordering::Relaxed),
        }
    }

    async fn run_logger(&self, log_interval: Duration) {
        let mut interval = time::interval(log_interval);
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.dump_stats();
        }
    }

    fn dump_stats(&self) {
        let s = self.snapshot();
        let blocked = s.hard_blocks + s.soft_blocks;

        info!(
            "STATS DUMP: Navigations: {}, Ignored: {}, Trusted: {}, CacheHits: {}, Approved: {}, OracleCalls: {} (failed {}), Safe: {}, Blocked: {} ({:.1}%) [hard {} / soft {}], Interstitial: proceed {} / cancel {}",
            s.navigations,
            s.ignored,
            s.trusted,
            s.cache_hits,
            s.approved,
            s.oracle_calls,
            s.oracle_failures,
            s.safe,
            blocked,
            if s.navigations > 0 {
                (blocked as f64 / s.navigations as f64) * 100.0
            } else {
                0.0
            },
            s.hard_blocks,
            s.soft_blocks,
            s.proceeds,
            s.cancels
        );
    }
}
