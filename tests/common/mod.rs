#![allow(dead_code)]

use anyhow::Result;
use nav_gatekeeper::config::Config;
use nav_gatekeeper::host::TabNavigator;
use nav_gatekeeper::interceptor::{Gatekeeper, TabId};
use nav_gatekeeper::logger::{DecisionLogSink, DecisionLogger, MemoryLogSink};
use nav_gatekeeper::oracle::{ReputationOracle, Verdict};
use nav_gatekeeper::stats::StatsCollector;
use rustc_hash::FxHashMap;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Oracle with scripted verdicts per URL and an optional delay.
pub struct MockOracle {
    pub calls: Arc<AtomicUsize>,
    verdicts: FxHashMap<String, Verdict>,
    default: Verdict,
    delay: Option<Duration>,
}

impl MockOracle {
    pub fn new(default: Verdict) -> Self {
        Self {
            calls: Arc::new(AtomicUsize::new(0)),
            verdicts: FxHashMap::default(),
            default,
            delay: None,
        }
    }

    pub fn with(mut self, url: &str, verdict: Verdict) -> Self {
        self.verdicts.insert(url.to_string(), verdict);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ReputationOracle for MockOracle {
    async fn classify(&self, url: &str) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.verdicts.get(url).copied().unwrap_or(self.default)
    }
}

/// Navigator that records every command.
#[derive(Default)]
pub struct RecordingNavigator {
    pub redirects: Mutex<Vec<(TabId, String)>>,
    pub countdowns: Mutex<Vec<(TabId, u32, String)>>,
    redirect_delay: Option<Duration>,
}

impl RecordingNavigator {
    /// Each redirect takes `delay` before it lands.
    pub fn with_redirect_delay(delay: Duration) -> Self {
        Self {
            redirect_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn redirects(&self) -> Vec<(TabId, String)> {
        self.redirects.lock().unwrap().clone()
    }

    pub fn countdowns(&self) -> Vec<(TabId, u32, String)> {
        self.countdowns.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl TabNavigator for RecordingNavigator {
    async fn redirect_tab(&self, tab: TabId, url: &str) -> Result<()> {
        if let Some(delay) = self.redirect_delay {
            tokio::time::sleep(delay).await;
        }
        self.redirects.lock().unwrap().push((tab, url.to_string()));
        Ok(())
    }

    async fn show_countdown(&self, tab: TabId, remaining: u32, message: &str) -> Result<()> {
        self.countdowns
            .lock()
            .unwrap()
            .push((tab, remaining, message.to_string()));
        Ok(())
    }
}

pub struct Harness {
    pub gatekeeper: Gatekeeper,
    pub oracle: Arc<MockOracle>,
    pub navigator: Arc<RecordingNavigator>,
    pub stats: Arc<StatsCollector>,
    pub decisions: Arc<RwLock<VecDeque<nav_gatekeeper::logger::DecisionLogEntry>>>,
}

pub fn test_config() -> Config {
    let mut config = Config::default();
    config.logging.decision_log_sinks = vec![];
    config.stats.enable = false;
    config
}

pub fn harness(config: Config, oracle: MockOracle) -> Harness {
    let stats = StatsCollector::new();
    let memory = MemoryLogSink::new(100);
    let decisions = memory.clone_buffer();
    let sinks: Vec<Box<dyn DecisionLogSink>> = vec![Box::new(memory)];
    let logger = DecisionLogger::new(config.logging.clone(), sinks);

    let oracle = Arc::new(oracle);
    let navigator = Arc::new(RecordingNavigator::default());
    let gatekeeper = Gatekeeper::new(
        config,
        stats.clone(),
        logger,
        oracle.clone(),
        navigator.clone(),
    );

    Harness {
        gatekeeper,
        oracle,
        navigator,
        stats,
        decisions,
    }
}
