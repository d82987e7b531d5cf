use super::types::{
    is_http, AllowReason, IgnoreReason, NavigationEvent, NavigationOutcome, NavigationPhase,
};
use crate::channel::GateMessage;
use crate::config::Config;
use crate::engine::{DecisionCache, HashedTrustMatcher, Join, PendingChecks, SessionState, TrustMatcher};
use crate::host::TabNavigator;
use crate::interstitial::InterstitialPages;
use crate::logger::{DecisionAction, DecisionLogEntry, DecisionLogger};
use crate::oracle::{ReputationOracle, Verdict};
use crate::stats::StatsCollector;
use futures::future::{BoxFuture, FutureExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

/// Navigation interceptor. Owns the decision cache, the trusted-domain matcher
/// and the per-session approvals; cheap to clone.
#[derive(Clone)]
pub struct Gatekeeper {
    config: Arc<Config>,
    stats: Arc<StatsCollector>,
    logger: Arc<DecisionLogger>,
    trusted: Arc<dyn TrustMatcher>,
    cache: Arc<DecisionCache>,
    session: SessionState,
    pending: Arc<PendingChecks>,
    oracle: Arc<dyn ReputationOracle>,
    navigator: Arc<dyn TabNavigator>,
    pages: InterstitialPages,
}

impl Gatekeeper {
    pub fn new(
        config: Config,
        stats: Arc<StatsCollector>,
        logger: Arc<DecisionLogger>,
        oracle: Arc<dyn ReputationOracle>,
        navigator: Arc<dyn TabNavigator>,
    ) -> Self {
        let trusted = HashedTrustMatcher::new(&config.trusted_domains);
        info!("Loaded {} trusted domains", trusted.len());

        Self {
            cache: Arc::new(DecisionCache::new(config.cooldown())),
            pages: InterstitialPages::new(&config.interstitial_base),
            trusted: Arc::new(trusted),
            session: SessionState::new(config.cooldown()),
            pending: Arc::new(PendingChecks::new()),
            config: Arc::new(config),
            stats,
            logger,
            oracle,
            navigator,
        }
    }

    pub fn cache(&self) -> &DecisionCache {
        &self.cache
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn pages(&self) -> &InterstitialPages {
        &self.pages
    }

    /// Handles one tab-update event from the browser.
    pub async fn on_navigation(&self, event: NavigationEvent) -> NavigationOutcome {
        let start = Instant::now();
        self.stats.inc_navigations();

        if let Some(reason) = self.filter(&event) {
            self.stats.inc_ignored();
            debug!("Ignoring navigation in tab {} ({:?}): {}", event.tab_id, reason, event.url);
            return NavigationOutcome::Ignored(reason);
        }

        let url = event.url.as_str();

        // 1. User decisions from interstitial pages
        if self.session.take_bypass(url, start) {
            self.stats.inc_approved();
            return self.allow(&event, AllowReason::Bypassed, None, start);
        }
        if self.session.is_approved(url) {
            self.stats.inc_approved();
            return self.allow(&event, AllowReason::Approved, None, start);
        }

        // 2. Join a check that is already running for this URL
        if self.config.dedupe_in_flight {
            if let Some(inflight) = self.pending.get(url) {
                debug!("Joining in-flight check for {}", url);
                let verdict = inflight.await;
                return self.enforce(&event, verdict, start).await;
            }
        }

        // 3. Checked recently
        if self.cache.should_skip(url, start) {
            self.stats.inc_cache_hit();
            return self.allow(&event, AllowReason::Cached, None, start);
        }

        // 4. Trusted domain
        if self.trusted.is_trusted(url) {
            self.stats.inc_trusted();
            return self.allow(&event, AllowReason::Trusted, None, start);
        }

        // 5. Ask the oracle
        let verdict = self.check(url, start).await;
        self.enforce(&event, verdict, start).await
    }

    /// Consumes interstitial messages until every sender is gone.
    pub async fn listen(&self, mut rx: mpsc::Receiver<GateMessage>) {
        while let Some(message) = rx.recv().await {
            self.handle_message(message);
        }
        debug!("Gate message channel closed");
    }

    pub fn handle_message(&self, message: GateMessage) {
        match message {
            GateMessage::AllowUrl { url } => {
                info!("User approved {} for this session", url);
                self.session.approve(&url);
            }
            GateMessage::BypassOnce { url } => {
                info!("User proceeded past block for {}", url);
                self.session.grant_bypass(&url, Instant::now());
            }
        }
    }

    fn filter(&self, event: &NavigationEvent) -> Option<IgnoreReason> {
        if event.phase != NavigationPhase::Loading {
            return Some(IgnoreReason::NotLoading);
        }
        if self.pages.is_own_page(&event.url) {
            return Some(IgnoreReason::OwnPage);
        }
        if !is_http(&event.url) {
            return Some(IgnoreReason::NotHttp);
        }
        None
    }

    async fn check(&self, url: &str, now: Instant) -> Verdict {
        // Recorded before the call so an overlapping navigation to the same URL
        // short-circuits on the cache. Two navigations that both pass
        // `should_skip` before either records can still both reach the oracle;
        // `dedupe_in_flight` closes that gap.
        self.cache.record_checked(url, now);

        if !self.config.dedupe_in_flight {
            return self.lookup(url).await;
        }

        match self.pending.join_or_start(url, || self.lookup(url)) {
            Join::Leader(verdict) => {
                let _guard = self.pending.guard(url);
                verdict.await
            }
            Join::Follower(verdict) => verdict.await,
        }
    }

    fn lookup(&self, url: &str) -> BoxFuture<'static, Verdict> {
        let oracle = self.oracle.clone();
        let stats = self.stats.clone();
        let timeout = self.config.oracle_timeout();
        let url = url.to_string();

        async move {
            stats.inc_oracle_calls();
            match tokio::time::timeout(timeout, oracle.classify(&url)).await {
                Ok(verdict) => verdict,
                Err(_) => {
                    stats.inc_oracle_failures();
                    warn!(
                        "Oracle timed out after {}ms for {}, treating as unknown",
                        timeout.as_millis(),
                        url
                    );
                    Verdict::Unknown
                }
            }
        }
        .boxed()
    }

    async fn enforce(
        &self,
        event: &NavigationEvent,
        verdict: Verdict,
        start: Instant,
    ) -> NavigationOutcome {
        match verdict {
            Verdict::Safe => {
                self.stats.inc_safe();
                self.allow(event, AllowReason::Safe, Some(verdict), start)
            }
            Verdict::Malicious => {
                self.stats.inc_hard_blocks();
                let page = self.pages.hard_block_url(&event.url);
                self.redirect(event, &page).await;
                self.log(event, DecisionAction::HardBlocked, Some(verdict), start);
                NavigationOutcome::HardBlocked
            }
            Verdict::Unknown => {
                self.stats.inc_soft_blocks();
                let page = self.pages.soft_block_url(&event.url);
                self.redirect(event, &page).await;
                self.log(event, DecisionAction::SoftBlocked, Some(verdict), start);
                NavigationOutcome::SoftBlocked
            }
        }
    }

    async fn redirect(&self, event: &NavigationEvent, page: &str) {
        if let Err(e) = self.navigator.redirect_tab(event.tab_id, page).await {
            error!("Failed to redirect tab {} to {}: {:#}", event.tab_id, page, e);
        }
    }

    fn allow(
        &self,
        event: &NavigationEvent,
        reason: AllowReason,
        verdict: Option<Verdict>,
        start: Instant,
    ) -> NavigationOutcome {
        let action = match reason {
            AllowReason::Bypassed => DecisionAction::Bypassed,
            AllowReason::Approved => DecisionAction::Approved,
            AllowReason::Cached => DecisionAction::Cached,
            AllowReason::Trusted => DecisionAction::Trusted,
            AllowReason::Safe => DecisionAction::Allowed,
        };
        self.log(event, action, verdict, start);
        NavigationOutcome::Allowed(reason)
    }

    fn log(
        &self,
        event: &NavigationEvent,
        action: DecisionAction,
        verdict: Option<Verdict>,
        start: Instant,
    ) {
        if !self.config.logging.enable {
            return;
        }
        self.logger.log(DecisionLogEntry {
            tab_id: event.tab_id,
            url: event.url.clone(),
            action,
            verdict,
            latency_ms: start.elapsed().as_millis() as u64,
        });
    }
}
