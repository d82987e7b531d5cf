use super::hard_block::{HardBlockChoice, HardBlockPage};
use super::pages::{InterstitialPages, PageKind, UNKNOWN_STATUS};
use super::soft_block::{
    run_soft_block, Resolution, SoftAction, SoftBlockContext, SoftBlockReport, SoftBlockSession,
};
use crate::channel::{GateChannel, GateMessage};
use crate::config::Config;
use crate::host::TabNavigator;
use crate::interceptor::TabId;
use crate::stats::StatsCollector;
use anyhow::Result;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A button press on an interstitial page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UserAction {
    GoBack,
    ProceedAnyway,
    ProceedNow,
    Cancel,
}

pub enum Opened {
    HardBlock,
    SoftBlock(JoinHandle<SoftBlockReport>),
}

enum Session {
    Hard(HardBlockPage),
    Soft {
        id: u64,
        actions: mpsc::Sender<SoftAction>,
    },
}

type Sessions = Arc<Mutex<FxHashMap<TabId, Session>>>;

/// Owns the interstitial sessions, one per tab showing a block page.
#[derive(Clone)]
pub struct InterstitialController {
    pages: InterstitialPages,
    countdown_seconds: u32,
    tick_period: Duration,
    safe_default_url: String,
    stats: Arc<StatsCollector>,
    navigator: Arc<dyn TabNavigator>,
    channel: GateChannel,
    sessions: Sessions,
    next_id: Arc<AtomicU64>,
}

impl InterstitialController {
    pub fn new(
        config: &Config,
        stats: Arc<StatsCollector>,
        navigator: Arc<dyn TabNavigator>,
        channel: GateChannel,
    ) -> Self {
        Self {
            pages: InterstitialPages::new(&config.interstitial_base),
            countdown_seconds: config.countdown_seconds,
            tick_period: config.tick_period(),
            safe_default_url: config.safe_default_url.clone(),
            stats,
            navigator,
            channel,
            sessions: Arc::new(Mutex::new(FxHashMap::default())),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Called when `tab` finished loading one of our pages. Replaces any session
    /// the tab already had.
    pub fn page_loaded(&self, tab: TabId, page_url: &str) -> Option<Opened> {
        let request = self.pages.parse(page_url)?;

        match request.kind {
            PageKind::HardBlock => {
                debug!("Hard block page open in tab {} for {}", tab, request.original_url);
                self.insert(tab, Session::Hard(HardBlockPage::new(request.original_url)));
                Some(Opened::HardBlock)
            }
            PageKind::SoftBlock => {
                if request.status.as_deref() != Some(UNKNOWN_STATUS) {
                    debug!(
                        "Checking page in tab {} with status {:?}, no countdown",
                        tab, request.status
                    );
                    return None;
                }
                Some(Opened::SoftBlock(
                    self.start_soft_block(tab, request.original_url),
                ))
            }
        }
    }

    fn start_soft_block(&self, tab: TabId, original_url: String) -> JoinHandle<SoftBlockReport> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(4);
        self.insert(tab, Session::Soft { id, actions: tx });

        info!(
            "Starting {}s countdown in tab {} for {}",
            self.countdown_seconds, tab, original_url
        );
        let session = SoftBlockSession::new(original_url, self.countdown_seconds);
        let ctx = SoftBlockContext {
            tab,
            tick_period: self.tick_period,
            safe_default_url: self.safe_default_url.clone(),
            channel: self.channel.clone(),
            navigator: self.navigator.clone(),
        };
        let sessions = self.sessions.clone();
        let stats = self.stats.clone();

        tokio::spawn(async move {
            let report = run_soft_block(session, ctx, rx).await;
            match report.resolution {
                Resolution::Proceed(_) => stats.inc_proceeds(),
                Resolution::Cancel => stats.inc_cancels(),
                Resolution::Abandoned => {}
            }

            // Only clear our own entry; the tab may have opened a newer session
            let mut guard = sessions.lock().unwrap_or_else(PoisonError::into_inner);
            if matches!(guard.get(&tab), Some(Session::Soft { id: current, .. }) if *current == id)
            {
                guard.remove(&tab);
            }
            report
        })
    }

    /// Routes a button press to the tab's session. Returns whether it was accepted.
    pub async fn user_action(&self, tab: TabId, action: UserAction) -> Result<bool> {
        let page = {
            let mut guard = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
            let soft_actions = match guard.get(&tab) {
                Some(Session::Soft { actions, .. }) => Some(actions.clone()),
                Some(Session::Hard(_)) => None,
                None => {
                    debug!("No interstitial session in tab {} for {:?}", tab, action);
                    return Ok(false);
                }
            };

            match (soft_actions, action) {
                (Some(actions), UserAction::ProceedNow) => {
                    return Ok(actions.try_send(SoftAction::ProceedNow).is_ok());
                }
                (Some(actions), UserAction::Cancel) => {
                    return Ok(actions.try_send(SoftAction::Cancel).is_ok());
                }
                (None, UserAction::GoBack | UserAction::ProceedAnyway) => {
                    match guard.remove(&tab) {
                        Some(Session::Hard(page)) => page,
                        _ => return Ok(false),
                    }
                }
                _ => {
                    debug!("Action {:?} does not apply to the page in tab {}", action, tab);
                    return Ok(false);
                }
            }
        };

        let choice = if action == UserAction::ProceedAnyway {
            HardBlockChoice::ProceedAnyway
        } else {
            HardBlockChoice::GoBack
        };
        let decision = page.choose(choice, &self.safe_default_url);

        if decision.bypass {
            self.stats.inc_proceeds();
            info!("User proceeding to blocked {} in tab {}", decision.target, tab);
            self.channel.send(GateMessage::BypassOnce {
                url: decision.target.clone(),
            });
        } else {
            self.stats.inc_cancels();
        }

        self.navigator.redirect_tab(tab, &decision.target).await?;
        Ok(true)
    }

    /// Drops the tab's session; a running countdown resolves as abandoned.
    pub fn close(&self, tab: TabId) {
        let mut guard = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if guard.remove(&tab).is_some() {
            debug!("Closed interstitial session in tab {}", tab);
        }
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn insert(&self, tab: TabId, session: Session) {
        let mut guard = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        guard.insert(tab, session);
    }
}
