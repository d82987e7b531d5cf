use super::countdown::CountdownTimer;
use crate::channel::{Delivery, GateChannel, GateMessage};
use crate::host::TabNavigator;
use crate::interceptor::TabId;
use crate::oracle::Verdict;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProceedTrigger {
    CountdownElapsed,
    UserProceed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Proceed(ProceedTrigger),
    Cancel,
    /// The page went away before the user or the timer decided.
    Abandoned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoftBlockState {
    CountingDown { remaining: u32 },
    Resolved(Resolution),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SoftAction {
    ProceedNow,
    Cancel,
}

/// Countdown shown for a URL the oracle could not vouch for.
///
/// Every transition out of `CountingDown` is terminal; later events are no-ops.
#[derive(Debug, Clone)]
pub struct SoftBlockSession {
    original_url: String,
    verdict: Verdict,
    state: SoftBlockState,
}

impl SoftBlockSession {
    pub fn new(original_url: impl Into<String>, countdown_seconds: u32) -> Self {
        let state = if countdown_seconds == 0 {
            SoftBlockState::Resolved(Resolution::Proceed(ProceedTrigger::CountdownElapsed))
        } else {
            SoftBlockState::CountingDown {
                remaining: countdown_seconds,
            }
        };

        Self {
            original_url: original_url.into(),
            verdict: Verdict::Unknown,
            state,
        }
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn verdict(&self) -> Verdict {
        self.verdict
    }

    pub fn state(&self) -> SoftBlockState {
        self.state
    }

    pub fn remaining(&self) -> u32 {
        match self.state {
            SoftBlockState::CountingDown { remaining } => remaining,
            SoftBlockState::Resolved(_) => 0,
        }
    }

    pub fn resolution(&self) -> Option<Resolution> {
        match self.state {
            SoftBlockState::Resolved(r) => Some(r),
            SoftBlockState::CountingDown { .. } => None,
        }
    }

    pub fn message(&self) -> String {
        format!("Redirecting in {} seconds...", self.remaining())
    }

    /// One second elapsed. Returns the resolution if this tick ended the countdown.
    pub fn tick(&mut self) -> Option<Resolution> {
        match self.state {
            SoftBlockState::CountingDown { remaining } if remaining <= 1 => {
                self.resolve(Resolution::Proceed(ProceedTrigger::CountdownElapsed))
            }
            SoftBlockState::CountingDown { remaining } => {
                self.state = SoftBlockState::CountingDown {
                    remaining: remaining - 1,
                };
                None
            }
            SoftBlockState::Resolved(_) => None,
        }
    }

    pub fn apply(&mut self, action: SoftAction) -> Option<Resolution> {
        match action {
            SoftAction::ProceedNow => {
                self.resolve(Resolution::Proceed(ProceedTrigger::UserProceed))
            }
            SoftAction::Cancel => self.resolve(Resolution::Cancel),
        }
    }

    pub fn abandon(&mut self) -> Option<Resolution> {
        self.resolve(Resolution::Abandoned)
    }

    fn resolve(&mut self, resolution: Resolution) -> Option<Resolution> {
        match self.state {
            SoftBlockState::CountingDown { .. } => {
                self.state = SoftBlockState::Resolved(resolution);
                Some(resolution)
            }
            SoftBlockState::Resolved(_) => None,
        }
    }
}

/// Everything a running soft-block session talks to.
#[derive(Clone)]
pub struct SoftBlockContext {
    pub tab: TabId,
    pub tick_period: Duration,
    pub safe_default_url: String,
    pub channel: GateChannel,
    pub navigator: Arc<dyn TabNavigator>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoftBlockReport {
    pub resolution: Resolution,
    /// Outcome of the `allowUrl` notification; only sent on proceed.
    pub delivery: Option<Delivery>,
    pub navigated_to: Option<String>,
}

/// Runs the countdown until the timer expires or the user acts, then carries out the outcome.
pub async fn run_soft_block(
    mut session: SoftBlockSession,
    ctx: SoftBlockContext,
    mut actions: mpsc::Receiver<SoftAction>,
) -> SoftBlockReport {
    let resolution = match session.resolution() {
        Some(resolution) => resolution,
        None => {
            show_countdown(&ctx, &session).await;
            let mut timer = CountdownTimer::start(ctx.tick_period);

            let resolution = loop {
                tokio::select! {
                    biased;
                    action = actions.recv() => {
                        let resolved = match action {
                            Some(action) => session.apply(action),
                            None => session.abandon(),
                        };
                        if let Some(resolution) = resolved {
                            break resolution;
                        }
                    }
                    tick = timer.tick() => {
                        let resolved = match tick {
                            Some(()) => session.tick(),
                            None => session.abandon(),
                        };
                        show_countdown(&ctx, &session).await;
                        if let Some(resolution) = resolved {
                            break resolution;
                        }
                    }
                }
            };

            // Release the timer before acting on the outcome
            timer.cancel();
            resolution
        }
    };

    // Late button presses are refused at the sender from here on
    actions.close();

    debug!(
        "Soft block for {} in tab {} resolved: {:?}",
        session.original_url(),
        ctx.tab,
        resolution
    );
    carry_out(&session, resolution, &ctx).await
}

async fn carry_out(
    session: &SoftBlockSession,
    resolution: Resolution,
    ctx: &SoftBlockContext,
) -> SoftBlockReport {
    match resolution {
        Resolution::Proceed(_) => {
            let delivery = ctx.channel.send(GateMessage::AllowUrl {
                url: session.original_url().to_string(),
            });
            // Navigation proceeds even if the approval was lost
            info!(
                "Proceeding to {} in tab {} (approval {:?})",
                session.original_url(),
                ctx.tab,
                delivery
            );
            navigate(ctx, session.original_url()).await;
            SoftBlockReport {
                resolution,
                delivery: Some(delivery),
                navigated_to: Some(session.original_url().to_string()),
            }
        }
        Resolution::Cancel => {
            info!(
                "User cancelled navigation to {} in tab {}",
                session.original_url(),
                ctx.tab
            );
            navigate(ctx, &ctx.safe_default_url).await;
            SoftBlockReport {
                resolution,
                delivery: None,
                navigated_to: Some(ctx.safe_default_url.clone()),
            }
        }
        Resolution::Abandoned => SoftBlockReport {
            resolution,
            delivery: None,
            navigated_to: None,
        },
    }
}

async fn show_countdown(ctx: &SoftBlockContext, session: &SoftBlockSession) {
    if let Err(e) = ctx
        .navigator
        .show_countdown(ctx.tab, session.remaining(), &session.message())
        .await
    {
        debug!("Countdown update for tab {} not shown: {:#}", ctx.tab, e);
    }
}

async fn navigate(ctx: &SoftBlockContext, url: &str) {
    if let Err(e) = ctx.navigator.redirect_tab(ctx.tab, url).await {
        error!("Failed to navigate tab {} to {}: {:#}", ctx.tab, url, e);
    }
}
