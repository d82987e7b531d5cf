use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodic tick source owned by one interstitial session.
///
/// The ticking task stops as soon as the timer is cancelled or dropped.
pub struct CountdownTimer {
    ticks: mpsc::Receiver<()>,
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl CountdownTimer {
    /// First tick fires one `period` after start.
    pub fn start(period: Duration) -> Self {
        // tokio intervals reject a zero period
        let period = period.max(Duration::from_millis(1));
        let (tx, ticks) = mpsc::channel(1);
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {}
                }
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    sent = tx.send(()) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            ticks,
            cancel,
            handle,
        }
    }

    /// Next tick, or `None` once the timer has been cancelled.
    pub async fn tick(&mut self) -> Option<()> {
        self.ticks.recv().await
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
