//! Interstitial -> interceptor message channel.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum GateMessage {
    /// User approved `url` from the soft-block page for the rest of the session.
    AllowUrl { url: String },
    /// User chose "proceed anyway" on the hard-block page; skip checks for the next navigation only.
    BypassOnce { url: String },
}

impl GateMessage {
    pub fn url(&self) -> &str {
        match self {
            GateMessage::AllowUrl { url } | GateMessage::BypassOnce { url } => url,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    NotDelivered,
}

/// Sending half held by interstitial sessions.
#[derive(Debug, Clone)]
pub struct GateChannel {
    tx: mpsc::Sender<GateMessage>,
}

impl GateChannel {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<GateMessage>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    /// Best-effort: a closed or full channel reports `NotDelivered` instead of failing.
    pub fn send(&self, message: GateMessage) -> Delivery {
        match self.tx.try_send(message) {
            Ok(()) => Delivery::Delivered,
            Err(e) => {
                tracing::warn!("Gate message not delivered: {}", e);
                Delivery::NotDelivered
            }
        }
    }
}
