//! Browser native-messaging transport.
//!
//! Each frame is a 32-bit length in native byte order followed by that many
//! bytes of UTF-8 JSON.

use super::TabNavigator;
use crate::channel::GateMessage;
use crate::interceptor::{Gatekeeper, NavigationEvent, NavigationPhase, TabId};
use crate::interstitial::{InterstitialController, UserAction};
use anyhow::{anyhow, bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Largest frame accepted from the browser.
pub const MAX_INBOUND_FRAME: usize = 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Inbound {
    Navigation {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        url: String,
        status: String,
    },
    Message {
        message: GateMessage,
    },
    PageLoaded {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        url: String,
    },
    UserAction {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        action: UserAction,
    },
    TabClosed {
        #[serde(rename = "tabId")]
        tab_id: TabId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Outbound {
    Redirect {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        url: String,
    },
    Countdown {
        #[serde(rename = "tabId")]
        tab_id: TabId,
        remaining: u32,
        message: String,
    },
}

/// Reads one frame. `Ok(None)` on clean end of input.
///
/// Frames over `MAX_INBOUND_FRAME` are drained and skipped; only I/O errors
/// and truncated frames fail.
pub async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Option<Vec<u8>>> {
    loop {
        let mut len_buf = [0u8; 4];
        match reader.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(e).context("Failed to read frame length"),
        }

        let len = u32::from_ne_bytes(len_buf) as usize;
        if len > MAX_INBOUND_FRAME {
            let mut rest = (&mut *reader).take(len as u64);
            let skipped = tokio::io::copy(&mut rest, &mut tokio::io::sink())
                .await
                .context("Failed to skip oversized frame")?;
            if skipped < len as u64 {
                bail!("Truncated oversized frame: {} of {} bytes", skipped, len);
            }
            warn!(
                "Skipped inbound frame of {} bytes (limit {})",
                len, MAX_INBOUND_FRAME
            );
            continue;
        }

        let mut payload = vec![0u8; len];
        reader
            .read_exact(&mut payload)
            .await
            .context("Truncated frame payload")?;
        return Ok(Some(payload));
    }
}

pub async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, payload: &[u8]) -> Result<()> {
    let len = u32::try_from(payload.len()).context("Outbound frame too large")?;
    writer.write_all(&len.to_ne_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await?;
    Ok(())
}

/// `TabNavigator` that queues commands for the host writer.
#[derive(Debug, Clone)]
pub struct NativeNavigator {
    tx: mpsc::Sender<Outbound>,
}

impl NativeNavigator {
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }

    async fn push(&self, message: Outbound) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| anyhow!("host output closed"))
    }
}

#[async_trait::async_trait]
impl TabNavigator for NativeNavigator {
    async fn redirect_tab(&self, tab: TabId, url: &str) -> Result<()> {
        self.push(Outbound::Redirect {
            tab_id: tab,
            url: url.to_string(),
        })
        .await
    }

    async fn show_countdown(&self, tab: TabId, remaining: u32, message: &str) -> Result<()> {
        self.push(Outbound::Countdown {
            tab_id: tab,
            remaining,
            message: message.to_string(),
        })
        .await
    }
}

/// Serves the browser until its input closes.
pub async fn run_host<R, W>(
    mut reader: R,
    writer: W,
    gatekeeper: Gatekeeper,
    controller: InterstitialController,
    outbound: mpsc::Receiver<Outbound>,
) -> Result<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(write_loop(writer, outbound));

    while let Some(frame) = read_frame(&mut reader).await? {
        match serde_json::from_slice::<Inbound>(&frame) {
            Ok(message) => dispatch(message, &gatekeeper, &controller),
            Err(e) => warn!("Ignoring malformed host message: {}", e),
        }
    }

    info!("Browser closed the native messaging channel");
    Ok(())
}

fn dispatch(message: Inbound, gatekeeper: &Gatekeeper, controller: &InterstitialController) {
    match message {
        Inbound::Navigation {
            tab_id,
            url,
            status,
        } => {
            let event = NavigationEvent {
                tab_id,
                url,
                phase: NavigationPhase::from_status(&status),
            };
            // The reader must not wait on the oracle
            let gatekeeper = gatekeeper.clone();
            tokio::spawn(async move {
                let outcome = gatekeeper.on_navigation(event).await;
                debug!("Navigation in tab {} -> {:?}", tab_id, outcome);
            });
        }
        Inbound::Message { message } => gatekeeper.handle_message(message),
        Inbound::PageLoaded { tab_id, url } => {
            // Soft-block sessions run detached; their handle is not needed here
            let _ = controller.page_loaded(tab_id, &url);
        }
        Inbound::UserAction { tab_id, action } => {
            let controller = controller.clone();
            tokio::spawn(async move {
                if let Err(e) = controller.user_action(tab_id, action).await {
                    error!("Failed to apply {:?} in tab {}: {:#}", action, tab_id, e);
                }
            });
        }
        Inbound::TabClosed { tab_id } => controller.close(tab_id),
    }
}

async fn write_loop<W: AsyncWrite + Unpin>(mut writer: W, mut outbound: mpsc::Receiver<Outbound>) {
    while let Some(message) = outbound.recv().await {
        let payload = match serde_json::to_vec(&message) {
            Ok(payload) => payload,
            Err(e) => {
                error!("Failed to encode host message: {}", e);
                continue;
            }
        };
        if let Err(e) = write_frame(&mut writer, &payload).await {
            error!("Failed to write to browser: {:#}", e);
            break;
        }
    }
}
