mod common;

use common::{test_config, MockOracle};
use nav_gatekeeper::channel::GateChannel;
use nav_gatekeeper::config::Config;
use nav_gatekeeper::host::native::{read_frame, write_frame};
use nav_gatekeeper::host::{run_host, Inbound, NativeNavigator, Outbound};
use nav_gatekeeper::interceptor::{Gatekeeper, TabId};
use nav_gatekeeper::interstitial::{InterstitialController, InterstitialPages, UserAction};
use nav_gatekeeper::logger::DecisionLogger;
use nav_gatekeeper::oracle::Verdict;
use nav_gatekeeper::stats::StatsCollector;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::DuplexStream;
use tokio::task::JoinHandle;

const BANK: &str = "http://example-bank-login.test/signin?next=%2Faccount";
const FRESH: &str = "https://fresh-site.test/";

struct Browser {
    stream: DuplexStream,
    host: JoinHandle<anyhow::Result<()>>,
    oracle: Arc<MockOracle>,
    pages: InterstitialPages,
}

impl Browser {
    async fn send(&mut self, message: Inbound) {
        let payload = serde_json::to_vec(&message).unwrap();
        write_frame(&mut self.stream, &payload).await.unwrap();
    }

    async fn recv(&mut self) -> Outbound {
        let frame = tokio::time::timeout(Duration::from_secs(5), read_frame(&mut self.stream))
            .await
            .expect("host did not answer")
            .unwrap()
            .expect("host closed the channel");
        serde_json::from_slice(&frame).unwrap()
    }
}

fn start_host(config: Config, oracle: MockOracle) -> Browser {
    let stats = StatsCollector::new();
    let logger = DecisionLogger::new(config.logging.clone(), vec![]);
    let oracle = Arc::new(oracle);
    let (navigator, outbound) = NativeNavigator::channel(64);
    let (channel, gate_rx) = GateChannel::new(64);

    let gatekeeper = Gatekeeper::new(
        config.clone(),
        stats.clone(),
        logger,
        oracle.clone(),
        Arc::new(navigator.clone()),
    );
    let controller = InterstitialController::new(&config, stats, Arc::new(navigator), channel);

    let listener = gatekeeper.clone();
    tokio::spawn(async move { listener.listen(gate_rx).await });

    let (browser, host_side) = tokio::io::duplex(64 * 1024);
    let (reader, writer) = tokio::io::split(host_side);
    let host = tokio::spawn(run_host(reader, writer, gatekeeper, controller, outbound));

    Browser {
        stream: browser,
        host,
        oracle,
        pages: InterstitialPages::new(&config.interstitial_base),
    }
}

fn navigation(tab: i64, url: &str) -> Inbound {
    Inbound::Navigation {
        tab_id: TabId(tab),
        url: url.to_string(),
        status: "loading".to_string(),
    }
}

#[tokio::test]
async fn test_hard_block_round_trip() {
    let mut browser = start_host(test_config(), MockOracle::new(Verdict::Malicious));

    browser.send(navigation(1, BANK)).await;
    let warning = browser.pages.hard_block_url(BANK);
    assert_eq!(
        browser.recv().await,
        Outbound::Redirect {
            tab_id: TabId(1),
            url: warning.clone(),
        }
    );

    browser
        .send(Inbound::PageLoaded {
            tab_id: TabId(1),
            url: warning,
        })
        .await;
    browser
        .send(Inbound::UserAction {
            tab_id: TabId(1),
            action: UserAction::ProceedAnyway,
        })
        .await;
    assert_eq!(
        browser.recv().await,
        Outbound::Redirect {
            tab_id: TabId(1),
            url: BANK.to_string(),
        }
    );
    assert_eq!(browser.oracle.call_count(), 1);

    let Browser { stream, host, .. } = browser;
    drop(stream);
    host.await.unwrap().unwrap();
}

#[tokio::test]
async fn test_soft_block_countdown_round_trip() {
    let mut config = test_config();
    config.countdown_seconds = 2;
    config.interstitial.tick_millis = 20;
    let mut browser = start_host(config, MockOracle::new(Verdict::Unknown));

    browser.send(navigation(4, FRESH)).await;
    let checking = browser.pages.soft_block_url(FRESH);
    assert_eq!(
        browser.recv().await,
        Outbound::Redirect {
            tab_id: TabId(4),
            url: checking.clone(),
        }
    );

    browser
        .send(Inbound::PageLoaded {
            tab_id: TabId(4),
            url: checking,
        })
        .await;

    for remaining in [2, 1, 0] {
        assert_eq!(
            browser.recv().await,
            Outbound::Countdown {
                tab_id: TabId(4),
                remaining,
                message: format!("Redirecting in {} seconds...", remaining),
            }
        );
    }
    assert_eq!(
        browser.recv().await,
        Outbound::Redirect {
            tab_id: TabId(4),
            url: FRESH.to_string(),
        }
    );
}

#[tokio::test]
async fn test_host_survives_malformed_and_ignored_messages() {
    let mut browser = start_host(test_config(), MockOracle::new(Verdict::Malicious));

    write_frame(&mut browser.stream, b"{not json").await.unwrap();
    write_frame(&mut browser.stream, br#"{"kind":"teleport","tabId":1}"#)
        .await
        .unwrap();
    browser
        .send(Inbound::Navigation {
            tab_id: TabId(2),
            url: BANK.to_string(),
            status: "complete".to_string(),
        })
        .await;
    browser.send(navigation(2, "chrome://settings")).await;
    browser.send(Inbound::TabClosed { tab_id: TabId(2) }).await;

    // Still serving: a real navigation is blocked
    browser.send(navigation(3, BANK)).await;
    assert!(matches!(
        browser.recv().await,
        Outbound::Redirect { tab_id: TabId(3), .. }
    ));
    assert_eq!(browser.oracle.call_count(), 1);
}

#[tokio::test]
async fn test_host_survives_oversized_navigation() {
    let mut browser = start_host(test_config(), MockOracle::new(Verdict::Malicious));

    let huge = format!("http://evil.test/?q={}", "a".repeat(1_200_000));
    browser.send(navigation(5, &huge)).await;
    browser.send(navigation(6, BANK)).await;

    // The oversized frame is dropped and the next one is served
    let warning = browser.pages.hard_block_url(BANK);
    assert_eq!(
        browser.recv().await,
        Outbound::Redirect {
            tab_id: TabId(6),
            url: warning,
        }
    );
    assert_eq!(browser.oracle.call_count(), 1);
    assert!(!browser.host.is_finished());
}
