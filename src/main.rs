use anyhow::Result;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

use nav_gatekeeper::channel::GateChannel;
use nav_gatekeeper::config::Config;
use nav_gatekeeper::host::{run_host, NativeNavigator, TabNavigator};
use nav_gatekeeper::init::setup_logging;
use nav_gatekeeper::interceptor::Gatekeeper;
use nav_gatekeeper::interstitial::InterstitialController;
use nav_gatekeeper::logger::DecisionLogger;
use nav_gatekeeper::oracle::create_oracle;
use nav_gatekeeper::stats::StatsCollector;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Load Config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());
    let config_exists = std::path::Path::new(&config_path).exists();
    let mut config = if config_exists {
        Config::load(&config_path).await?
    } else {
        Config::default()
    };
    config.apply_env_overrides();

    // 2. Setup Logging
    setup_logging(&config);
    info!("Starting nav-gatekeeper...");
    if !config_exists {
        info!("Config file {} not found, using defaults.", config_path);
    }

    // 3. Stats & decision log
    let stats = StatsCollector::new();
    if config.stats.enable {
        stats.start_reporter(config.stats.log_interval_seconds);
    }
    let logger = DecisionLogger::new(config.logging.clone(), vec![]);

    // 4. Oracle & browser binding
    let oracle = create_oracle(&config, stats.clone())?;
    let (navigator, outbound_rx) = NativeNavigator::channel(256);
    let navigator: Arc<dyn TabNavigator> = Arc::new(navigator);

    // 5. Interceptor, fed by interstitial messages
    let gatekeeper = Gatekeeper::new(
        config.clone(),
        stats.clone(),
        logger,
        oracle,
        navigator.clone(),
    );
    let (channel, gate_rx) = GateChannel::new(64);
    let listener = gatekeeper.clone();
    tokio::spawn(async move {
        listener.listen(gate_rx).await;
    });

    // 6. Interstitial sessions
    let controller = InterstitialController::new(&config, stats, navigator, channel);

    // 7. Serve until the browser disconnects
    tokio::select! {
        res = run_host(tokio::io::stdin(), tokio::io::stdout(), gatekeeper, controller, outbound_rx) => res?,
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received.");
        }
    }

    Ok(())
}
