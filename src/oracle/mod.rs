pub mod types;
pub mod virustotal;

pub use self::types::{OracleError, OracleReport, ReputationOracle, Verdict};
pub use self::virustotal::VirusTotalOracle;

use crate::config::Config;
use crate::stats::StatsCollector;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

pub fn create_oracle(
    config: &Config,
    stats: Arc<StatsCollector>,
) -> Result<Arc<dyn ReputationOracle>> {
    if config.oracle.api_key.is_empty() {
        warn!("No oracle API key configured; lookups will likely come back unknown.");
    }
    info!("Using reputation oracle at {}", config.oracle.endpoint);
    Ok(Arc::new(VirusTotalOracle::new(&config.oracle, stats)?) as Arc<dyn ReputationOracle>)
}
