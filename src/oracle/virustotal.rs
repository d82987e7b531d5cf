use super::types::{OracleError, OracleReport, ReputationOracle, Verdict};
use crate::config::OracleConfig;
use crate::stats::StatsCollector;
use anyhow::{Context, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// `GET <endpoint>?apikey=<key>&resource=<url>` reputation lookup.
pub struct VirusTotalOracle {
    client: Client,
    endpoint: String,
    api_key: String,
    timeout_ms: u64,
    stats: Arc<StatsCollector>,
}

impl VirusTotalOracle {
    pub fn new(config: &OracleConfig, stats: Arc<StatsCollector>) -> Result<Self> {
        let client = Client::builder()
            .user_agent("NavGatekeeper/0.1")
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .context("Failed to build oracle HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            timeout_ms: config.timeout_ms,
            stats,
        })
    }

    async fn fetch_report(&self, url: &str) -> Result<OracleReport, OracleError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("apikey", self.api_key.as_str()), ("resource", url)])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(OracleError::Status(status.as_u16()));
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        Ok(serde_json::from_slice(&body)?)
    }

    fn transport_error(&self, e: reqwest::Error) -> OracleError {
        if e.is_timeout() {
            OracleError::Timeout(self.timeout_ms)
        } else {
            OracleError::Transport(e)
        }
    }
}

#[async_trait::async_trait]
impl ReputationOracle for VirusTotalOracle {
    async fn classify(&self, url: &str) -> Verdict {
        let start = Instant::now();

        match self.fetch_report(url).await {
            Ok(report) => {
                let verdict = report.verdict();
                debug!(
                    "Oracle report for {}: response_code={:?} positives={:?} -> {} [{}ms]",
                    url,
                    report.response_code,
                    report.positives,
                    verdict,
                    start.elapsed().as_millis()
                );
                verdict
            }
            Err(e) => {
                self.stats.inc_oracle_failures();
                warn!("Oracle lookup failed for {}: {}", url, e);
                Verdict::Unknown
            }
        }
    }
}
