use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tokio::fs;

/// Environment variable that overrides `oracle.api_key`.
pub const API_KEY_ENV: &str = "NAV_GATEKEEPER_API_KEY";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_cooldown_seconds")]
    pub cooldown_seconds: u64,

    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,

    #[serde(default = "default_trusted_domains")]
    pub trusted_domains: Vec<String>,

    #[serde(default = "default_safe_default_url")]
    pub safe_default_url: String,

    #[serde(default = "default_interstitial_base")]
    pub interstitial_base: String,

    #[serde(default)]
    pub dedupe_in_flight: bool,

    #[serde(default)]
    pub oracle: OracleConfig,

    #[serde(default)]
    pub interstitial: InterstitialConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub stats: StatsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct OracleConfig {
    #[serde(default = "default_oracle_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_oracle_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct InterstitialConfig {
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_enable")]
    pub enable: bool,
    #[serde(default = "default_log_blocked")]
    pub log_blocked: bool,
    #[serde(default = "default_log_allowed")]
    pub log_allowed: bool,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_decision_log_sinks")]
    pub decision_log_sinks: Vec<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enable")]
    pub enable: bool,
    #[serde(default = "default_log_interval")]
    pub log_interval_seconds: u64,
}

// Defaults
fn default_cooldown_seconds() -> u64 {
    10
}
fn default_countdown_seconds() -> u32 {
    5
}
fn default_safe_default_url() -> String {
    "https://www.google.com".to_string()
}
fn default_interstitial_base() -> String {
    "chrome-extension://nav-gatekeeper/".to_string()
}
fn default_oracle_endpoint() -> String {
    "https://www.virustotal.com/vtapi/v2/url/report".to_string()
}
fn default_oracle_timeout_ms() -> u64 {
    5000
}
fn default_tick_millis() -> u64 {
    1000
}
fn default_log_enable() -> bool {
    true
}
fn default_log_blocked() -> bool {
    true
}
fn default_log_allowed() -> bool {
    true
}
fn default_log_format() -> String {
    "text".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_decision_log_sinks() -> Vec<String> {
    vec!["console".to_string()]
}
fn default_stats_enable() -> bool {
    true
}
fn default_log_interval() -> u64 {
    300
}
fn default_trusted_domains() -> Vec<String> {
    [
        "google.com",
        "www.google.com",
        "youtube.com",
        "www.youtube.com",
        "facebook.com",
        "www.facebook.com",
        "twitter.com",
        "www.twitter.com",
        "github.com",
        "www.github.com",
        "stackoverflow.com",
        "www.stackoverflow.com",
        "wikipedia.org",
        "en.wikipedia.org",
        "geeksforgeeks.org",
    ]
    .iter()
    .map(|d| d.to_string())
    .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cooldown_seconds: default_cooldown_seconds(),
            countdown_seconds: default_countdown_seconds(),
            trusted_domains: default_trusted_domains(),
            safe_default_url: default_safe_default_url(),
            interstitial_base: default_interstitial_base(),
            dedupe_in_flight: false,
            oracle: OracleConfig::default(),
            interstitial: InterstitialConfig::default(),
            logging: LoggingConfig::default(),
            stats: StatsConfig::default(),
        }
    }
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            endpoint: default_oracle_endpoint(),
            api_key: String::new(),
            timeout_ms: default_oracle_timeout_ms(),
        }
    }
}

impl Default for InterstitialConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enable: default_log_enable(),
            log_blocked: default_log_blocked(),
            log_allowed: default_log_allowed(),
            format: default_log_format(),
            level: default_log_level(),
            decision_log_sinks: default_decision_log_sinks(),
        }
    }
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enable: default_stats_enable(),
            log_interval_seconds: default_log_interval(),
        }
    }
}

impl Config {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config TOML")?;
        Ok(config)
    }

    /// Credentials may come from the environment instead of the file.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(API_KEY_ENV) {
            if !key.is_empty() {
                self.oracle.api_key = key;
            }
        }
    }

    pub fn cooldown(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cooldown_seconds)
    }

    pub fn oracle_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.oracle.timeout_ms)
    }

    /// Never zero: a zero-length tick is clamped to 1ms.
    pub fn tick_period(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.interstitial.tick_millis.max(1))
    }
}
