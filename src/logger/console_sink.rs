use crate::config::LoggingConfig;
use crate::logger::types::{DecisionAction, DecisionLogEntry, DecisionLogSink};
use tracing::info;

pub struct ConsoleLogSink {
    config: LoggingConfig,
}

impl ConsoleLogSink {
    pub fn new(config: LoggingConfig) -> Self {
        Self { config }
    }
}

impl DecisionLogSink for ConsoleLogSink {
    fn log(&self, entry: &DecisionLogEntry) {
        if !self.config.enable {
            return;
        }

        let should_log = if entry.action.is_block() {
            self.config.log_blocked
        } else {
            self.config.log_allowed
        };

        if should_log {
            if self.config.format == "json" {
                // Structured logging via tracing fields
                info!(
                    target: "navigation",
                    tab = %entry.tab_id,
                    url = %entry.url,
                    action = ?entry.action,
                    verdict = ?entry.verdict,
                    lat = %entry.latency_ms
                );
            } else {
                let action_str = match entry.action {
                    DecisionAction::Trusted => "allowed (trusted domain)".to_string(),
                    DecisionAction::Cached => "allowed (checked recently)".to_string(),
                    DecisionAction::Approved => "allowed (approved this session)".to_string(),
                    DecisionAction::Bypassed => "allowed (user proceeded past block)".to_string(),
                    DecisionAction::Allowed => "allowed (oracle says safe)".to_string(),
                    DecisionAction::HardBlocked => "BLOCKED, redirected to warning page".to_string(),
                    DecisionAction::SoftBlocked => match entry.verdict {
                        Some(v) => format!("held for countdown (verdict {})", v),
                        None => "held for countdown".to_string(),
                    },
                };

                info!(
                    "[tab {}] {} -> {} [{}ms]",
                    entry.tab_id, entry.url, action_str, entry.latency_ms
                );
            }
        }
    }
}
