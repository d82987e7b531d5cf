pub mod console_sink;
pub mod memory_sink;
pub mod types;

pub use self::console_sink::ConsoleLogSink;
pub use self::memory_sink::MemoryLogSink;
pub use self::types::{DecisionAction, DecisionLogEntry, DecisionLogSink};

use crate::config::LoggingConfig;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

pub struct DecisionLogger {
    sinks: Vec<mpsc::Sender<DecisionLogEntry>>,
}

impl DecisionLogger {
    pub fn new(config: LoggingConfig, extra_sinks: Vec<Box<dyn DecisionLogSink>>) -> Arc<Self> {
        let mut sinks = Vec::new();

        for sink_type in &config.decision_log_sinks {
            if sink_type == "console" {
                sinks.push(Self::spawn_sink(Box::new(ConsoleLogSink::new(config.clone()))));
            } else {
                warn!("Unknown decision log sink type: {}", sink_type);
            }
        }

        for sink in extra_sinks {
            sinks.push(Self::spawn_sink(sink));
        }

        Arc::new(Self { sinks })
    }

    fn spawn_sink(sink: Box<dyn DecisionLogSink>) -> mpsc::Sender<DecisionLogEntry> {
        let (tx, mut rx) = mpsc::channel::<DecisionLogEntry>(1000);
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                sink.log(&entry);
            }
        });
        tx
    }

    pub fn log(&self, entry: DecisionLogEntry) {
        let Some((last, rest)) = self.sinks.split_last() else {
            return;
        };
        // Fire and forget, don't stall navigation if a buffer is full
        for sink in rest {
            let _ = sink.try_send(entry.clone());
        }
        let _ = last.try_send(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::TabId;
    use std::time::Duration;

    struct TestLogSink {
        logs: Arc<std::sync::Mutex<Vec<DecisionLogEntry>>>,
    }

    impl DecisionLogSink for TestLogSink {
        fn log(&self, entry: &DecisionLogEntry) {
            self.logs.lock().unwrap().push(entry.clone());
        }
    }

    #[tokio::test]
    async fn test_fans_out_to_extra_sinks() {
        let logs = Arc::new(std::sync::Mutex::new(Vec::new()));
        let config = LoggingConfig {
            decision_log_sinks: vec!["console".to_string(), "bogus".to_string()],
            ..LoggingConfig::default()
        };
        let logger = DecisionLogger::new(
            config,
            vec![Box::new(TestLogSink { logs: logs.clone() })],
        );

        logger.log(DecisionLogEntry {
            tab_id: TabId(7),
            url: "http://example.test/".to_string(),
            action: DecisionAction::HardBlocked,
            verdict: Some(crate::oracle::Verdict::Malicious),
            latency_ms: 12,
        });

        // Allow time for async task to process
        tokio::time::sleep(Duration::from_millis(50)).await;

        let logs = logs.lock().unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].action, DecisionAction::HardBlocked);
        assert_eq!(logs[0].tab_id, TabId(7));
    }
}
