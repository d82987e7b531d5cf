use nav_gatekeeper::config::LoggingConfig;
use nav_gatekeeper::interceptor::TabId;
use nav_gatekeeper::logger::{
    DecisionAction, DecisionLogEntry, DecisionLogSink, DecisionLogger, MemoryLogSink,
};
use nav_gatekeeper::oracle::Verdict;

fn entry(tab: i64, url: &str, action: DecisionAction, verdict: Option<Verdict>) -> DecisionLogEntry {
    DecisionLogEntry {
        tab_id: TabId(tab),
        url: url.to_string(),
        action,
        verdict,
        latency_ms: 3,
    }
}

#[tokio::test]
async fn test_logging_config_instantiation() {
    let config = LoggingConfig {
        enable: true,
        log_blocked: true,
        log_allowed: false,
        format: "json".to_string(),
        level: "info".to_string(),
        decision_log_sinks: vec!["console".to_string()],
    };

    let memory = MemoryLogSink::new(2);
    let buffer = memory.clone_buffer();
    let sinks: Vec<Box<dyn DecisionLogSink>> = vec![Box::new(memory)];
    let logger = DecisionLogger::new(config, sinks);

    logger.log(entry(1, "http://a.test/", DecisionAction::Trusted, None));
    logger.log(entry(
        2,
        "http://b.test/",
        DecisionAction::HardBlocked,
        Some(Verdict::Malicious),
    ));
    logger.log(entry(
        3,
        "http://c.test/",
        DecisionAction::SoftBlocked,
        Some(Verdict::Unknown),
    ));

    // Allow time for async task to process
    tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

    // Memory sink keeps everything it is given, bounded by capacity
    let recent: Vec<_> = buffer.read().unwrap().iter().cloned().collect();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].url, "http://b.test/");
    assert_eq!(recent[1].action, DecisionAction::SoftBlocked);
    assert!(recent.iter().all(|e| e.action.is_block()));
}

#[tokio::test]
async fn test_logger_without_sinks_is_a_no_op() {
    let config = LoggingConfig {
        decision_log_sinks: vec![],
        ..LoggingConfig::default()
    };
    let logger = DecisionLogger::new(config, vec![]);
    logger.log(entry(1, "http://a.test/", DecisionAction::Allowed, Some(Verdict::Safe)));
}
