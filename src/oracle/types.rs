use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Classification result for a URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Safe,
    Malicious,
    Unknown,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Safe => write!(f, "safe"),
            Verdict::Malicious => write!(f, "malicious"),
            Verdict::Unknown => write!(f, "unknown"),
        }
    }
}

/// Why an oracle lookup did not produce a report. Never leaves the oracle client.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("oracle returned HTTP {0}")]
    Status(u16),

    #[error("malformed oracle reply: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("oracle did not answer within {0}ms")]
    Timeout(u64),
}

/// Raw reply shape: `{"response_code": 1, "positives": 0, ...}`.
#[derive(Debug, Clone, Deserialize)]
pub struct OracleReport {
    pub response_code: Option<i64>,
    pub positives: Option<i64>,
}

impl OracleReport {
    /// `response_code == 1` means an analysis exists. Anything inconclusive is Unknown, never Safe.
    pub fn verdict(&self) -> Verdict {
        if self.response_code != Some(1) {
            return Verdict::Unknown;
        }
        match self.positives {
            Some(0) => Verdict::Safe,
            Some(n) if n > 0 => Verdict::Malicious,
            _ => Verdict::Unknown,
        }
    }
}

/// External URL reputation service.
#[async_trait::async_trait]
pub trait ReputationOracle: Send + Sync {
    /// Never fails: transport, status and decode problems all map to `Verdict::Unknown`.
    async fn classify(&self, url: &str) -> Verdict;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(json: &str) -> OracleReport {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_report_mapping() {
        assert_eq!(
            report(r#"{"response_code": 1, "positives": 0}"#).verdict(),
            Verdict::Safe
        );
        assert_eq!(
            report(r#"{"response_code": 1, "positives": 3}"#).verdict(),
            Verdict::Malicious
        );
        assert_eq!(
            report(r#"{"response_code": 0, "positives": 0}"#).verdict(),
            Verdict::Unknown
        );
        assert_eq!(
            report(r#"{"response_code": 0, "positives": 7}"#).verdict(),
            Verdict::Unknown
        );
        assert_eq!(
            report(r#"{"response_code": -2, "verbose_msg": "queued"}"#).verdict(),
            Verdict::Unknown
        );
    }

    #[test]
    fn test_incomplete_report_is_unknown() {
        assert_eq!(report(r#"{"response_code": 1}"#).verdict(), Verdict::Unknown);
        assert_eq!(
            report(r#"{"response_code": 1, "positives": -1}"#).verdict(),
            Verdict::Unknown
        );
        assert_eq!(report("{}").verdict(), Verdict::Unknown);
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::Malicious.to_string(), "malicious");
        assert_eq!(
            serde_json::to_string(&Verdict::Unknown).unwrap(),
            "\"unknown\""
        );
    }
}
