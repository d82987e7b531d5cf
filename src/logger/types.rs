use crate::interceptor::TabId;
use crate::oracle::Verdict;

#[derive(Debug, Clone)]
pub struct DecisionLogEntry {
    pub tab_id: TabId,
    pub url: String,
    pub action: DecisionAction,
    pub verdict: Option<Verdict>, // Only when the oracle was consulted
    pub latency_ms: u64,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DecisionAction {
    Trusted,
    Cached,
    Approved,
    Bypassed,
    Allowed,
    HardBlocked,
    SoftBlocked,
}

impl DecisionAction {
    pub fn is_block(&self) -> bool {
        matches!(self, DecisionAction::HardBlocked | DecisionAction::SoftBlocked)
    }
}

pub trait DecisionLogSink: Send + Sync {
    fn log(&self, entry: &DecisionLogEntry);
}
