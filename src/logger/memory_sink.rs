use super::{DecisionLogEntry, DecisionLogSink};
use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

pub struct MemoryLogSink {
    buffer: Arc<RwLock<VecDeque<DecisionLogEntry>>>,
    capacity: usize,
}

impl MemoryLogSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: Arc::new(RwLock::new(VecDeque::with_capacity(capacity))),
            capacity,
        }
    }

    pub fn get_recent(&self) -> Vec<DecisionLogEntry> {
        let buffer = self.buffer.read().unwrap_or_else(PoisonError::into_inner);
        buffer.iter().cloned().collect()
    }

    // Lets callers keep reading after the sink is handed to the logger
    pub fn clone_buffer(&self) -> Arc<RwLock<VecDeque<DecisionLogEntry>>> {
        self.buffer.clone()
    }
}

impl DecisionLogSink for MemoryLogSink {
    fn log(&self, entry: &DecisionLogEntry) {
        let mut buffer = self.buffer.write().unwrap_or_else(PoisonError::into_inner);
        if buffer.len() >= self.capacity {
            buffer.pop_front();
        }
        buffer.push_back(entry.clone());
    }
}
