use std::sync::{Arc, Mutex, PoisonError};

use super::types::TaskResult;

/// Shared, append-only result collection written by execution threads.
#[derive(Debug, Default)]
pub struct ResultCollector {
    results: Mutex<Vec<TaskResult>>,
}

/// Thread-safe handle to a result collector.
pub type SharedResultCollector = Arc<ResultCollector>;

impl ResultCollector {
    pub fn with_capacity(capacity: usize) -> SharedResultCollector {
        Arc::new(Self {
            results: Mutex::new(Vec::with_capacity(capacity)),
        })
    }

    /// Append one finished result. The lock is held only for the push.
    pub fn push(&self, result: TaskResult) {
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    pub fn len(&self) -> usize {
        self.results.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every collected result, leaving the collector empty.
    pub fn drain(&self) -> Vec<TaskResult> {
        std::mem::take(&mut *self.results.lock().unwrap_or_else(PoisonError::into_inner))
    }
}
