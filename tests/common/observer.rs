use std::sync::Mutex;

use run_history_backend::history::source::SourceError;
use run_history_backend::history::HistoryObserver;

/// Remembers which partitions were skipped, in arrival order.
#[derive(Debug, Default)]
pub struct FailureRecorder {
    failures: Mutex<Vec<Option<String>>>,
}

impl FailureRecorder {
    pub fn failures(&self) -> Vec<Option<String>> {
        self.failures.lock().unwrap().clone()
    }
}

impl HistoryObserver for FailureRecorder {
    fn partition_failed(&self, month: Option<&str>, _error: &SourceError) {
        self.failures.lock().unwrap().push(month.map(str::to_string));
    }
}
