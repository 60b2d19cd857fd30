use super::pager::PageState;
use super::source::SourceError;

/// Receives partition-level events from the enumerator.
pub trait HistoryObserver: Send + Sync {
    /// A partition sweep failed and was skipped. `month` is `None` for a term-wide sweep.
    fn partition_failed(&self, month: Option<&str>, error: &SourceError);

    fn partition_fetched(&self, _month: Option<&str>, _records: usize, _outcome: PageState) {}
}

/// Default observer: routes events into `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl HistoryObserver for TracingObserver {
    fn partition_failed(&self, month: Option<&str>, error: &SourceError) {
        tracing::warn!(month = month.unwrap_or(""), error = %error, "Run record fetch failed, skipping partition");
    }

    fn partition_fetched(&self, month: Option<&str>, records: usize, outcome: PageState) {
        tracing::debug!(
            month = month.unwrap_or(""),
            records,
            outcome = outcome.as_str(),
            "Run record partition fetched"
        );
    }
}
