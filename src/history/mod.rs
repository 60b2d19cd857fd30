//! Run history aggregation.
//!
//! Sweeps the upstream's term → month → page hierarchy, resolves record
//! identity and dates, and folds everything into a deduplicated, range-filtered
//! result.

pub mod aggregate;
pub mod observer;
pub mod pager;
pub mod partition;
pub mod record;
pub mod source;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{aggregate, AggregationResult, Aggregator, DateRange};
pub use observer::{HistoryObserver, TracingObserver};
pub use record::RawRecord;
pub use source::{Credentials, RunSource, SourceError};

/// Fetches every reachable record for `credentials` and aggregates those inside `range`.
pub async fn collect_history<S>(
    source: &S,
    credentials: &Credentials,
    range: DateRange,
    observer: &dyn HistoryObserver,
) -> Result<AggregationResult, SourceError>
where
    S: RunSource + ?Sized,
{
    let records = partition::enumerate_and_fetch(source, credentials, observer).await?;
    let fetched = records.len();
    let result = aggregate(records, range);
    tracing::info!(
        fetched,
        kept = result.records.len(),
        days = result.distinct_days.len(),
        "Run history aggregated"
    );
    Ok(result)
}
