use std::borrow::Cow;

use super::observer::HistoryObserver;
use super::pager::fetch_partition_records;
use super::record::RawRecord;
use super::source::{Credentials, Month, RunSource, SourceError, Term};

/// The single term flagged current, or every term when that is ambiguous.
pub fn select_target_terms(terms: &[Term]) -> Vec<&Term> {
    let mut current = terms.iter().filter(|t| t.is_current());
    match (current.next(), current.next()) {
        (Some(only), None) => vec![only],
        _ => terms.iter().collect(),
    }
}

/// Month tokens in source order; entries without any usable field are dropped.
pub fn month_tokens(months: &[Month]) -> Vec<String> {
    months
        .iter()
        .filter_map(|m| m.token().map(Cow::into_owned))
        .collect()
}

/// Sweeps every partition reachable from the caller's terms and concatenates
/// their records in enumeration order.
///
/// Term and month listing failures abort the sweep. A failed month sweep is
/// reported to `observer` and skipped.
pub async fn enumerate_and_fetch<S>(
    source: &S,
    credentials: &Credentials,
    observer: &dyn HistoryObserver,
) -> Result<Vec<RawRecord>, SourceError>
where
    S: RunSource + ?Sized,
{
    let terms = source.list_terms(credentials).await?;
    let targets = select_target_terms(&terms);

    if targets.is_empty() {
        let fetch = fetch_partition_records(source, credentials, None).await?;
        observer.partition_fetched(None, fetch.records.len(), fetch.outcome);
        return Ok(fetch.records);
    }

    let mut records = Vec::new();
    for term in targets {
        let Some(term_id) = term.identifier() else {
            tracing::debug!("Skipping term without identifier");
            continue;
        };

        let months = source.list_months(&term_id, credentials).await?;
        let tokens = month_tokens(&months);
        let partitions: Vec<Option<&str>> = if tokens.is_empty() {
            vec![None]
        } else {
            tokens.iter().map(|t| Some(t.as_str())).collect()
        };

        for month in partitions {
            match fetch_partition_records(source, credentials, month).await {
                Ok(fetch) => {
                    observer.partition_fetched(month, fetch.records.len(), fetch.outcome);
                    records.extend(fetch.records);
                }
                Err(error) => observer.partition_failed(month, &error),
            }
        }
    }

    Ok(records)
}
