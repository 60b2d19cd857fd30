//! In-memory `RunSource` for unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use super::observer::HistoryObserver;
use super::pager::PageState;
use super::record::{RawRecord, Scalar};
use super::source::{Credentials, Month, RunPage, RunPageQuery, RunSource, SourceError, Term};

#[derive(Debug, Default)]
pub struct ScriptedSource {
    terms: Vec<Term>,
    fail_terms: bool,
    months: HashMap<String, Vec<Month>>,
    fail_months: HashSet<String>,
    pages: HashMap<Option<String>, Vec<Vec<RawRecord>>>,
    fail_pages: HashSet<(Option<String>, u32)>,
    page_calls: Mutex<Vec<(Option<String>, u32)>>,
    month_calls: Mutex<Vec<String>>,
}

impl ScriptedSource {
    pub fn with_terms(mut self, terms: Vec<Term>) -> Self {
        self.terms = terms;
        self
    }

    pub fn failing_terms(mut self) -> Self {
        self.fail_terms = true;
        self
    }

    pub fn with_months(mut self, term_id: &str, months: Vec<Month>) -> Self {
        self.months.insert(term_id.to_string(), months);
        self
    }

    pub fn failing_months(mut self, term_id: &str) -> Self {
        self.fail_months.insert(term_id.to_string());
        self
    }

    pub fn with_pages(mut self, month: Option<&str>, pages: Vec<Vec<RawRecord>>) -> Self {
        self.pages.insert(month.map(str::to_string), pages);
        self
    }

    pub fn failing_on_page(mut self, month: Option<&str>, page: u32) -> Self {
        self.fail_pages.insert((month.map(str::to_string), page));
        self
    }

    pub fn page_calls(&self) -> Vec<(Option<String>, u32)> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn month_calls(&self) -> Vec<String> {
        self.month_calls.lock().unwrap().clone()
    }
}

#[axum::async_trait]
impl RunSource for ScriptedSource {
    async fn list_terms(&self, _credentials: &Credentials) -> Result<Vec<Term>, SourceError> {
        if self.fail_terms {
            return Err(SourceError::Network("term listing refused".to_string()));
        }
        Ok(self.terms.clone())
    }

    async fn list_months(
        &self,
        term_id: &str,
        _credentials: &Credentials,
    ) -> Result<Vec<Month>, SourceError> {
        self.month_calls.lock().unwrap().push(term_id.to_string());
        if self.fail_months.contains(term_id) {
            return Err(SourceError::Status {
                status: 500,
                message: "month listing failed".to_string(),
            });
        }
        Ok(self.months.get(term_id).cloned().unwrap_or_default())
    }

    async fn fetch_run_page(
        &self,
        _credentials: &Credentials,
        query: RunPageQuery<'_>,
    ) -> Result<RunPage, SourceError> {
        let key = query.month.map(str::to_string);
        self.page_calls
            .lock()
            .unwrap()
            .push((key.clone(), query.page_number));
        if self.fail_pages.contains(&(key.clone(), query.page_number)) {
            return Err(SourceError::Network(format!(
                "page {} refused",
                query.page_number
            )));
        }
        let run_list = self
            .pages
            .get(&key)
            .and_then(|pages| pages.get(query.page_number as usize - 1))
            .cloned()
            .unwrap_or_default();
        Ok(RunPage { run_list })
    }
}

pub fn term(id: Option<&str>, is_current: &str) -> Term {
    Term {
        term_id: id.map(Scalar::from),
        id: None,
        is_current: Some(Scalar::from(is_current)),
    }
}

pub fn month(token: &str) -> Month {
    Month {
        month_id: Some(Scalar::from(token)),
        ..Month::default()
    }
}

pub fn run(score_id: Option<&str>, run_time: &str, mileage: &str) -> RawRecord {
    RawRecord {
        score_id: score_id.map(Scalar::from),
        day: None,
        run_time: Some(Scalar::from(run_time)),
        mileage: Some(Scalar::from(mileage)),
        extra: Default::default(),
    }
}

/// `count` records with score ids `{prefix}-0..` all run on 2024-03-01.
pub fn numbered_records(prefix: &str, count: usize) -> Vec<RawRecord> {
    (0..count)
        .map(|i| {
            run(
                Some(&format!("{prefix}-{i}")),
                "2024-03-01 06:00:00",
                "2.00",
            )
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistoryEvent {
    Failed { month: Option<String>, error: String },
    Fetched { month: Option<String>, records: usize, outcome: PageState },
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<HistoryEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<HistoryEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<Option<String>> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                HistoryEvent::Failed { month, .. } => Some(month),
                HistoryEvent::Fetched { .. } => None,
            })
            .collect()
    }

    fn push(&self, event: HistoryEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl HistoryObserver for RecordingObserver {
    fn partition_failed(&self, month: Option<&str>, error: &SourceError) {
        self.push(HistoryEvent::Failed {
            month: month.map(str::to_string),
            error: error.to_string(),
        });
    }

    fn partition_fetched(&self, month: Option<&str>, records: usize, outcome: PageState) {
        self.push(HistoryEvent::Fetched {
            month: month.map(str::to_string),
            records,
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_observer_keeps_order() {
        let observer = RecordingObserver::default();
        observer.partition_fetched(Some("202402"), 3, PageState::DoneShortPage);
        observer.partition_failed(Some("202403"), &SourceError::Timeout);
        observer.partition_fetched(None, 0, PageState::DoneEmpty);

        let events = observer.events();
        assert_eq!(events.len(), 3);
        assert_eq!(
            events[1],
            HistoryEvent::Failed {
                month: Some("202403".to_string()),
                error: "upstream request timed out".to_string(),
            }
        );
        assert_eq!(observer.failures(), vec![Some("202403".to_string())]);
    }
}
