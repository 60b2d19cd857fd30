use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::Value;

use run_history_backend::history::source::{
    Credentials, Month, RunPage, RunPageQuery, RunSource, SourceError, Term,
};
use run_history_backend::history::record::Scalar;
use run_history_backend::history::RawRecord;

/// Canned upstream: terms, months per term and record pages per month token.
#[derive(Default)]
pub struct FakeSource {
    terms: Vec<Term>,
    terms_error: Option<String>,
    months: HashMap<String, Vec<Month>>,
    pages: HashMap<Option<String>, Vec<Vec<RawRecord>>>,
    failing_partitions: HashSet<Option<String>>,
    seen_credentials: Mutex<Vec<Credentials>>,
}

impl FakeSource {
    pub fn current_term(mut self, term_id: &str) -> Self {
        self.terms.push(Term {
            term_id: Some(Scalar::from(term_id)),
            id: None,
            is_current: Some(Scalar::from("1")),
        });
        self
    }

    pub fn terms_fail(mut self, message: &str) -> Self {
        self.terms_error = Some(message.to_string());
        self
    }

    pub fn months(mut self, term_id: &str, tokens: &[&str]) -> Self {
        let months = tokens
            .iter()
            .map(|t| Month {
                month_id: Some(Scalar::from(*t)),
                ..Month::default()
            })
            .collect();
        self.months.insert(term_id.to_string(), months);
        self
    }

    /// Pages are JSON arrays of record objects, decoded the same way the HTTP client does.
    pub fn pages(mut self, month: Option<&str>, pages: Vec<Value>) -> Self {
        let decoded = pages
            .into_iter()
            .map(|page| serde_json::from_value(page).expect("page of raw records"))
            .collect();
        self.pages.insert(month.map(str::to_string), decoded);
        self
    }

    pub fn failing(mut self, month: Option<&str>) -> Self {
        self.failing_partitions.insert(month.map(str::to_string));
        self
    }

    pub fn seen_credentials(&self) -> Vec<Credentials> {
        self.seen_credentials.lock().unwrap().clone()
    }
}

#[axum::async_trait]
impl RunSource for FakeSource {
    async fn list_terms(&self, credentials: &Credentials) -> Result<Vec<Term>, SourceError> {
        self.seen_credentials
            .lock()
            .unwrap()
            .push(credentials.clone());
        match &self.terms_error {
            Some(message) => Err(SourceError::Status {
                status: 500,
                message: message.clone(),
            }),
            None => Ok(self.terms.clone()),
        }
    }

    async fn list_months(
        &self,
        term_id: &str,
        _credentials: &Credentials,
    ) -> Result<Vec<Month>, SourceError> {
        Ok(self.months.get(term_id).cloned().unwrap_or_default())
    }

    async fn fetch_run_page(
        &self,
        _credentials: &Credentials,
        query: RunPageQuery<'_>,
    ) -> Result<RunPage, SourceError> {
        let key = query.month.map(str::to_string);
        if self.failing_partitions.contains(&key) {
            return Err(SourceError::Timeout);
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
