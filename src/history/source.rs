use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::record::{present, RawRecord, Scalar};

/// Caller identity forwarded to every upstream request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(rename = "stuNumber")]
    pub student_number: String,
    pub token: String,
    pub school_id: String,
    pub campus_id: String,
}

/// A school term as listed by the upstream. Identifiers may arrive as strings or numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Term {
    #[serde(default)]
    pub term_id: Option<Scalar>,
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub is_current: Option<Scalar>,
}

impl Term {
    pub fn identifier(&self) -> Option<Cow<'_, str>> {
        present(&self.term_id).or_else(|| present(&self.id))
    }

    /// Only the literal string `"1"` marks a term as current.
    pub fn is_current(&self) -> bool {
        matches!(&self.is_current, Some(Scalar::Text(flag)) if flag == "1")
    }
}

/// A month inside a term. Upstream builds disagree on which field carries the token.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Month {
    #[serde(default)]
    pub month_id: Option<Scalar>,
    #[serde(default)]
    pub id: Option<Scalar>,
    #[serde(default)]
    pub month_code: Option<Scalar>,
}

impl Month {
    pub fn token(&self) -> Option<Cow<'_, str>> {
        present(&self.month_id)
            .or_else(|| present(&self.id))
            .or_else(|| present(&self.month_code))
    }
}

/// Parameters of a single record page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPageQuery<'a> {
    pub month: Option<&'a str>,
    pub page_number: u32,
    pub page_size: u32,
    pub run_type: &'a str,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunPage {
    #[serde(default, deserialize_with = "lenient_list")]
    pub run_list: Vec<RawRecord>,
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("upstream request timed out")]
    Timeout,
    #[error("upstream network error: {0}")]
    Network(String),
    #[error("upstream returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("upstream payload could not be decoded: {0}")]
    Decode(String),
}

/// The remote record API, abstracted so the aggregation never sees transport details.
#[axum::async_trait]
pub trait RunSource: Send + Sync {
    async fn list_terms(&self, credentials: &Credentials) -> Result<Vec<Term>, SourceError>;

    async fn list_months(
        &self,
        term_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<Month>, SourceError>;

    async fn fetch_run_page(
        &self,
        credentials: &Credentials,
        query: RunPageQuery<'_>,
    ) -> Result<RunPage, SourceError>;
}

/// Accepts a JSON array of `T`. `null`, non-array values and elements that do
/// not decode as `T` are treated as absent.
pub fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: serde::de::DeserializeOwned,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}
