use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::UpstreamConfig;
use crate::history::source::{
    lenient_list, Credentials, Month, RunPage, RunPageQuery, RunSource, SourceError, Term,
};

const TERM_PATH: &str = "platform/serverlist/getSchoolTerm";
const MONTH_PATH: &str = "platform/serverlist/getSchoolMonthByTerm";
const SUN_RUN_PATH: &str = "platform/recordsport/getSunRunSport";

/// Upper bound on how much of an error body is echoed back in `SourceError::Status`.
const MAX_ERROR_BODY_CHARS: usize = 200;

/// JSON-over-HTTP client for the Totoro run record API.
#[derive(Debug, Clone)]
pub struct TotoroClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MonthRequest<'a> {
    #[serde(flatten)]
    credentials: &'a Credentials,
    term_id: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunPageRequest<'a> {
    #[serde(flatten)]
    credentials: &'a Credentials,
    run_type: &'a str,
    page_number: String,
    row_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    month_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TermListResponse {
    #[serde(default, deserialize_with = "lenient_list")]
    data: Vec<Term>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthListResponse {
    #[serde(default)]
    month_list: Option<serde_json::Value>,
    #[serde(default)]
    data: Option<serde_json::Value>,
}

impl MonthListResponse {
    /// `monthList` wins when it is an array; otherwise `data` is used.
    fn into_months(self) -> Vec<Month> {
        let items = match (self.month_list, self.data) {
            (Some(serde_json::Value::Array(items)), _) => items,
            (_, Some(serde_json::Value::Array(items))) => items,
            _ => Vec::new(),
        };
        items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()
    }
}

impl TotoroClient {
    pub fn new(config: &UpstreamConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, SourceError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(map_transport_error)?;

        if !status.is_success() {
            let message: String = String::from_utf8_lossy(&bytes)
                .chars()
                .take(MAX_ERROR_BODY_CHARS)
                .collect();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| SourceError::Decode(e.to_string()))
    }
}

fn map_transport_error(error: reqwest::Error) -> SourceError {
    if error.is_timeout() {
        SourceError::Timeout
    } else {
        SourceError::Network(error.to_string())
    }
}

#[axum::async_trait]
impl RunSource for TotoroClient {
    async fn list_terms(&self, credentials: &Credentials) -> Result<Vec<Term>, SourceError> {
        let response: TermListResponse = self.post_json(TERM_PATH, credentials).await?;
        Ok(response.data)
    }

    async fn list_months(
        &self,
        term_id: &str,
        credentials: &Credentials,
    ) -> Result<Vec<Month>, SourceError> {
        let body = MonthRequest {
            credentials,
            term_id,
        };
        let response: MonthListResponse = self.post_json(MONTH_PATH, &body).await?;
        Ok(response.into_months())
    }

    async fn fetch_run_page(
        &self,
        credentials: &Credentials,
        query: RunPageQuery<'_>,
    ) -> Result<RunPage, SourceError> {
        let body = RunPageRequest {
            credentials,
            run_type: query.run_type,
            page_number: query.page_number.to_string(),
            row_number: query.page_size.to_string(),
            month_id: query.month,
        };
        tracing::debug!(
            month = query.month.unwrap_or(""),
            page = query.page_number,
            "Requesting run record page"
        );
        self.post_json(SUN_RUN_PATH, &body).await
    }
}
