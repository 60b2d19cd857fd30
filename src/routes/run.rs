use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::Router;
use serde::Deserialize;

use crate::extractors::JsonBody;
use crate::history::collect_history;
use crate::response::{ok, AppError};
use crate::state::AppState;
use crate::validation::{parse_date_range, validate_session, SessionInput};

pub fn router() -> Router<AppState> {
    Router::new().route("/history", post(run_history))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryRequest {
    #[serde(default)]
    session: Option<SessionInput>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    end_date: Option<String>,
}

async fn run_history(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<HistoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let credentials = validate_session(req.session.as_ref()).map_err(AppError::bad_request)?;
    let range = parse_date_range(req.start_date.as_deref(), req.end_date.as_deref())
        .map_err(AppError::bad_request)?;

    tracing::info!(
        start = %range.start,
        end = %range.end,
        "Collecting run history"
    );

    let result = collect_history(state.source(), &credentials, range, state.observer()).await?;
    Ok(ok(result))
}
