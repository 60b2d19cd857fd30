pub mod health;
pub mod run;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::constants::MAX_BODY_SIZE;
use crate::middleware::request_id;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/run", run::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}
