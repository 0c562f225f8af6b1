//! Manual refresh-trigger endpoint

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tracing::{debug, warn};

use relay_core::CoreError;

use crate::state::AppState;

/// Synchronously re-probe every configured upstream and report the
/// counts. Returns 503 while another refresh holds the flag.
async fn check_alive(State(state): State<AppState>) -> Response {
    debug!("manual recheck requested");

    match state.refresher.refresh().await {
        Ok(summary) => (StatusCode::OK, format!("{}\n", summary)).into_response(),
        Err(CoreError::AlreadyRefreshing) => {
            warn!("currently rechecking");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "currently rechecking, try again later",
            )
                .into_response()
        }
        Err(e) => {
            warn!(error = %e, "manual recheck failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/check-alive", get(check_alive).post(check_alive))
}
