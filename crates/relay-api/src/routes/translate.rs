//! The uniform translation endpoint

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use bytes::Bytes;
use serde::Serialize;
use tracing::warn;

use relay_core::TranslateRequest;

use crate::error::ApiError;
use crate::state::AppState;

/// DeepLX-shaped success body.
#[derive(Debug, Serialize)]
pub struct RelayResponse {
    pub code: u16,
    pub id: u64,
    pub data: String,
    pub alternatives: Vec<String>,
}

/// Translate handler. The body is decoded by hand so a malformed
/// request is rejected before any upstream is contacted.
async fn translate(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<RelayResponse>, ApiError> {
    let request: TranslateRequest = serde_json::from_slice(&body).map_err(|_| {
        warn!("invalid request body");
        ApiError::MalformedRequest
    })?;

    let translation = state.engine.translate(&request).await?;

    Ok(Json(RelayResponse {
        code: 200,
        id: 0,
        data: translation.data,
        alternatives: translation.alternatives,
    }))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/", post(translate))
}
