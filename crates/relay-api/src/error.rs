//! API error types

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use relay_core::CoreError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("invalid request body")]
    MalformedRequest,

    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Callers get a plain-text error body; which upstream failed and how
/// many retries happened are never exposed.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::MalformedRequest => {
                (StatusCode::BAD_REQUEST, "invalid request body".to_string())
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            ApiError::Core(e) => match e {
                CoreError::AlreadyRefreshing => (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "no available keys or urls, currently rechecking".to_string(),
                ),
                CoreError::NoUpstreams => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "no available keys and urls".to_string(),
                ),
                CoreError::ConfigUnavailable(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
                }
            },
        };

        (status, message).into_response()
    }
}
