//! DeepLX relay HTTP API
//!
//! Axum routes exposing the uniform translation endpoint, the
//! refresh-trigger endpoint, and a health check.

pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
