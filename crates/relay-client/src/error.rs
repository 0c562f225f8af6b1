//! Client error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(u16),

    #[error("upstream rate limited")]
    TooManyRequests,

    #[error("quota exceeded")]
    QuotaExceeded,

    #[error("upstream returned no translations: {0}")]
    Empty(String),

    #[error("upstream rejected request with code {0}")]
    Rejected(i64),

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}
