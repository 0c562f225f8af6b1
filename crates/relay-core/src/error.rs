//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("upstream list unavailable: {0}")]
    ConfigUnavailable(String),

    #[error("refresh already in progress")]
    AlreadyRefreshing,

    #[error("no available keys and urls")]
    NoUpstreams,
}
