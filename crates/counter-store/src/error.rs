//! Counter store errors.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store API error: {0}")]
    Api(String),

    #[error("Store did not answer within {0:?}")]
    Timeout(Duration),

    #[error("Unexpected store response: {0}")]
    InvalidResponse(String),
}
