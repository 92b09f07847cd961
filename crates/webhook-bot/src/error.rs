//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

/// Main application error type.
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Request body is required")]
    MissingBody,

    #[error("Malformed interaction payload: {0}")]
    MalformedPayload(String),

    #[error("Invalid request signature: {0}")]
    InvalidSignature(#[from] crate::signature::SignatureError),

    #[error("Configuration error: {0}")]
    Config(#[from] anyhow::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for BotError {
    fn from(e: serde_json::Error) -> Self {
        BotError::MalformedPayload(e.to_string())
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl BotError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            BotError::MissingBody | BotError::MalformedPayload(_) => StatusCode::BAD_REQUEST,
            BotError::InvalidSignature(_) => StatusCode::UNAUTHORIZED,
            BotError::Config(_) | BotError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Server-side failures only report a generic message; details stay
    /// in the logs.
    pub fn public_message(&self) -> String {
        match self {
            BotError::MissingBody => self.to_string(),
            BotError::MalformedPayload(_) => "Invalid request payload".to_string(),
            BotError::InvalidSignature(_) => "Invalid request signature".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for BotError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }

        let body = ErrorResponse {
            error: self.public_message(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for application errors.
pub type BotResult<T> = Result<T, BotError>;
