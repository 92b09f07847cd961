//! HTTP request handlers.

use super::AppState;
use crate::interaction::Reply;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

/// Interaction webhook endpoint.
///
/// Always answers with JSON: 200 with the reply, or the error status with
/// an `error` body.
pub async fn interactions(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match state.dispatcher.dispatch(&method, &headers, &body).await {
        Ok(reply) => (StatusCode::OK, Json(reply)).into_response(),
        Err(e) => e.into_response(),
    }
}

/// Health check endpoint.
pub async fn health() -> Json<Reply> {
    Json(Reply::healthy(Utc::now()))
}
