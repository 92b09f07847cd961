//! Common test utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use counter_store::CounterStore;
use std::sync::Arc;
use tower::ServiceExt;
use webhook_bot::api::{create_router, AppState};
use webhook_bot::{Config, Dispatcher};

/// Build the router with default config over the given store.
pub fn test_app(counter: Arc<dyn CounterStore>) -> Router {
    test_app_with_config(&Config::default(), counter)
}

pub fn test_app_with_config(config: &Config, counter: Arc<dyn CounterStore>) -> Router {
    let dispatcher = Dispatcher::from_config(config, counter).unwrap();
    create_router(AppState::new(dispatcher))
}

/// Send a request and decode the JSON reply.
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);

    (status, json)
}

pub fn post(uri: &str, body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap()
}

/// Slash command payload as delivered inside a guild.
pub fn command_body(name: &str, username: &str) -> String {
    serde_json::json!({
        "type": 2,
        "data": {"name": name},
        "member": {"user": {"username": username}}
    })
    .to_string()
}
