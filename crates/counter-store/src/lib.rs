//! Persistent usage counter for the webhook bot.
//!
//! Exposes a `CounterStore` trait with an atomic increment-and-read
//! primitive and two backends: in-memory and Redis REST.

mod error;
mod rest;
mod store;
mod types;

pub use error::StoreError;
pub use rest::RestCounterStore;
pub use store::{CounterStore, MemoryCounterStore};
pub use types::*;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn create_test_client(mock_server: &MockServer) -> RestCounterStore {
        RestCounterStore::new(mock_server.uri(), "test-token", Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_counter_record_bump() {
        let mut record = CounterRecord::new("stats");
        assert_eq!(record.count, 0);
        assert!(record.last_used.is_none());

        let now = chrono::Utc::now();
        record.bump(now);
        record.bump(now);

        assert_eq!(record.count, 2);
        assert_eq!(record.last_used, Some(now));
    }

    #[test]
    fn test_counter_record_deserialization_without_last_used() {
        let json = r#"{"key": "stats", "count": 41}"#;
        let record: CounterRecord = serde_json::from_str(json).unwrap();

        assert_eq!(record.key, "stats");
        assert_eq!(record.count, 41);
        assert!(record.last_used.is_none());
    }

    #[test]
    fn test_memory_store_starts_empty() {
        let store = MemoryCounterStore::new();
        assert!(tokio_test::block_on(store.is_empty()));
        assert!(tokio_test::block_on(store.get("stats")).unwrap().is_none());
    }

    // In-memory store tests

    #[tokio::test]
    async fn test_memory_increment_creates_row_lazily() {
        let store = MemoryCounterStore::new();

        let record = store.increment_and_get("stats").await.unwrap();
        assert_eq!(record.count, 1);
        assert!(record.last_used.is_some());

        let record = store.increment_and_get("stats").await.unwrap();
        assert_eq!(record.count, 2);

        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_memory_get_does_not_mutate() {
        let store = MemoryCounterStore::new();
        store.increment_and_get("stats").await.unwrap();

        let first = store.get("stats").await.unwrap().unwrap();
        let second = store.get("stats").await.unwrap().unwrap();
        assert_eq!(first.count, 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_memory_keys_are_independent() {
        let store = MemoryCounterStore::new();
        store.increment_and_get("stats").await.unwrap();
        store.increment_and_get("stats").await.unwrap();
        store.increment_and_get("commands_executed").await.unwrap();

        assert_eq!(store.get("stats").await.unwrap().unwrap().count, 2);
        assert_eq!(
            store.get("commands_executed").await.unwrap().unwrap().count,
            1
        );
    }

    #[tokio::test]
    async fn test_memory_concurrent_increments_are_not_lost() {
        let store = Arc::new(MemoryCounterStore::new());
        let tasks = 64;

        let handles: Vec<_> = (0..tasks)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.increment_and_get("stats").await.unwrap() })
            })
            .collect();

        let mut seen: Vec<u64> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap().count)
            .collect();
        seen.sort_unstable();

        // Every caller observed a distinct count
        assert_eq!(seen, (1..=tasks).collect::<Vec<u64>>());
        assert_eq!(store.get("stats").await.unwrap().unwrap().count, tasks);
    }

    // REST store tests

    #[tokio::test]
    async fn test_rest_increment_uses_transaction() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/multi-exec"))
            .and(header("Authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"result": 42},
                {"result": 0}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server);
        let record = store.increment_and_get("stats").await.unwrap();

        assert_eq!(record.key, "stats");
        assert_eq!(record.count, 42);
        assert!(record.last_used.is_some());
    }

    #[tokio::test]
    async fn test_rest_increment_sends_configured_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/multi-exec"))
            .and(wiremock::matchers::body_string_contains(
                r#"["HINCRBY","commands_executed","commands","1"]"#,
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"result": 3},
                {"result": 1}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server).with_fields(CounterFields {
            count: "commands".into(),
            last_used: "last_used".into(),
        });
        let record = store.increment_and_get("commands_executed").await.unwrap();
        assert_eq!(record.count, 3);
    }

    #[tokio::test]
    async fn test_rest_increment_command_error() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/multi-exec"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"error": "WRONGTYPE Operation against a key holding the wrong kind of value"},
                {"result": 0}
            ])))
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server);
        let result = store.increment_and_get("stats").await;

        assert!(matches!(result, Err(StoreError::Api(_))));
    }

    #[tokio::test]
    async fn test_rest_increment_keeps_count_when_hset_fails() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/multi-exec"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"result": 9},
                {"error": "OOM command not allowed when used memory > 'maxmemory'"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server);
        let record = store.increment_and_get("stats").await.unwrap();

        assert_eq!(record.count, 9);
        assert!(record.last_used.is_none());
    }

    #[tokio::test]
    async fn test_rest_unauthorized() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/multi-exec"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(serde_json::json!({"error": "Unauthorized"})),
            )
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server);
        match store.increment_and_get("stats").await {
            Err(StoreError::Api(msg)) => assert!(msg.contains("Unauthorized")),
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rest_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/multi-exec"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{"result": 1}, {"result": 0}]))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let store =
            RestCounterStore::new(mock_server.uri(), "test-token", Duration::from_millis(100))
                .unwrap();
        let result = store.increment_and_get("stats").await;

        assert!(matches!(result, Err(StoreError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_rest_unreachable() {
        let store =
            RestCounterStore::new("http://127.0.0.1:9", "test-token", Duration::from_secs(1))
                .unwrap();
        assert!(store.increment_and_get("stats").await.is_err());
        assert!(!store.health_check().await);
    }

    #[tokio::test]
    async fn test_rest_get_existing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(serde_json::json!(["HMGET", "stats", "count", "last_used"])))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": ["17", "2024-05-01T10:20:30+00:00"]
            })))
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server);
        let record = store.get("stats").await.unwrap().unwrap();

        assert_eq!(record.count, 17);
        assert_eq!(
            record.last_used.unwrap().to_rfc3339(),
            "2024-05-01T10:20:30+00:00"
        );
    }

    #[tokio::test]
    async fn test_rest_get_missing() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"result": [null, null]})),
            )
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server);
        assert!(store.get("stats").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_rest_health_check() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(body_json(serde_json::json!(["PING"])))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "PONG"})),
            )
            .mount(&mock_server)
            .await;

        let store = create_test_client(&mock_server);
        assert!(store.health_check().await);
    }
}
