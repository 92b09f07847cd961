//! Counter store trait and the in-memory backend.

use crate::error::StoreError;
use crate::types::CounterRecord;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument};

/// Persistent usage counter.
///
/// Implementations must apply `increment_and_get` atomically at the
/// backend: two concurrent callers always observe distinct counts.
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add one to the counter under `key` and return the updated row.
    ///
    /// The row is created on first use.
    async fn increment_and_get(&self, key: &str) -> Result<CounterRecord, StoreError>;

    /// Read a counter without modifying it.
    async fn get(&self, key: &str) -> Result<Option<CounterRecord>, StoreError>;

    /// Whether the backend is reachable.
    async fn health_check(&self) -> bool;
}

/// In-process counter store.
///
/// Serialises increments behind a write lock. Counts are lost on restart,
/// so this backend suits tests and local development.
#[derive(Clone, Default)]
pub struct MemoryCounterStore {
    counters: Arc<RwLock<HashMap<String, CounterRecord>>>,
}

impl MemoryCounterStore {
    pub fn new() -> Self {
        info!("In-memory counter store initialized");
        Self::default()
    }

    /// Number of distinct counters held.
    pub async fn len(&self) -> usize {
        self.counters.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.counters.read().await.is_empty()
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    #[instrument(skip(self))]
    async fn increment_and_get(&self, key: &str) -> Result<CounterRecord, StoreError> {
        let mut counters = self.counters.write().await;
        let record = counters
            .entry(key.to_string())
            .or_insert_with(|| CounterRecord::new(key));

        record.bump(Utc::now());
        debug!("Counter {} now at {}", key, record.count);

        Ok(record.clone())
    }

    #[instrument(skip(self))]
    async fn get(&self, key: &str) -> Result<Option<CounterRecord>, StoreError> {
        let counters = self.counters.read().await;
        Ok(counters.get(key).cloned())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
