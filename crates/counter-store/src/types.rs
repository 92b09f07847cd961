//! Counter data types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single usage counter row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    /// Row key (e.g. "stats")
    pub key: String,
    /// Number of increments applied so far
    pub count: u64,
    /// When the counter was last incremented
    #[serde(default)]
    pub last_used: Option<DateTime<Utc>>,
}

impl CounterRecord {
    /// Create an empty record for a key.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            count: 0,
            last_used: None,
        }
    }

    /// Apply one increment at the given instant.
    pub fn bump(&mut self, now: DateTime<Utc>) {
        self.count += 1;
        self.last_used = Some(now);
    }
}

/// Attribute names used by the hash-backed REST store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterFields {
    pub count: String,
    pub last_used: String,
}

impl Default for CounterFields {
    fn default() -> Self {
        Self {
            count: "count".into(),
            last_used: "last_used".into(),
        }
    }
}
