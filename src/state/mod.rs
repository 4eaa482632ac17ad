//! In-memory plugin state store.
//!
//! Reference implementation of the [`StateStore`] access contract used by
//! the host binary and by tests. Records live in a concurrent map keyed by
//! the full [`StateKey`]; each record is a field map plus its last update
//! time. Persistent backends plug in behind the same trait.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;

use async_trait::async_trait;
use tracing::trace;

use crate::error::Result;
use crate::sdk::{StateKey, StateStore};

#[derive(Debug, Clone)]
struct StateRecord {
    fields: HashMap<String, Value>,
    updated_at: DateTime<Utc>,
}

/// DashMap-backed [`StateStore`].
#[derive(Default)]
pub struct MemoryStateStore {
    records: DashMap<StateKey, StateRecord>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct state keys with at least one field.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// When the record under `key` last changed.
    pub fn updated_at(&self, key: &StateKey) -> Option<DateTime<Utc>> {
        self.records.get(key).map(|record| record.updated_at)
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, key: &StateKey, field: &str) -> Result<Option<Value>> {
        Ok(self
            .records
            .get(key)
            .and_then(|record| record.fields.get(field).cloned()))
    }

    async fn save(&self, key: &StateKey, field: &str, value: Value) -> Result<()> {
        trace!(plugin = %key.plugin_id, field, "state field saved");
        let mut record = self.records.entry(key.clone()).or_insert_with(|| StateRecord {
            fields: HashMap::new(),
            updated_at: Utc::now(),
        });
        record.fields.insert(field.to_string(), value);
        record.updated_at = Utc::now();
        Ok(())
    }
}
