//! Scoped plugin state access.
//!
//! Plugins persist small values keyed by `(plugin id, scope, group?, user?)`
//! plus a field name. The backing store is behind the [`StateStore`] trait;
//! the host ships an in-memory implementation and a persistent backend can
//! plug in behind the same contract.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;

use super::meta::StorageScope;

/// Full key of one state record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub plugin_id: String,
    pub scope: StorageScope,
    pub group_id: Option<u64>,
    pub user_id: Option<u64>,
}

/// Raw storage contract over JSON values.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, key: &StateKey, field: &str) -> Result<Option<Value>>;

    async fn save(&self, key: &StateKey, field: &str, value: Value) -> Result<()>;
}

/// Typed state accessor handed to a command, already bound to its plugin id.
#[derive(Clone)]
pub struct PluginState {
    plugin_id: String,
    store: Arc<dyn StateStore>,
}

impl PluginState {
    pub fn new(plugin_id: impl Into<String>, store: Arc<dyn StateStore>) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            store,
        }
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        key: &str,
        scope: StorageScope,
        group_id: Option<u64>,
        user_id: Option<u64>,
    ) -> Result<Option<T>> {
        let state_key = self.key(scope, group_id, user_id);
        match self.store.get(&state_key, key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn save<T: Serialize>(
        &self,
        key: &str,
        value: &T,
        scope: StorageScope,
        group_id: Option<u64>,
        user_id: Option<u64>,
    ) -> Result<()> {
        let state_key = self.key(scope, group_id, user_id);
        self.store
            .save(&state_key, key, serde_json::to_value(value)?)
            .await
    }

    fn key(&self, scope: StorageScope, group_id: Option<u64>, user_id: Option<u64>) -> StateKey {
        StateKey {
            plugin_id: self.plugin_id.clone(),
            scope,
            group_id,
            user_id,
        }
    }
}
