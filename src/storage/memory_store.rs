use super::{change_channel, KeyValueStore, StorageChange, StoreError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};
use tracing::debug;

/// Volatile store, used by tests and dry runs
#[derive(Debug)]
pub struct MemoryStore {
    namespace: String,
    values: RwLock<HashMap<String, Value>>,
    changes: broadcast::Sender<StorageChange>,
}

impl MemoryStore {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            values: RwLock::new(HashMap::new()),
            changes: change_channel(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(super::DEFAULT_NAMESPACE)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let changed = {
            let mut values = self.values.write().await;
            let changed = values.get(key) != Some(&value);
            values.insert(key.to_string(), value);
            changed
        };

        if changed {
            debug!("Memory store key '{}' changed", key);
            // No subscribers is fine
            let _ = self.changes.send(StorageChange {
                namespace: self.namespace.clone(),
                keys: vec![key.to_string()],
            });
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StorageChange> {
        self.changes.subscribe()
    }
}
