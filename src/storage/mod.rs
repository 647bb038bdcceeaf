//! Namespaced key-value storage with change notifications
//!
//! This module provides the persistence the profile list lives in:
//! - A `KeyValueStore` trait with whole-value get/set by key
//! - Change notifications scoped to a namespace and the keys that changed
//! - An in-memory backend and a JSON file backend with an optional watcher

pub mod atomic;
pub mod file_store;
pub mod memory_store;

pub use atomic::write_atomic;
pub use file_store::JsonFileStore;
pub use memory_store::MemoryStore;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::sync::broadcast;

/// Namespace used for the profile store
pub const DEFAULT_NAMESPACE: &str = "local";

/// Capacity of each store's change channel
const CHANGE_CHANNEL_CAPACITY: usize = 64;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Store document is not a JSON object: {0}")]
    InvalidDocument(String),
    #[error("File watcher error: {0}")]
    Watch(#[from] notify::Error),
}

/// Notification that one or more keys changed in a namespace
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageChange {
    pub namespace: String,
    pub keys: Vec<String>,
}

impl StorageChange {
    pub fn touches(&self, namespace: &str, key: &str) -> bool {
        self.namespace == namespace && self.keys.iter().any(|k| k == key)
    }
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Namespace reported in this store's change notifications
    fn namespace(&self) -> &str;

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the whole value stored under `key`
    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;

    fn subscribe(&self) -> broadcast::Receiver<StorageChange>;
}

pub(crate) fn change_channel() -> broadcast::Sender<StorageChange> {
    let (tx, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
    tx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_touches_namespace_and_key() {
        let change = StorageChange {
            namespace: "local".to_string(),
            keys: vec!["profiles".to_string(), "other".to_string()],
        };
        assert!(change.touches("local", "profiles"));
        assert!(!change.touches("sync", "profiles"));
        assert!(!change.touches("local", "settings"));
    }
}
