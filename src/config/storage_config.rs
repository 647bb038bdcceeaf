use crate::config::helper::parse_duration;
use crate::storage::DEFAULT_NAMESPACE;
use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Report edits made to the store file by other processes
    #[serde(default = "default_watch")]
    pub watch: bool,
    #[serde(default = "default_debounce")]
    pub debounce: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            namespace: default_namespace(),
            watch: default_watch(),
            debounce: default_debounce(),
        }
    }
}

impl StorageConfig {
    pub fn debounce_duration(&self) -> Result<Duration> {
        parse_duration(&self.debounce)
    }
}

/// Base directory for the store and the installed rules
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("modify-headers")
}

fn default_store_path() -> PathBuf {
    default_data_dir().join("store.json")
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}

fn default_watch() -> bool {
    true
}

fn default_debounce() -> String {
    "500ms".to_string()
}
