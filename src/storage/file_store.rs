//! Key-value persistence to a single JSON document

use super::{change_channel, write_atomic, KeyValueStore, StorageChange, StoreError};
use async_trait::async_trait;
use notify::{RecommendedWatcher, RecursiveMode, Result as NotifyResult, Watcher};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::fs;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info};

type Snapshot = Arc<RwLock<Map<String, Value>>>;

/// Stores every key of one namespace as a field of a JSON object on disk.
///
/// Each `set` rewrites the whole document. With `watch` enabled, edits made
/// to the file by other processes are reported as change notifications for
/// the keys whose values differ from the last known state.
pub struct JsonFileStore {
    file_path: PathBuf,
    namespace: String,
    snapshot: Snapshot,
    changes: broadcast::Sender<StorageChange>,
    watcher: Mutex<Option<RecommendedWatcher>>,
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("file_path", &self.file_path)
            .field("namespace", &self.namespace)
            .field("watcher", &"<watcher>")
            .finish()
    }
}

impl JsonFileStore {
    /// Open the store, loading the current document if the file exists
    pub async fn open<P: AsRef<Path>>(file_path: P, namespace: &str) -> Result<Self, StoreError> {
        let file_path = file_path.as_ref().to_path_buf();
        let document = read_document(&file_path).await?;
        info!(
            "Opened store '{}' at {} with {} key(s)",
            namespace,
            file_path.display(),
            document.len()
        );

        Ok(Self {
            file_path,
            namespace: namespace.to_string(),
            snapshot: Arc::new(RwLock::new(document)),
            changes: change_channel(),
            watcher: Mutex::new(None),
        })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Start reporting external edits of the store file.
    ///
    /// Must be called from within a tokio runtime. The parent directory is
    /// watched so that editors replacing the file are still noticed.
    pub async fn watch(&self, debounce: Duration) -> Result<(), StoreError> {
        if !fs::try_exists(&self.file_path).await? {
            write_document(&self.file_path, &Map::new()).await?;
        }

        let watch_dir = self
            .file_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf();
        let file_name = self.file_path.file_name().map(|n| n.to_os_string());

        let runtime = tokio::runtime::Handle::current();
        let snapshot = self.snapshot.clone();
        let changes = self.changes.clone();
        let namespace = self.namespace.clone();
        let path = self.file_path.clone();

        let mut watcher = notify::recommended_watcher(move |res: NotifyResult<notify::Event>| {
            let Ok(event) = res else {
                return;
            };
            let ours = event
                .paths
                .iter()
                .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
            if !ours || event.kind.is_access() {
                return;
            }

            let snapshot = snapshot.clone();
            let changes = changes.clone();
            let namespace = namespace.clone();
            let path = path.clone();
            runtime.spawn(async move {
                // Let the writer finish before reading
                tokio::time::sleep(debounce).await;
                reload(&path, &namespace, &snapshot, &changes).await;
            });
        })?;
        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        info!("Watching store file {}", self.file_path.display());
        if let Ok(mut guard) = self.watcher.lock() {
            *guard = Some(watcher);
        }
        Ok(())
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        let document = read_document(&self.file_path).await?;
        Ok(document.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut document = read_document(&self.file_path).await?;
        let changed = document.get(key) != Some(&value);
        document.insert(key.to_string(), value);

        write_document(&self.file_path, &document).await?;
        debug!("Saved key '{}' to {}", key, self.file_path.display());

        *self.snapshot.write().await = document;

        if changed {
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

async fn read_document(path: &Path) -> Result<Map<String, Value>, StoreError> {
    if !fs::try_exists(path).await? {
        return Ok(Map::new());
    }

    let contents = fs::read_to_string(path).await?;
    if contents.trim().is_empty() {
        return Ok(Map::new());
    }

    match serde_json::from_str::<Value>(&contents)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidDocument(format!(
            "{} holds {}",
            path.display(),
            json_kind(&other)
        ))),
    }
}

async fn write_document(path: &Path, document: &Map<String, Value>) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(document)?;
    write_atomic(path, json.as_bytes()).await?;
    Ok(())
}

async fn reload(
    path: &Path,
    namespace: &str,
    snapshot: &Snapshot,
    changes: &broadcast::Sender<StorageChange>,
) {
    let document = match read_document(path).await {
        Ok(document) => document,
        Err(e) => {
            error!("Failed to reload store {}: {}", path.display(), e);
            return;
        }
    };

    let keys = {
        let mut current = snapshot.write().await;
        let keys = changed_keys(&current, &document);
        *current = document;
        keys
    };

    if !keys.is_empty() {
        info!("Store {} changed externally: {:?}", path.display(), keys);
        let _ = changes.send(StorageChange {
            namespace: namespace.to_string(),
            keys,
        });
    }
}

fn changed_keys(old: &Map<String, Value>, new: &Map<String, Value>) -> Vec<String> {
    let mut keys: Vec<String> = new
        .iter()
        .filter(|(k, v)| old.get(*k) != Some(*v))
        .map(|(k, _)| k.clone())
        .collect();
    keys.extend(old.keys().filter(|k| !new.contains_key(*k)).cloned());
    keys.sort();
    keys
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
