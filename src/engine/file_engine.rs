//! Installed rules persisted as a JSON array

use super::{apply_update, EngineError, RuleEngine, UpdateRuleOptions};
use crate::compiler::CompiledRule;
use crate::storage::write_atomic;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Engine writing its installed rule set to a file that a request-time
/// consumer can load
#[derive(Debug)]
pub struct FileRuleEngine {
    file_path: PathBuf,
    // Serializes read-modify-write cycles on the file
    lock: Mutex<()>,
}

impl FileRuleEngine {
    pub fn new<P: AsRef<Path>>(file_path: P) -> Self {
        Self {
            file_path: file_path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    async fn read_rules(&self) -> Result<Vec<CompiledRule>, EngineError> {
        if !fs::try_exists(&self.file_path).await? {
            debug!("Rules file not found, no rules installed: {}", self.file_path.display());
            return Ok(Vec::new());
        }

        let contents = fs::read_to_string(&self.file_path).await?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }

        // An unreadable file holds no usable rules; the next full replace
        // overwrites it
        match serde_json::from_str(&contents) {
            Ok(rules) => Ok(rules),
            Err(e) => {
                warn!("Ignoring unreadable rules file {}: {}", self.file_path.display(), e);
                Ok(Vec::new())
            }
        }
    }

    async fn write_rules(&self, rules: &[CompiledRule]) -> Result<(), EngineError> {
        let json = serde_json::to_string_pretty(rules)?;
        write_atomic(&self.file_path, json.as_bytes()).await?;
        Ok(())
    }
}

#[async_trait]
impl RuleEngine for FileRuleEngine {
    async fn get_dynamic_rules(&self) -> Result<Vec<CompiledRule>, EngineError> {
        let _guard = self.lock.lock().await;
        self.read_rules().await
    }

    async fn update_dynamic_rules(&self, options: UpdateRuleOptions) -> Result<(), EngineError> {
        let _guard = self.lock.lock().await;
        let installed = self.read_rules().await?;
        let next = apply_update(&installed, &options)?;

        self.write_rules(&next).await?;
        info!(
            "Installed {} dynamic rule(s) to {}",
            next.len(),
            self.file_path.display()
        );
        Ok(())
    }
}
