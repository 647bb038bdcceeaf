use crate::config::storage_config::default_data_dir;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// File holding the installed dynamic rules
    #[serde(default = "default_rules_path")]
    pub path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            path: default_rules_path(),
        }
    }
}

fn default_rules_path() -> PathBuf {
    default_data_dir().join("rules.json")
}
