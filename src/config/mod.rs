pub mod engine_config;
pub mod helper;
pub mod server_config;
pub mod storage_config;

use crate::config::engine_config::EngineConfig;
use crate::config::server_config::ServerConfig;
use crate::config::storage_config::StorageConfig;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure matching config.yaml format
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load configuration from YAML file
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config =
            serde_yaml::from_str(&content).with_context(|| "Failed to parse YAML config file")?;

        // Surface a bad debounce now rather than when the watcher starts
        config
            .storage
            .debounce_duration()
            .context("Invalid storage.debounce")?;

        Ok(config)
    }

    /// Load the given file, or defaults when no file is given
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
storage:
  path: /tmp/mh/store.json
  watch: false
engine:
  path: /tmp/mh/rules.json
server:
  port: 9000
"#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/mh/store.json"));
        assert!(!config.storage.watch);
        assert_eq!(config.engine.path, PathBuf::from("/tmp/mh/rules.json"));
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "localhost");
    }

    #[test]
    fn test_empty_sections_use_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "server: {{}}").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.storage.namespace, "local");
        assert!(config.server.enabled);
    }

    #[test]
    fn test_bad_debounce_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "storage:\n  debounce: soon\n").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(err.to_string().contains("Invalid storage.debounce"));
    }

    #[test]
    fn test_missing_file() {
        let err = Config::from_file(Path::new("nonexistent.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
