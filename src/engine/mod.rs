//! Declarative rule engine contract and local backends
//!
//! The engine owns the installed dynamic rules. It exposes two operations:
//! listing the installed rules and an atomic update that removes a set of ids
//! and adds a set of rules in one step. An update that fails validation
//! changes nothing.

pub mod file_engine;
pub mod memory_engine;
pub mod validate;

pub use file_engine::FileRuleEngine;
pub use memory_engine::MemoryRuleEngine;
pub use validate::{apply_update, MAX_NUMBER_OF_DYNAMIC_RULES};

use crate::compiler::CompiledRule;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Rule with id {id}: {reason}")]
    InvalidRule { id: u32, reason: String },
    #[error("Rule with id {0} is not unique")]
    DuplicateId(u32),
    #[error("Dynamic rule count exceeds maximum ({count} > {max})")]
    RuleCountExceeded { count: usize, max: usize },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON serialization/deserialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Arguments of one atomic update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRuleOptions {
    #[serde(default)]
    pub remove_rule_ids: Vec<u32>,
    #[serde(default)]
    pub add_rules: Vec<CompiledRule>,
}

#[async_trait]
pub trait RuleEngine: Send + Sync {
    async fn get_dynamic_rules(&self) -> Result<Vec<CompiledRule>, EngineError>;

    async fn update_dynamic_rules(&self, options: UpdateRuleOptions) -> Result<(), EngineError>;
}
