use super::{apply_update, EngineError, RuleEngine, UpdateRuleOptions};
use crate::compiler::CompiledRule;
use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

/// Engine keeping installed rules in memory
#[derive(Debug, Default)]
pub struct MemoryRuleEngine {
    rules: RwLock<Vec<CompiledRule>>,
}

impl MemoryRuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rules(rules: Vec<CompiledRule>) -> Self {
        Self {
            rules: RwLock::new(rules),
        }
    }
}

#[async_trait]
impl RuleEngine for MemoryRuleEngine {
    async fn get_dynamic_rules(&self) -> Result<Vec<CompiledRule>, EngineError> {
        Ok(self.rules.read().await.clone())
    }

    async fn update_dynamic_rules(&self, options: UpdateRuleOptions) -> Result<(), EngineError> {
        let mut rules = self.rules.write().await;
        let next = apply_update(&rules, &options)?;
        debug!(
            "Dynamic rules updated: {} removed, {} added, {} installed",
            options.remove_rule_ids.len(),
            options.add_rules.len(),
            next.len()
        );
        *rules = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::HeaderModification;

    #[tokio::test]
    async fn test_failed_update_keeps_rules() {
        let installed = CompiledRule::modify_headers(
            1,
            "*".to_string(),
            vec![HeaderModification::remove("cookie")],
        );
        let engine = MemoryRuleEngine::with_rules(vec![installed.clone()]);

        let bad = CompiledRule::modify_headers(
            1,
            String::new(),
            vec![HeaderModification::remove("cookie")],
        );
        let result = engine
            .update_dynamic_rules(UpdateRuleOptions {
                remove_rule_ids: vec![1],
                add_rules: vec![bad],
            })
            .await;

        assert!(result.is_err());
        assert_eq!(engine.get_dynamic_rules().await.unwrap(), vec![installed]);
    }
}
