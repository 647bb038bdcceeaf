use crate::compiler::compile_rules;
use crate::engine::{EngineError, RuleEngine, UpdateRuleOptions};
use crate::profile::{ProfileError, ProfileRepository};
use std::sync::Arc;
use thiserror::Error;
use tracing::{error, info};

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Failed to read profiles: {0}")]
    Profiles(#[from] ProfileError),
    #[error("Rule engine error: {0}")]
    Engine(#[from] EngineError),
}

/// What started a synchronization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncTrigger {
    /// Installation or startup
    Install,
    /// The stored profile list changed
    StorageChange,
    /// Explicit refresh request; errors go back to the caller
    OnDemand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub removed: usize,
    pub added: usize,
}

/// Keeps the engine's installed rules in line with the enabled profiles
#[derive(Clone)]
pub struct RuleSynchronizer {
    repository: ProfileRepository,
    engine: Arc<dyn RuleEngine>,
}

impl std::fmt::Debug for RuleSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSynchronizer")
            .field("repository", &self.repository)
            .field("engine", &"<engine>")
            .finish()
    }
}

impl RuleSynchronizer {
    pub fn new(repository: ProfileRepository, engine: Arc<dyn RuleEngine>) -> Self {
        Self { repository, engine }
    }

    pub fn repository(&self) -> &ProfileRepository {
        &self.repository
    }

    pub fn engine(&self) -> &Arc<dyn RuleEngine> {
        &self.engine
    }

    /// Replace every installed rule with a fresh compilation of the enabled
    /// profiles.
    ///
    /// Ids restart at 1 on every run; old ids are all removed in the same
    /// atomic update, so they never need to match.
    pub async fn synchronize(&self) -> Result<SyncReport, SyncError> {
        let profiles = self.repository.load().await?;
        let enabled = profiles.iter().filter(|p| p.enabled).count();

        let existing_ids: Vec<u32> = self
            .engine
            .get_dynamic_rules()
            .await?
            .iter()
            .map(|r| r.id)
            .collect();

        let new_rules = compile_rules(&profiles);
        let report = SyncReport {
            removed: existing_ids.len(),
            added: new_rules.len(),
        };

        self.engine
            .update_dynamic_rules(UpdateRuleOptions {
                remove_rule_ids: existing_ids,
                add_rules: new_rules,
            })
            .await?;

        info!(
            "Updated rules: {} rules added from {} enabled profile(s), {} removed",
            report.added, enabled, report.removed
        );
        Ok(report)
    }

    /// Run a synchronization for `trigger`.
    ///
    /// Failures are always logged. Automatic triggers swallow them since the
    /// next run recomputes everything; on-demand runs return them.
    pub async fn run(&self, trigger: SyncTrigger) -> Result<Option<SyncReport>, SyncError> {
        match self.synchronize().await {
            Ok(report) => Ok(Some(report)),
            Err(e) => {
                error!("Error updating rules ({:?}): {}", trigger, e);
                match trigger {
                    SyncTrigger::OnDemand => Err(e),
                    SyncTrigger::Install | SyncTrigger::StorageChange => Ok(None),
                }
            }
        }
    }
}
