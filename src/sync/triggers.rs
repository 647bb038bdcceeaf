use super::synchronizer::{RuleSynchronizer, SyncTrigger};
use crate::profile::PROFILES_KEY;
use crate::storage::StorageChange;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;

/// Automatic synchronization triggers: startup and profile-list changes
pub struct Triggers {
    pub synchronizer: RuleSynchronizer,
}

impl Triggers {
    pub fn new(synchronizer: RuleSynchronizer) -> Self {
        Self { synchronizer }
    }

    /// Startup synchronization; errors are logged only
    pub async fn on_install(&self) {
        tracing::info!("Synchronizing rules on startup");
        let _ = self.synchronizer.run(SyncTrigger::Install).await;
    }

    /// Start listening for profile-list changes, then run the startup sync.
    ///
    /// The listener subscribes first so a change made while the startup sync
    /// runs still triggers another one.
    pub async fn start(&self) -> JoinHandle<()> {
        let handle = self.spawn_change_listener();
        self.on_install().await;
        handle
    }

    /// Listen for changes of the profile list and resynchronize on each one.
    ///
    /// Runs are sequential: a change arriving while a run is in flight is
    /// handled by the next run, which reads the latest state anyway.
    pub fn spawn_change_listener(&self) -> JoinHandle<()> {
        let changes = self.synchronizer.repository().store().subscribe();
        self.spawn_listener(changes)
    }

    fn spawn_listener(&self, mut changes: broadcast::Receiver<StorageChange>) -> JoinHandle<()> {
        let synchronizer = self.synchronizer.clone();
        let namespace = synchronizer.repository().store().namespace().to_string();

        tokio::spawn(async move {
            tracing::debug!("Listening for '{}' changes in '{}'", PROFILES_KEY, namespace);
            loop {
                match changes.recv().await {
                    Ok(change) if change.touches(&namespace, PROFILES_KEY) => {
                        tracing::info!("Profiles changed, updating rules");
                        let _ = synchronizer.run(SyncTrigger::StorageChange).await;
                    }
                    Ok(change) => {
                        tracing::trace!("Ignoring storage change: {:?}", change);
                    }
                    Err(RecvError::Lagged(missed)) => {
                        tracing::warn!("Missed {} storage change(s), updating rules", missed);
                        let _ = synchronizer.run(SyncTrigger::StorageChange).await;
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Storage change channel closed");
                        break;
                    }
                }
            }
        })
    }
}
