pub mod message;
pub mod synchronizer;
pub mod triggers;

pub use message::{RefreshRequest, RefreshResponse, UPDATE_RULES_ACTION};
pub use synchronizer::{RuleSynchronizer, SyncError, SyncReport, SyncTrigger};
pub use triggers::Triggers;
