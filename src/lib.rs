pub mod cli;
pub mod compiler;
pub mod config;
pub mod engine;
pub mod profile;
pub mod storage;
pub mod sync;
pub mod web_server;

// Public API
pub use compiler::{compile_profile, compile_rules, to_url_filter, CompiledRule};
pub use engine::{FileRuleEngine, MemoryRuleEngine, RuleEngine, UpdateRuleOptions};
pub use profile::{HeaderAction, HeaderRule, Profile, ProfileDraft, ProfileRepository};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore, StorageChange};
pub use sync::{RefreshRequest, RefreshResponse, RuleSynchronizer, SyncTrigger, Triggers};
