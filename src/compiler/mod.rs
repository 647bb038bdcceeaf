//! Profile to declarative rule compilation

pub mod compiled_rule;
pub mod profile_rules;
pub mod url_filter;

pub use compiled_rule::{
    CompiledRule, HeaderModification, HeaderOperation, ResourceType, RuleAction, RuleActionType,
    RuleCondition, ALL_RESOURCE_TYPES,
};
pub use profile_rules::{compile_profile, compile_rules};
pub use url_filter::to_url_filter;
