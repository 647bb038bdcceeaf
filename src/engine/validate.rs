use super::{EngineError, UpdateRuleOptions};
use crate::compiler::{CompiledRule, HeaderOperation};
use std::collections::HashSet;

/// Upper bound on installed dynamic rules
pub const MAX_NUMBER_OF_DYNAMIC_RULES: usize = 30_000;

/// Compute the rule set an update produces, or reject the whole update.
///
/// Removals are applied first, so an update may re-use ids it removes.
pub fn apply_update(
    installed: &[CompiledRule],
    options: &UpdateRuleOptions,
) -> Result<Vec<CompiledRule>, EngineError> {
    let removed: HashSet<u32> = options.remove_rule_ids.iter().copied().collect();
    let mut next: Vec<CompiledRule> = installed
        .iter()
        .filter(|r| !removed.contains(&r.id))
        .cloned()
        .collect();

    let mut ids: HashSet<u32> = next.iter().map(|r| r.id).collect();
    for rule in &options.add_rules {
        validate_rule(rule)?;
        if !ids.insert(rule.id) {
            return Err(EngineError::DuplicateId(rule.id));
        }
    }
    next.extend(options.add_rules.iter().cloned());

    if next.len() > MAX_NUMBER_OF_DYNAMIC_RULES {
        return Err(EngineError::RuleCountExceeded {
            count: next.len(),
            max: MAX_NUMBER_OF_DYNAMIC_RULES,
        });
    }
    Ok(next)
}

fn validate_rule(rule: &CompiledRule) -> Result<(), EngineError> {
    let invalid = |reason: &str| EngineError::InvalidRule {
        id: rule.id,
        reason: reason.to_string(),
    };

    if rule.id == 0 {
        return Err(invalid("Rule id must be positive"));
    }
    if rule.priority == 0 {
        return Err(invalid("Rule priority must be positive"));
    }

    validate_url_filter(rule.url_filter()).map_err(|reason| invalid(&reason))?;

    if rule.request_headers().is_empty() {
        return Err(invalid("A modifyHeaders rule must modify at least one header"));
    }
    for modification in rule.request_headers() {
        if modification.header.is_empty() {
            return Err(invalid("Header name must not be empty"));
        }
        match (modification.operation, &modification.value) {
            (HeaderOperation::Set, None) => {
                return Err(invalid("Header 'set' operation requires a value"))
            }
            (HeaderOperation::Remove, Some(_)) => {
                return Err(invalid("Header 'remove' operation must not carry a value"))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Syntax checks a url filter must pass before it can be installed
pub fn validate_url_filter(filter: &str) -> Result<(), String> {
    if filter.is_empty() {
        return Err("urlFilter must not be empty".to_string());
    }
    if !filter.is_ascii() {
        return Err("urlFilter must only contain ASCII characters".to_string());
    }
    if filter.starts_with("||*") {
        return Err("urlFilter must not start with '||*'".to_string());
    }

    // '|' is only an anchor: '||' or '|' at the start, '|' at the end
    let body = filter
        .strip_prefix("||")
        .or_else(|| filter.strip_prefix('|'))
        .unwrap_or(filter);
    let body = body.strip_suffix('|').unwrap_or(body);
    if body.contains('|') {
        return Err("urlFilter may only use '|' as a start or end anchor".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::HeaderModification;

    fn rule(id: u32, filter: &str) -> CompiledRule {
        CompiledRule::modify_headers(
            id,
            filter.to_string(),
            vec![HeaderModification::set("x-test", "1")],
        )
    }

    #[test]
    fn test_replace_all() {
        let installed = vec![rule(1, "*"), rule(2, "*")];
        let options = UpdateRuleOptions {
            remove_rule_ids: vec![1, 2],
            add_rules: vec![rule(1, "a.com"), rule(2, "b.com"), rule(3, "c.com")],
        };

        let next = apply_update(&installed, &options).unwrap();
        let filters: Vec<&str> = next.iter().map(|r| r.url_filter()).collect();
        assert_eq!(filters, vec!["a.com", "b.com", "c.com"]);
    }

    #[test]
    fn test_duplicate_id_with_kept_rule() {
        let installed = vec![rule(1, "*")];
        let options = UpdateRuleOptions {
            remove_rule_ids: vec![],
            add_rules: vec![rule(1, "a.com")],
        };
        assert!(matches!(
            apply_update(&installed, &options),
            Err(EngineError::DuplicateId(1))
        ));
    }

    #[test]
    fn test_url_filter_syntax() {
        assert!(validate_url_filter("*://*.example.com/*").is_ok());
        assert!(validate_url_filter("||example.com|").is_ok());
        assert!(validate_url_filter("|https://example.com").is_ok());
        assert!(validate_url_filter("").is_err());
        assert!(validate_url_filter("||*.example.com").is_err());
        assert!(validate_url_filter("exa|mple.com").is_err());
        assert!(validate_url_filter("bücher.de").is_err());
    }

    #[test]
    fn test_invalid_rule_rejects_update() {
        let options = UpdateRuleOptions {
            remove_rule_ids: vec![],
            add_rules: vec![rule(1, "a.com"), rule(2, "||*bad")],
        };
        assert!(matches!(
            apply_update(&[], &options),
            Err(EngineError::InvalidRule { id: 2, .. })
        ));
    }

    #[test]
    fn test_zero_id_rejected() {
        let options = UpdateRuleOptions {
            remove_rule_ids: vec![],
            add_rules: vec![rule(0, "a.com")],
        };
        assert!(apply_update(&[], &options).is_err());
    }

    #[test]
    fn test_rule_count_budget() {
        let add_rules: Vec<CompiledRule> = (1..=(MAX_NUMBER_OF_DYNAMIC_RULES as u32 + 1))
            .map(|id| rule(id, "*"))
            .collect();
        let options = UpdateRuleOptions {
            remove_rule_ids: vec![],
            add_rules,
        };
        assert!(matches!(
            apply_update(&[], &options),
            Err(EngineError::RuleCountExceeded { .. })
        ));
    }
}
