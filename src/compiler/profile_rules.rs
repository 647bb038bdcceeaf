use super::compiled_rule::{CompiledRule, HeaderModification};
use super::url_filter::to_url_filter;
use crate::profile::{HeaderAction, Profile};

/// Id given to the first rule of a compilation pass
pub const FIRST_RULE_ID: u32 = 1;

/// Compile one profile into rules, numbering them from `start_id`.
///
/// Returns the rules together with the number of ids consumed. A profile
/// yields at most one rule: every header modification is folded into a single
/// `modifyHeaders` rule, ordered add, then modify, then delete. The grouping
/// order is a convention kept for compatibility; the engine does not need it.
pub fn compile_profile(profile: &Profile, start_id: u32) -> (Vec<CompiledRule>, u32) {
    if profile.headers.is_empty() {
        return (Vec::new(), 0);
    }

    let mut add_headers = Vec::new();
    let mut modify_headers = Vec::new();
    let mut remove_headers = Vec::new();

    for header in profile.headers.iter().filter(|h| !h.name.is_empty()) {
        let name = header.name.to_lowercase();
        match header.action {
            HeaderAction::Add => add_headers.push(HeaderModification::set(&name, &header.value)),
            HeaderAction::Modify => {
                modify_headers.push(HeaderModification::set(&name, &header.value))
            }
            HeaderAction::Delete => remove_headers.push(HeaderModification::remove(&name)),
            HeaderAction::Unknown => {
                tracing::debug!("Skipping header '{}' with unknown action", header.name)
            }
        }
    }

    let mut request_headers = add_headers;
    request_headers.extend(modify_headers);
    request_headers.extend(remove_headers);

    if request_headers.is_empty() {
        return (Vec::new(), 0);
    }

    let url_filter = to_url_filter(Some(&profile.url_pattern));
    let rule = CompiledRule::modify_headers(start_id, url_filter, request_headers);
    (vec![rule], 1)
}

/// Compile every enabled profile, in list order, into one rule set with ids
/// running from 1 without gaps.
pub fn compile_rules(profiles: &[Profile]) -> Vec<CompiledRule> {
    let (_, rules) = profiles.iter().filter(|p| p.enabled).fold(
        (FIRST_RULE_ID, Vec::new()),
        |(next_id, mut rules), profile| {
            let (compiled, consumed) = compile_profile(profile, next_id);
            tracing::debug!(
                "Profile '{}' compiled into {} rule(s) starting at id {}",
                profile.name,
                compiled.len(),
                next_id
            );
            rules.extend(compiled);
            (next_id + consumed, rules)
        },
    );
    rules
}
