/// Translate a user-entered URL pattern into an engine url filter.
///
/// Rules are tried in order and the first match wins:
/// 1. empty or absent pattern matches everything (`*`)
/// 2. patterns already carrying `*` or the `||` domain anchor pass through
/// 3. bare domains (no `/`) match any scheme, subdomain and path
/// 4. `http://` and `https://` prefixes get a trailing wildcard
/// 5. anything else becomes a substring match
///
/// No validation happens here; malformed filters are rejected by the engine
/// when the rules are installed.
pub fn to_url_filter(pattern: Option<&str>) -> String {
    let pattern = match pattern {
        Some(p) if !p.is_empty() => p,
        _ => return "*".to_string(),
    };

    if pattern.contains('*') || pattern.starts_with("||") {
        return pattern.to_string();
    }

    if !pattern.contains('/') {
        return format!("*://*.{}/*", pattern);
    }

    if pattern.starts_with("http://") || pattern.starts_with("https://") {
        return format!("{}*", pattern);
    }

    format!("*://*{}*", pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pattern_matches_everything() {
        assert_eq!(to_url_filter(None), "*");
        assert_eq!(to_url_filter(Some("")), "*");
    }

    #[test]
    fn test_existing_filters_pass_through() {
        for pattern in ["*://api.example.com/*", "||example.com", "||example.com/api", "example*"] {
            assert_eq!(to_url_filter(Some(pattern)), pattern);
        }
    }

    #[test]
    fn test_bare_domain() {
        assert_eq!(to_url_filter(Some("example.com")), "*://*.example.com/*");
        assert_eq!(to_url_filter(Some("localhost:3000")), "*://*.localhost:3000/*");
    }

    #[test]
    fn test_url_prefix() {
        assert_eq!(
            to_url_filter(Some("https://example.com/path")),
            "https://example.com/path*"
        );
        assert_eq!(
            to_url_filter(Some("http://example.com/")),
            "http://example.com/*"
        );
    }

    #[test]
    fn test_path_without_scheme() {
        assert_eq!(
            to_url_filter(Some("example.com/path")),
            "*://*example.com/path*"
        );
    }

    #[test]
    fn test_wildcard_checked_before_domain_rule() {
        // Contains no slash but already has a wildcard
        assert_eq!(to_url_filter(Some("*.example.com")), "*.example.com");
    }
}
