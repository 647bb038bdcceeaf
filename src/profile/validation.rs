use super::types::{HeaderAction, HeaderRule};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please enter a profile name")]
    EmptyName,
    #[error("Please enter a URL pattern")]
    EmptyUrlPattern,
    #[error("Please enter a header name or remove empty header fields")]
    EmptyHeaderName,
    #[error("Please enter a value for header '{0}' or remove the field")]
    EmptyHeaderValue(String),
    #[error("Please add at least one header")]
    NoHeaders,
}

/// User input for creating or editing a profile
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub url_pattern: String,
    pub headers: Vec<HeaderRule>,
}

impl ProfileDraft {
    pub fn new(name: &str, url_pattern: &str, headers: Vec<HeaderRule>) -> Self {
        Self {
            name: name.to_string(),
            url_pattern: url_pattern.to_string(),
            headers,
        }
    }

    /// Trim every field and check it, returning the cleaned draft.
    ///
    /// Delete actions carry no value, so any value given for them is dropped.
    pub fn validate(&self) -> Result<ProfileDraft, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let url_pattern = self.url_pattern.trim();
        if url_pattern.is_empty() {
            return Err(ValidationError::EmptyUrlPattern);
        }

        let mut headers = Vec::with_capacity(self.headers.len());
        for header in &self.headers {
            let header_name = header.name.trim();
            if header_name.is_empty() {
                return Err(ValidationError::EmptyHeaderName);
            }

            let value = match header.action {
                HeaderAction::Delete => "",
                _ => header.value.trim(),
            };
            if header.action != HeaderAction::Delete && value.is_empty() {
                return Err(ValidationError::EmptyHeaderValue(header_name.to_string()));
            }

            headers.push(HeaderRule::new(header.action, header_name, value));
        }

        if headers.is_empty() {
            return Err(ValidationError::NoHeaders);
        }

        Ok(ProfileDraft::new(name, url_pattern, headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(name: &str, value: &str) -> HeaderRule {
        HeaderRule::new(HeaderAction::Add, name, value)
    }

    #[test]
    fn test_valid_draft_is_trimmed() {
        let draft = ProfileDraft::new(
            "  Dev  ",
            " example.com ",
            vec![add(" X-Env ", " dev "), HeaderRule::new(HeaderAction::Delete, "Cookie", "x")],
        );

        let clean = draft.validate().unwrap();
        assert_eq!(clean.name, "Dev");
        assert_eq!(clean.url_pattern, "example.com");
        assert_eq!(clean.headers[0], add("X-Env", "dev"));
        assert_eq!(clean.headers[1], HeaderRule::delete("Cookie"));
    }

    #[test]
    fn test_rejections() {
        let cases = vec![
            (ProfileDraft::new(" ", "a.com", vec![add("X", "1")]), ValidationError::EmptyName),
            (ProfileDraft::new("n", "", vec![add("X", "1")]), ValidationError::EmptyUrlPattern),
            (
                ProfileDraft::new("n", "a.com", vec![add("  ", "1")]),
                ValidationError::EmptyHeaderName,
            ),
            (
                ProfileDraft::new("n", "a.com", vec![add("X", " ")]),
                ValidationError::EmptyHeaderValue("X".to_string()),
            ),
            (ProfileDraft::new("n", "a.com", vec![]), ValidationError::NoHeaders),
        ];

        for (draft, expected) in cases {
            assert_eq!(draft.validate().unwrap_err(), expected);
        }
    }

    #[test]
    fn test_delete_needs_no_value() {
        let draft = ProfileDraft::new("n", "a.com", vec![HeaderRule::delete("Cookie")]);
        assert!(draft.validate().is_ok());
    }
}
