use serde::{Deserialize, Deserializer, Serialize};

/// What a header entry does to a matching request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderAction {
    Add,
    Modify,
    Delete,
    /// Any action this version does not know; never compiled into a rule
    #[serde(other)]
    Unknown,
}

impl HeaderAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeaderAction::Add => "add",
            HeaderAction::Modify => "modify",
            HeaderAction::Delete => "delete",
            HeaderAction::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for HeaderAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" => Ok(HeaderAction::Add),
            "modify" => Ok(HeaderAction::Modify),
            "delete" => Ok(HeaderAction::Delete),
            _ => anyhow::bail!("Unknown header action: {}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderRule {
    pub action: HeaderAction,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub value: String,
}

impl HeaderRule {
    pub fn new(action: HeaderAction, name: &str, value: &str) -> Self {
        Self {
            action,
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    pub fn delete(name: &str) -> Self {
        Self::new(HeaderAction::Delete, name, "")
    }
}

/// A named URL pattern plus the header actions applied to matching requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url_pattern: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: Vec<HeaderRule>,
    #[serde(default)]
    pub enabled: bool,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub created_at: i64,
}

// Stored documents may carry `null` where a field is simply absent
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Generate a fresh opaque profile id
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

/// Current time in milliseconds since the Unix epoch
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
