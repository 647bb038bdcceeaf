use serde::{Deserialize, Serialize};

/// Priority assigned to every compiled rule
pub const RULE_PRIORITY: u32 = 1;

/// Every resource category the engine knows about, in engine order
pub const ALL_RESOURCE_TYPES: [ResourceType; 15] = [
    ResourceType::MainFrame,
    ResourceType::SubFrame,
    ResourceType::Stylesheet,
    ResourceType::Script,
    ResourceType::Image,
    ResourceType::Font,
    ResourceType::Object,
    ResourceType::XmlHttpRequest,
    ResourceType::Ping,
    ResourceType::CspReport,
    ResourceType::Media,
    ResourceType::WebSocket,
    ResourceType::WebTransport,
    ResourceType::WebBundle,
    ResourceType::Other,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    MainFrame,
    SubFrame,
    Stylesheet,
    Script,
    Image,
    Font,
    Object,
    #[serde(rename = "xmlhttprequest")]
    XmlHttpRequest,
    Ping,
    CspReport,
    Media,
    #[serde(rename = "websocket")]
    WebSocket,
    #[serde(rename = "webtransport")]
    WebTransport,
    #[serde(rename = "webbundle")]
    WebBundle,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderOperation {
    Set,
    Remove,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderModification {
    pub header: String,
    pub operation: HeaderOperation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl HeaderModification {
    pub fn set(header: &str, value: &str) -> Self {
        Self {
            header: header.to_string(),
            operation: HeaderOperation::Set,
            value: Some(value.to_string()),
        }
    }

    pub fn remove(header: &str) -> Self {
        Self {
            header: header.to_string(),
            operation: HeaderOperation::Remove,
            value: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleActionType {
    ModifyHeaders,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    #[serde(rename = "type")]
    pub action_type: RuleActionType,
    #[serde(default)]
    pub request_headers: Vec<HeaderModification>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    pub url_filter: String,
    #[serde(default)]
    pub resource_types: Vec<ResourceType>,
}

/// Declarative request-modification rule in the engine's wire shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompiledRule {
    pub id: u32,
    pub priority: u32,
    pub action: RuleAction,
    pub condition: RuleCondition,
}

impl CompiledRule {
    pub fn modify_headers(
        id: u32,
        url_filter: String,
        request_headers: Vec<HeaderModification>,
    ) -> Self {
        Self {
            id,
            priority: RULE_PRIORITY,
            action: RuleAction {
                action_type: RuleActionType::ModifyHeaders,
                request_headers,
            },
            condition: RuleCondition {
                url_filter,
                resource_types: ALL_RESOURCE_TYPES.to_vec(),
            },
        }
    }

    pub fn url_filter(&self) -> &str {
        &self.condition.url_filter
    }

    pub fn request_headers(&self) -> &[HeaderModification] {
        &self.action.request_headers
    }
}
