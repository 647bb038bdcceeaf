//! On-demand refresh request/response protocol

use super::synchronizer::{RuleSynchronizer, SyncTrigger};
use serde::{Deserialize, Serialize};

/// Action name of the refresh request
pub const UPDATE_RULES_ACTION: &str = "updateRules";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    pub action: String,
}

impl RefreshRequest {
    pub fn update_rules() -> Self {
        Self {
            action: UPDATE_RULES_ACTION.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RefreshResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
        }
    }
}

impl RuleSynchronizer {
    /// Answer a message once the synchronization it asks for has settled.
    ///
    /// Returns `None` for messages this handler does not understand.
    pub async fn handle_message(&self, request: &RefreshRequest) -> Option<RefreshResponse> {
        if request.action != UPDATE_RULES_ACTION {
            tracing::debug!("Ignoring message with action '{}'", request.action);
            return None;
        }

        let response = match self.run(SyncTrigger::OnDemand).await {
            Ok(_) => RefreshResponse::ok(),
            Err(e) => RefreshResponse::failed(e.to_string()),
        };
        Some(response)
    }
}
