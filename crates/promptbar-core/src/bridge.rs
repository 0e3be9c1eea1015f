//! Remote agent bridge contract.
//!
//! The bridge delivers an assembled prompt to the agent running in the IDE. It may
//! be absent entirely (no IDE connected), which callers treat as an error path.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Error code reported when the prompt targeted a different IDE window session.
pub const SESSION_MISMATCH: &str = "session_mismatch";

/// Agent mode requested for a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentMode {
    Agent,
    Ask,
    Manual,
}

/// Request sent through `triggerAgentPrompt`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRequest {
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<AgentMode>,
}

impl PromptRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }
}

/// Logical outcome of a prompt delivery.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPromptResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl AgentPromptResult {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            ..Default::default()
        }
    }

    pub fn failed(error_code: Option<&str>) -> Self {
        Self {
            success: false,
            error_code: error_code.map(str::to_string),
            ..Default::default()
        }
    }

    pub fn is_session_mismatch(&self) -> bool {
        self.error_code.as_deref() == Some(SESSION_MISMATCH)
    }
}

/// Response of `triggerAgentPrompt`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentPromptResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    pub result: AgentPromptResult,
}

impl AgentPromptResponse {
    pub fn new(result: AgentPromptResult) -> Self {
        Self {
            session_id: None,
            result,
        }
    }
}

/// Connection to the agent running in the IDE.
///
/// An `Err` return is a transport failure; a logical rejection is an `Ok` response
/// whose `result.success` is false.
#[async_trait]
pub trait AgentBridge: Send + Sync {
    async fn trigger_agent_prompt(&self, request: PromptRequest) -> Result<AgentPromptResponse>;
}

/// Capabilities the toolbar exposes to plugins during `on_load`.
#[async_trait]
pub trait ToolbarHost: Send + Sync {
    /// Sends a prompt straight to the agent, bypassing prompt assembly.
    ///
    /// Fails with `ToolbarError::BridgeUnavailable` when no bridge is connected.
    async fn send_prompt(&self, request: PromptRequest) -> Result<AgentPromptResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_wire_shape() {
        let request = PromptRequest {
            mode: Some(AgentMode::Ask),
            ..PromptRequest::new("hi").with_session_id(Some("win-1".to_string()))
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"prompt": "hi", "sessionId": "win-1", "mode": "ask"})
        );
    }

    #[test]
    fn test_response_parses_session_mismatch() {
        let response: AgentPromptResponse = serde_json::from_str(
            r#"{"result":{"success":false,"errorCode":"session_mismatch"}}"#,
        )
        .unwrap();
        assert!(!response.result.success);
        assert!(response.result.is_session_mismatch());
    }
}
