//! HTTP agent bridge.
//!
//! Posts `triggerAgentPrompt` requests as JSON to `{endpoint}/triggerAgentPrompt`
//! and decodes the agent's response. Any HTTP or decoding failure is a
//! transport failure.

use async_trait::async_trait;
use promptbar_core::bridge::{AgentBridge, AgentPromptResponse, PromptRequest};
use promptbar_core::error::{Result, ToolbarError};
use reqwest::Client;

const TRIGGER_PATH: &str = "triggerAgentPrompt";

#[derive(Debug, Clone)]
pub struct HttpAgentBridge {
    client: Client,
    endpoint: String,
}

impl HttpAgentBridge {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl AgentBridge for HttpAgentBridge {
    async fn trigger_agent_prompt(&self, request: PromptRequest) -> Result<AgentPromptResponse> {
        let url = format!("{}/{}", self.endpoint, TRIGGER_PATH);
        tracing::debug!(%url, session_id = ?request.session_id, "[HttpAgentBridge] Sending prompt");

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ToolbarError::bridge(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ToolbarError::bridge(format!(
                "Agent bridge error ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<AgentPromptResponse>()
            .await
            .map_err(|e| ToolbarError::bridge(format!("Failed to parse agent response: {}", e)))
    }
}
