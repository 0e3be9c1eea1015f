//! Host-side collaborators of the prompt lifecycle.
//!
//! These are the pieces of the surrounding application the toolbar core talks to
//! without owning: the clipboard, the analytics sink, the IDE window selection
//! and the page the toolbar is embedded in.

use crate::config::DeliveryMode;
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Write access to the system clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Event emitted when a prompt is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptTriggeredEvent {
    pub session_id: Option<String>,
    pub prompt_text: String,
    pub component_count: usize,
    pub selected_dom_elements_count: usize,
    pub runtime_error: Option<String>,
    pub delivery_mode: DeliveryMode,
    pub at_menu_mode: Option<String>,
}

/// Analytics events the toolbar emits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "eventName", content = "properties", rename_all = "snake_case")]
pub enum AnalyticsEvent {
    AgentPromptTriggered(PromptTriggeredEvent),
}

/// Best-effort analytics sink. Failures never block a submission.
#[async_trait]
pub trait AnalyticsSink: Send + Sync {
    async fn track(&self, event: AnalyticsEvent) -> Result<()>;
}

/// The IDE window/session the toolbar is paired with.
pub trait SessionSelector: Send + Sync {
    /// Id of the selected IDE session, if one is selected.
    fn selected_session_id(&self) -> Option<String>;

    /// Asks the surrounding UI to let the user pick the IDE window again.
    fn request_window_reselection(&self);
}

/// Location of the page the toolbar runs in.
pub trait PageLocation: Send + Sync {
    fn current_url(&self) -> String;
}

/// A page location that never changes.
#[derive(Debug, Clone)]
pub struct StaticPageLocation(pub String);

impl PageLocation for StaticPageLocation {
    fn current_url(&self) -> String {
        self.0.clone()
    }
}
