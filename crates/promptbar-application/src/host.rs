//! Host plumbing shared by the controller and the plugins.
//!
//! - [`BridgeSlot`]: the currently connected agent bridge, swappable at runtime
//! - [`BridgeHost`]: the [`ToolbarHost`] handed to plugins on load
//! - [`WindowSelection`]: in-process IDE window selection

use async_trait::async_trait;
use promptbar_core::bridge::{AgentBridge, AgentPromptResponse, PromptRequest, ToolbarHost};
use promptbar_core::error::{Result, ToolbarError};
use promptbar_core::host::SessionSelector;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::watch;

/// Holds the agent bridge, if one is connected.
#[derive(Default)]
pub struct BridgeSlot {
    bridge: RwLock<Option<Arc<dyn AgentBridge>>>,
}

impl BridgeSlot {
    pub fn new(bridge: Option<Arc<dyn AgentBridge>>) -> Self {
        Self {
            bridge: RwLock::new(bridge),
        }
    }

    pub fn connect(&self, bridge: Arc<dyn AgentBridge>) {
        *self.bridge.write().unwrap_or_else(PoisonError::into_inner) = Some(bridge);
        tracing::info!("[BridgeSlot] Agent bridge connected");
    }

    pub fn disconnect(&self) {
        let previous = self
            .bridge
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if previous.is_some() {
            tracing::info!("[BridgeSlot] Agent bridge disconnected");
        }
    }

    pub fn current(&self) -> Option<Arc<dyn AgentBridge>> {
        self.bridge
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_connected(&self) -> bool {
        self.current().is_some()
    }
}

/// The host capability given to plugins: sends a prompt straight to the agent.
pub struct BridgeHost {
    bridge: Arc<BridgeSlot>,
    selector: Arc<dyn SessionSelector>,
}

impl BridgeHost {
    pub fn new(bridge: Arc<BridgeSlot>, selector: Arc<dyn SessionSelector>) -> Self {
        Self { bridge, selector }
    }
}

#[async_trait]
impl ToolbarHost for BridgeHost {
    async fn send_prompt(&self, request: PromptRequest) -> Result<AgentPromptResponse> {
        let bridge = self.bridge.current().ok_or(ToolbarError::BridgeUnavailable)?;
        let request = if request.session_id.is_none() {
            request.with_session_id(self.selector.selected_session_id())
        } else {
            request
        };
        bridge.trigger_agent_prompt(request).await
    }
}

/// IDE window selection kept in memory.
///
/// Reselection requests bump a counter that UI code can watch.
pub struct WindowSelection {
    selected: RwLock<Option<String>>,
    reselections: watch::Sender<u64>,
}

impl WindowSelection {
    pub fn new(selected: Option<String>) -> Self {
        let (reselections, _) = watch::channel(0);
        Self {
            selected: RwLock::new(selected),
            reselections,
        }
    }

    pub fn select(&self, session_id: Option<String>) {
        *self.selected.write().unwrap_or_else(PoisonError::into_inner) = session_id;
    }

    /// Number of reselection requests so far.
    pub fn reselection_requests(&self) -> u64 {
        *self.reselections.borrow()
    }

    pub fn subscribe_reselections(&self) -> watch::Receiver<u64> {
        self.reselections.subscribe()
    }
}

impl Default for WindowSelection {
    fn default() -> Self {
        Self::new(None)
    }
}

impl SessionSelector for WindowSelection {
    fn selected_session_id(&self) -> Option<String> {
        self.selected
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn request_window_reselection(&self) {
        self.reselections.send_modify(|count| *count += 1);
        tracing::info!("[WindowSelection] Window reselection requested");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbar_core::bridge::AgentPromptResult;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingBridge {
        requests: Mutex<Vec<PromptRequest>>,
    }

    #[async_trait]
    impl AgentBridge for RecordingBridge {
        async fn trigger_agent_prompt(&self, request: PromptRequest) -> Result<AgentPromptResponse> {
            self.requests.lock().unwrap().push(request);
            Ok(AgentPromptResponse::new(AgentPromptResult::succeeded()))
        }
    }

    #[tokio::test]
    async fn test_host_without_bridge_is_unavailable() {
        let host = BridgeHost::new(Arc::new(BridgeSlot::default()), Arc::new(WindowSelection::default()));
        let err = host.send_prompt(PromptRequest::new("hi")).await.unwrap_err();
        assert!(matches!(err, ToolbarError::BridgeUnavailable));
    }

    #[tokio::test]
    async fn test_host_fills_selected_session() {
        let bridge = Arc::new(RecordingBridge::default());
        let slot = Arc::new(BridgeSlot::new(Some(bridge.clone())));
        let selection = Arc::new(WindowSelection::new(Some("ide-1".to_string())));
        let host = BridgeHost::new(slot.clone(), selection);

        host.send_prompt(PromptRequest::new("hi")).await.unwrap();
        host.send_prompt(PromptRequest::new("yo").with_session_id(Some("ide-2".to_string())))
            .await
            .unwrap();

        let requests = bridge.requests.lock().unwrap();
        assert_eq!(requests[0].session_id.as_deref(), Some("ide-1"));
        assert_eq!(requests[1].session_id.as_deref(), Some("ide-2"));

        slot.disconnect();
        assert!(!slot.is_connected());
    }

    #[test]
    fn test_reselection_requests_are_counted() {
        let selection = WindowSelection::default();
        let receiver = selection.subscribe_reselections();
        selection.request_window_reselection();
        selection.request_window_reselection();
        assert_eq!(selection.reselection_requests(), 2);
        assert_eq!(*receiver.borrow(), 2);
    }
}
