//! Prompt lifecycle controller.
//!
//! Drives one submission from the prompt box to the agent:
//!
//! 1. Reject empty text and submissions while another one is loading
//! 2. Enter `loading`, log the user message and reveal the chat area
//! 3. Collect plugin context (settle-all)
//! 4. Render the final prompt and hand it to the transmit hooks
//! 5. Copy and/or send it depending on the delivery preference
//! 6. Show `success` or `error` for a fixed window, clean up, return to `idle`
//!
//! Every step after an await checks the submission ticket, so a reset or a newer
//! submission makes the remaining work of this one a no-op.

use crate::host::BridgeSlot;
use crate::mode_coordinator::ModeCoordinator;
use crate::plugin_registry::PluginRegistry;
use promptbar_core::bridge::PromptRequest;
use promptbar_core::config::{DeliveryMode, PreferenceProvider, Timeouts, Timings};
use promptbar_core::error::{Result, ToolbarError};
use promptbar_core::host::{
    AnalyticsEvent, AnalyticsSink, Clipboard, PageLocation, PromptTriggeredEvent, SessionSelector,
};
use promptbar_core::lifecycle::{PromptLifecycle, PromptState, SubmissionTicket};
use promptbar_core::mode::Action;
use promptbar_core::plugin::PromptSendPayload;
use promptbar_core::prompt::{PromptAssembly, PromptRenderer};
use promptbar_core::session::{ChatSessionStore, Message, SessionId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

/// A prompt submitted from the prompt box or by a plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub session_id: SessionId,
    pub text: String,
    pub at_menu_mode: Option<String>,
    pub sent_by_plugin: bool,
}

impl Submission {
    pub fn new(session_id: impl Into<SessionId>, text: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            text: text.into(),
            at_menu_mode: None,
            sent_by_plugin: false,
        }
    }

    pub fn with_at_menu_mode(mut self, mode: impl Into<String>) -> Self {
        self.at_menu_mode = Some(mode.into());
        self
    }

    pub fn sent_by_plugin(mut self) -> Self {
        self.sent_by_plugin = true;
        self
    }
}

/// External services the controller talks to.
pub struct PromptCollaborators {
    pub renderer: Arc<dyn PromptRenderer>,
    pub preferences: Arc<dyn PreferenceProvider>,
    pub session_selector: Arc<dyn SessionSelector>,
    pub page: Arc<dyn PageLocation>,
    pub clipboard: Option<Arc<dyn Clipboard>>,
    pub analytics: Option<Arc<dyn AnalyticsSink>>,
}

/// How delivery of a rendered prompt ended.
#[derive(Debug)]
enum Delivery {
    Delivered,
    Rejected { session_mismatch: bool },
    Failed(ToolbarError),
    NoBridge,
}

pub struct PromptLifecycleController {
    lifecycle: Arc<PromptLifecycle>,
    store: Arc<RwLock<ChatSessionStore>>,
    plugins: Arc<PluginRegistry>,
    coordinator: Arc<ModeCoordinator>,
    bridge: Arc<BridgeSlot>,
    collaborators: PromptCollaborators,
    timings: Timings,
    timeouts: Timeouts,
}

impl PromptLifecycleController {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lifecycle: Arc<PromptLifecycle>,
        store: Arc<RwLock<ChatSessionStore>>,
        plugins: Arc<PluginRegistry>,
        coordinator: Arc<ModeCoordinator>,
        bridge: Arc<BridgeSlot>,
        collaborators: PromptCollaborators,
        timings: Timings,
        timeouts: Timeouts,
    ) -> Self {
        Self {
            lifecycle,
            store,
            plugins,
            coordinator,
            bridge,
            collaborators,
            timings,
            timeouts,
        }
    }

    pub fn state(&self) -> PromptState {
        self.lifecycle.state()
    }

    /// Submits a prompt.
    ///
    /// Returns once the outcome is known and its display window is scheduled.
    /// Never fails: outcomes are visible through the lifecycle state and the
    /// session store.
    pub async fn submit(&self, submission: Submission) {
        if submission.text.trim().is_empty() {
            tracing::debug!("[PromptController] Ignoring empty prompt");
            return;
        }
        let Some(ticket) = self.lifecycle.try_begin() else {
            return;
        };

        tracing::info!(
            target: "promptbar::lifecycle",
            generation = ticket.generation(),
            session_id = %submission.session_id,
            sent_by_plugin = submission.sent_by_plugin,
            "[PromptController] Submission started"
        );

        let session = {
            let mut store = self.store.write().await;
            store.append_message(&submission.session_id, Message::user(submission.text.clone()));
            store.set_draft_input(&submission.session_id, submission.text.clone());
            store.session(&submission.session_id).cloned()
        };
        self.coordinator.reveal_chat_area().await;

        let (dom_elements, selected_components, runtime_error) = session
            .map(|s| (s.context_elements(), s.selected_components, s.last_runtime_error))
            .unwrap_or_default();

        let payload = PromptSendPayload {
            id: uuid::Uuid::new_v4().to_string(),
            text: submission.text.clone(),
            context_elements: dom_elements.clone(),
            sent_by_plugin: submission.sent_by_plugin,
        };
        let plugin_snippets = self.plugins.collect_context(&payload).await;
        if !self.lifecycle.is_current(&ticket) {
            tracing::debug!("[PromptController] Submission superseded during context collection");
            return;
        }

        let delivery_mode = self.collaborators.preferences.delivery_mode();
        let event = PromptTriggeredEvent {
            session_id: self.collaborators.session_selector.selected_session_id(),
            prompt_text: submission.text.clone(),
            component_count: selected_components.len(),
            selected_dom_elements_count: dom_elements.len(),
            runtime_error: runtime_error.as_ref().map(|e| e.message.clone()),
            delivery_mode,
            at_menu_mode: submission.at_menu_mode.clone(),
        };
        self.track(AnalyticsEvent::AgentPromptTriggered(event)).await;

        let assembly = PromptAssembly {
            dom_elements,
            text: submission.text.clone(),
            url: self.collaborators.page.current_url(),
            plugin_snippets,
            selected_components,
            runtime_error,
        };
        let outcome = self.deliver(&assembly, delivery_mode).await;

        if !self.lifecycle.is_current(&ticket) {
            tracing::debug!("[PromptController] Submission superseded before completion");
            return;
        }
        match outcome {
            Delivery::Delivered => self.succeed(ticket, submission.session_id),
            Delivery::Rejected { session_mismatch } => {
                tracing::warn!(session_mismatch, "[PromptController] Agent rejected the prompt");
                if session_mismatch {
                    self.collaborators.session_selector.request_window_reselection();
                }
                self.fail(ticket, submission.session_id);
            }
            Delivery::Failed(e) => {
                tracing::error!(error = %e, "[PromptController] Prompt delivery failed");
                self.fail(ticket, submission.session_id);
            }
            Delivery::NoBridge => {
                tracing::warn!("[PromptController] No agent bridge connected");
                self.collaborators.session_selector.request_window_reselection();
                self.fail(ticket, submission.session_id);
            }
        }
    }

    /// Forces the lifecycle back to `idle`, discarding pending cleanup.
    pub fn reset_prompt_state(&self) {
        self.lifecycle.reset();
    }

    async fn track(&self, event: AnalyticsEvent) {
        let Some(analytics) = &self.collaborators.analytics else {
            return;
        };
        if let Err(e) = analytics.track(event).await {
            tracing::warn!(error = %e, "[PromptController] Analytics event dropped");
        }
    }

    async fn deliver(&self, assembly: &PromptAssembly, mode: DeliveryMode) -> Delivery {
        // Every delivery mode needs a connected agent window.
        let Some(bridge) = self.bridge.current() else {
            return Delivery::NoBridge;
        };
        let prompt = match self.collaborators.renderer.assemble(assembly).await {
            Ok(prompt) => prompt,
            Err(e) => return Delivery::Failed(e),
        };

        let plugins = self.plugins.clone();
        let transmitted = prompt.clone();
        tokio::spawn(async move { plugins.notify_transmit(&transmitted).await });

        if mode.copies() {
            if let Err(e) = self.copy_to_clipboard(&prompt).await {
                tracing::warn!(error = %e, "[PromptController] Copy to clipboard failed");
            }
        }
        if !mode.sends() {
            return Delivery::Delivered;
        }

        let request = PromptRequest::new(prompt)
            .with_session_id(self.collaborators.session_selector.selected_session_id());
        let call = bridge.trigger_agent_prompt(request);
        let response = match self.timeouts.bridge_call() {
            Some(limit) => tokio::time::timeout(limit, call).await.unwrap_or_else(|_| {
                Err(ToolbarError::bridge(format!("agent call timed out after {limit:?}")))
            }),
            None => call.await,
        };

        match response {
            Ok(response) if response.result.success => Delivery::Delivered,
            Ok(response) => Delivery::Rejected {
                session_mismatch: response.result.is_session_mismatch(),
            },
            Err(e) => Delivery::Failed(e),
        }
    }

    async fn copy_to_clipboard(&self, prompt: &str) -> Result<()> {
        match &self.collaborators.clipboard {
            Some(clipboard) => clipboard.write_text(prompt).await,
            None => Err(ToolbarError::clipboard("no clipboard available")),
        }
    }

    fn succeed(&self, ticket: SubmissionTicket, session_id: SessionId) {
        if !self.lifecycle.transition(&ticket, PromptState::Success) {
            return;
        }
        let lifecycle = self.lifecycle.clone();
        let store = self.store.clone();
        let coordinator = self.coordinator.clone();
        let timings = self.timings;

        tokio::spawn(async move {
            if !sleep_unless_cancelled(ticket.token(), timings.success_display()).await {
                return;
            }
            store.write().await.clear_prompt_inputs(&session_id);
            coordinator.dispatch(Action::StopDomSelector).await;

            if !sleep_unless_cancelled(ticket.token(), timings.success_reset()).await {
                return;
            }
            lifecycle.transition(&ticket, PromptState::Idle);
        });
    }

    fn fail(&self, ticket: SubmissionTicket, session_id: SessionId) {
        if !self.lifecycle.transition(&ticket, PromptState::Error) {
            return;
        }
        let lifecycle = self.lifecycle.clone();
        let store = self.store.clone();
        let coordinator = self.coordinator.clone();
        let timings = self.timings;

        tokio::spawn(async move {
            if !sleep_unless_cancelled(ticket.token(), timings.error_display()).await {
                return;
            }
            store.write().await.clear_prompt_inputs(&session_id);
            if lifecycle.transition(&ticket, PromptState::Idle) {
                coordinator.dispatch(Action::StopPromptCreation).await;
            }
        });
    }
}

/// Sleeps for `duration`. Returns `false` if `token` was cancelled first.
async fn sleep_unless_cancelled(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => false,
        _ = tokio::time::sleep(duration) => true,
    }
}
