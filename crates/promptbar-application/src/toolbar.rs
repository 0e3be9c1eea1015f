//! Toolbar facade.
//!
//! Wires the session store, lifecycle, plugins, mode coordinator, hotkey
//! listener and prompt controller together behind one handle. UI surfaces (the
//! CLI, a webview bridge) talk to this type only.

use crate::host::{BridgeHost, BridgeSlot, WindowSelection};
use crate::hotkey_listener::HotkeyListener;
use crate::mode_coordinator::ModeCoordinator;
use crate::plugin_registry::PluginRegistry;
use crate::prompt_controller::{PromptCollaborators, PromptLifecycleController, Submission};
use promptbar_core::bridge::AgentBridge;
use promptbar_core::config::{PreferenceProvider, ToolbarConfig};
use promptbar_core::error::{Result, ToolbarError};
use promptbar_core::host::{AnalyticsSink, Clipboard, PageLocation, SessionSelector, StaticPageLocation};
use promptbar_core::hotkey::KeyEvent;
use promptbar_core::lifecycle::{PromptLifecycle, PromptState};
use promptbar_core::mode::{Action, UiMode};
use promptbar_core::plugin::ToolbarPlugin;
use promptbar_core::prompt::PromptRenderer;
use promptbar_core::session::{
    ChatSession, ChatSessionStore, DomContextElement, ElementRef, RuntimeError, SelectedComponent,
    SessionId,
};
use std::sync::Arc;
use tokio::sync::{RwLock, watch};

/// Builder for [`Toolbar`].
pub struct ToolbarBuilder {
    config: ToolbarConfig,
    renderer: Arc<dyn PromptRenderer>,
    plugins: Vec<Arc<dyn ToolbarPlugin>>,
    bridge: Option<Arc<dyn AgentBridge>>,
    preferences: Option<Arc<dyn PreferenceProvider>>,
    session_selector: Option<Arc<dyn SessionSelector>>,
    page: Option<Arc<dyn PageLocation>>,
    clipboard: Option<Arc<dyn Clipboard>>,
    analytics: Option<Arc<dyn AnalyticsSink>>,
    initial_mode: UiMode,
}

impl ToolbarBuilder {
    pub fn new(config: ToolbarConfig, renderer: Arc<dyn PromptRenderer>) -> Self {
        Self {
            config,
            renderer,
            plugins: Vec::new(),
            bridge: None,
            preferences: None,
            session_selector: None,
            page: None,
            clipboard: None,
            analytics: None,
            initial_mode: UiMode::default(),
        }
    }

    pub fn plugin(mut self, plugin: Arc<dyn ToolbarPlugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn bridge(mut self, bridge: Arc<dyn AgentBridge>) -> Self {
        self.bridge = Some(bridge);
        self
    }

    /// Overrides the delivery preference. Defaults to the config's own setting.
    pub fn preferences(mut self, preferences: Arc<dyn PreferenceProvider>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    pub fn session_selector(mut self, selector: Arc<dyn SessionSelector>) -> Self {
        self.session_selector = Some(selector);
        self
    }

    pub fn page(mut self, page: Arc<dyn PageLocation>) -> Self {
        self.page = Some(page);
        self
    }

    pub fn clipboard(mut self, clipboard: Arc<dyn Clipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn analytics(mut self, analytics: Arc<dyn AnalyticsSink>) -> Self {
        self.analytics = Some(analytics);
        self
    }

    pub fn initial_mode(mut self, mode: UiMode) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn build(self) -> Toolbar {
        let config = self.config;
        let store = Arc::new(RwLock::new(ChatSessionStore::new()));
        let lifecycle = Arc::new(PromptLifecycle::new());
        let plugins = Arc::new(
            PluginRegistry::new(self.plugins)
                .with_context_timeout(config.timeouts.context_collection()),
        );
        let coordinator = Arc::new(ModeCoordinator::new(
            self.initial_mode,
            store.clone(),
            lifecycle.clone(),
            plugins.clone(),
        ));
        let hotkeys = HotkeyListener::new(coordinator.clone(), config.timings.hotkey_settle());
        let bridge = Arc::new(BridgeSlot::new(self.bridge));
        let session_selector = self
            .session_selector
            .unwrap_or_else(|| Arc::new(WindowSelection::default()));
        let preferences = self
            .preferences
            .unwrap_or_else(|| Arc::new(config.clone()));
        let page = self
            .page
            .unwrap_or_else(|| Arc::new(StaticPageLocation(config.page_url.clone())));

        let controller = Arc::new(PromptLifecycleController::new(
            lifecycle.clone(),
            store.clone(),
            plugins.clone(),
            coordinator.clone(),
            bridge.clone(),
            PromptCollaborators {
                renderer: self.renderer,
                preferences,
                session_selector: session_selector.clone(),
                page,
                clipboard: self.clipboard,
                analytics: self.analytics,
            },
            config.timings,
            config.timeouts,
        ));

        Toolbar {
            store,
            lifecycle,
            plugins,
            coordinator,
            hotkeys,
            controller,
            bridge,
            session_selector,
        }
    }
}

/// Handle to a running toolbar.
pub struct Toolbar {
    store: Arc<RwLock<ChatSessionStore>>,
    lifecycle: Arc<PromptLifecycle>,
    plugins: Arc<PluginRegistry>,
    coordinator: Arc<ModeCoordinator>,
    hotkeys: HotkeyListener,
    controller: Arc<PromptLifecycleController>,
    bridge: Arc<BridgeSlot>,
    session_selector: Arc<dyn SessionSelector>,
}

impl Toolbar {
    pub fn builder(config: ToolbarConfig, renderer: Arc<dyn PromptRenderer>) -> ToolbarBuilder {
        ToolbarBuilder::new(config, renderer)
    }

    /// Runs the plugins' load hooks. Only the first call has any effect.
    pub async fn load_plugins(&self) -> Result<()> {
        let host = Arc::new(BridgeHost::new(
            self.bridge.clone(),
            self.session_selector.clone(),
        ));
        self.plugins.notify_loaded(host).await
    }

    pub fn connect_bridge(&self, bridge: Arc<dyn AgentBridge>) {
        self.bridge.connect(bridge);
    }

    pub fn disconnect_bridge(&self) {
        self.bridge.disconnect();
    }

    // ---- Prompt lifecycle ----

    /// Submits `text` for the current session and waits for the outcome.
    pub async fn submit(&self, text: impl Into<String>) {
        let session_id = self.current_session_id().await;
        self.controller
            .submit(Submission::new(session_id, text))
            .await;
    }

    pub async fn submit_to(&self, submission: Submission) {
        self.controller.submit(submission).await;
    }

    /// Submits without waiting for the outcome.
    pub fn submit_detached(&self, submission: Submission) -> tokio::task::JoinHandle<()> {
        let controller = self.controller.clone();
        tokio::spawn(async move { controller.submit(submission).await })
    }

    pub fn prompt_state(&self) -> PromptState {
        self.lifecycle.state()
    }

    pub fn subscribe_prompt_state(&self) -> watch::Receiver<PromptState> {
        self.lifecycle.subscribe()
    }

    pub fn reset_prompt_state(&self) {
        self.controller.reset_prompt_state();
    }

    // ---- Modes and hotkeys ----

    pub fn mode(&self) -> UiMode {
        self.coordinator.mode()
    }

    pub fn subscribe_mode(&self) -> watch::Receiver<UiMode> {
        self.coordinator.subscribe()
    }

    pub async fn dispatch(&self, action: Action) -> UiMode {
        self.coordinator.dispatch(action).await
    }

    /// Returns `true` when the key event was consumed.
    pub async fn handle_key(&self, event: &KeyEvent) -> bool {
        self.hotkeys.handle(event).await
    }

    // ---- Sessions ----

    pub async fn create_session(&self) -> SessionId {
        self.store.write().await.create_session()
    }

    pub async fn delete_session(&self, id: &str) {
        self.store.write().await.delete_session(id);
    }

    /// Makes `id` the current session. Unknown ids leave the selection unchanged.
    pub async fn set_current_session(&self, id: &str) -> Result<()> {
        if self.store.write().await.set_current_session(id) {
            Ok(())
        } else {
            Err(ToolbarError::not_found("session", id))
        }
    }

    pub async fn current_session_id(&self) -> SessionId {
        self.store.read().await.current_session_id().to_string()
    }

    pub async fn current_session(&self) -> Option<ChatSession> {
        self.store.read().await.current_session().cloned()
    }

    pub async fn session(&self, id: &str) -> Option<ChatSession> {
        self.store.read().await.session(id).cloned()
    }

    pub async fn sessions(&self) -> Vec<ChatSession> {
        self.store.read().await.sessions().to_vec()
    }

    pub async fn set_draft_input(&self, id: &str, text: impl Into<String>) -> bool {
        self.store.write().await.set_draft_input(id, text)
    }

    /// Attaches `element`, annotated by every plugin with an element hook.
    pub async fn add_dom_context(&self, id: &str, element: ElementRef) -> bool {
        let plugin_context = self.plugins.element_context(&element);
        self.store.write().await.add_dom_context(
            id,
            DomContextElement {
                element,
                plugin_context,
            },
        )
    }

    pub async fn remove_dom_context(&self, id: &str, handle: &str) -> bool {
        self.store.write().await.remove_dom_context(id, handle)
    }

    pub async fn clear_dom_context(&self, id: &str) -> bool {
        self.store.write().await.clear_dom_context(id)
    }

    pub async fn set_selected_components(&self, id: &str, components: Vec<SelectedComponent>) -> bool {
        self.store.write().await.set_selected_components(id, components)
    }

    pub async fn clear_selected_components(&self, id: &str) -> bool {
        self.store.write().await.clear_selected_components(id)
    }

    pub async fn set_runtime_error(&self, id: &str, error: RuntimeError) -> bool {
        self.store.write().await.set_runtime_error(id, error)
    }

    pub async fn clear_runtime_error(&self, id: &str) -> bool {
        self.store.write().await.clear_runtime_error(id)
    }
}
