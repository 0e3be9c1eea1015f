use async_trait::async_trait;
use promptbar_application::{Submission, Toolbar, WindowSelection};
use promptbar_core::bridge::{
    AgentBridge, AgentPromptResponse, AgentPromptResult, PromptRequest, SESSION_MISMATCH,
};
use promptbar_core::config::{DeliveryMode, FixedPreference, ToolbarConfig};
use promptbar_core::error::{Result, ToolbarError};
use promptbar_core::host::{AnalyticsEvent, AnalyticsSink, Clipboard};
use promptbar_core::lifecycle::PromptState;
use promptbar_core::mode::{Action, ChatAreaState, UiMode};
use promptbar_core::plugin::{
    ContextSnippet, PendingSnippet, PluginContextSnippet, PluginHook, PromptSendPayload,
    PromptSendResult, ToolbarPlugin,
};
use promptbar_core::prompt::{PromptAssembly, PromptRenderer};
use promptbar_core::session::{ElementRef, SelectedComponent};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

// ---- Test doubles ----

#[derive(Default)]
struct RecordingRenderer {
    assemblies: Mutex<Vec<PromptAssembly>>,
}

#[async_trait]
impl PromptRenderer for RecordingRenderer {
    async fn assemble(&self, assembly: &PromptAssembly) -> Result<String> {
        self.assemblies.lock().unwrap().push(assembly.clone());
        Ok(format!("PROMPT[{}]", assembly.text))
    }
}

#[derive(Clone, Copy)]
enum Script {
    Succeed,
    Reject(Option<&'static str>),
    Transport,
}

struct ScriptedBridge {
    script: Script,
    delay: Option<Duration>,
    requests: Mutex<Vec<PromptRequest>>,
}

impl ScriptedBridge {
    fn new(script: Script) -> Self {
        Self {
            script,
            delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl AgentBridge for ScriptedBridge {
    async fn trigger_agent_prompt(&self, request: PromptRequest) -> Result<AgentPromptResponse> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            sleep(delay).await;
        }
        match self.script {
            Script::Succeed => Ok(AgentPromptResponse::new(AgentPromptResult::succeeded())),
            Script::Reject(code) => Ok(AgentPromptResponse::new(AgentPromptResult::failed(code))),
            Script::Transport => Err(ToolbarError::bridge("connection reset")),
        }
    }
}

#[derive(Default)]
struct RecordingClipboard {
    writes: Mutex<Vec<String>>,
}

#[async_trait]
impl Clipboard for RecordingClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

struct FailingClipboard;

#[async_trait]
impl Clipboard for FailingClipboard {
    async fn write_text(&self, _text: &str) -> Result<()> {
        Err(ToolbarError::clipboard("clipboard owned by another process"))
    }
}

#[derive(Default)]
struct RecordingAnalytics {
    events: Mutex<Vec<AnalyticsEvent>>,
    fail: bool,
}

#[async_trait]
impl AnalyticsSink for RecordingAnalytics {
    async fn track(&self, event: AnalyticsEvent) -> Result<()> {
        self.events.lock().unwrap().push(event);
        if self.fail {
            return Err(ToolbarError::internal("analytics offline"));
        }
        Ok(())
    }
}

struct TicketPlugin {
    transmitted: Mutex<Vec<String>>,
}

#[async_trait]
impl ToolbarPlugin for TicketPlugin {
    fn name(&self) -> &str {
        "tickets"
    }

    fn hooks(&self) -> &[PluginHook] {
        &[PluginHook::PromptSend, PluginHook::PromptTransmit]
    }

    async fn on_prompt_send(&self, _payload: &PromptSendPayload) -> Result<Option<PromptSendResult>> {
        Ok(Some(PromptSendResult {
            context_snippets: vec![PendingSnippet::new("ticket", "T-123")],
        }))
    }

    async fn on_prompt_transmit(&self, final_prompt: &str) -> Result<()> {
        self.transmitted.lock().unwrap().push(final_prompt.to_string());
        Ok(())
    }
}

struct BrokenPlugin;

#[async_trait]
impl ToolbarPlugin for BrokenPlugin {
    fn name(&self) -> &str {
        "broken"
    }

    fn hooks(&self) -> &[PluginHook] {
        &[PluginHook::PromptSend, PluginHook::PromptTransmit]
    }

    async fn on_prompt_send(&self, _payload: &PromptSendPayload) -> Result<Option<PromptSendResult>> {
        Err(ToolbarError::plugin("broken", "cannot reach ticket tracker"))
    }

    async fn on_prompt_transmit(&self, _final_prompt: &str) -> Result<()> {
        Err(ToolbarError::plugin("broken", "still broken"))
    }
}

// ---- Harness ----

struct Harness {
    toolbar: Toolbar,
    renderer: Arc<RecordingRenderer>,
    selection: Arc<WindowSelection>,
}

fn config() -> ToolbarConfig {
    ToolbarConfig {
        page_url: "http://localhost:3000/checkout".to_string(),
        ..ToolbarConfig::default()
    }
}

fn harness(bridge: Option<Arc<ScriptedBridge>>) -> Harness {
    harness_with(config(), bridge, |builder| builder)
}

fn harness_with(
    config: ToolbarConfig,
    bridge: Option<Arc<ScriptedBridge>>,
    customize: impl FnOnce(promptbar_application::ToolbarBuilder) -> promptbar_application::ToolbarBuilder,
) -> Harness {
    let renderer = Arc::new(RecordingRenderer::default());
    let selection = Arc::new(WindowSelection::new(Some("ide-window-1".to_string())));
    let mut builder = Toolbar::builder(config, renderer.clone())
        .session_selector(selection.clone())
        .initial_mode(UiMode::expanded());
    if let Some(bridge) = bridge {
        builder = builder.bridge(bridge);
    }
    Harness {
        toolbar: customize(builder).build(),
        renderer,
        selection,
    }
}

async fn let_tasks_run() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// ---- Tests ----

#[tokio::test(start_paused = true)]
async fn test_success_shows_for_display_windows_then_idles() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let h = harness(Some(bridge.clone()));
    h.toolbar.dispatch(Action::StartPromptCreation).await;
    h.toolbar.dispatch(Action::StartDomSelector).await;
    let id = h.toolbar.current_session_id().await;
    h.toolbar.add_dom_context(&id, ElementRef::new("el-1", "button")).await;

    h.toolbar.submit("make the button blue").await;

    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
    assert_eq!(bridge.calls(), 1);
    let session = h.toolbar.current_session().await.unwrap();
    assert_eq!(session.messages.len(), 1);
    assert_eq!(session.messages[0].content, "make the button blue");
    assert_eq!(session.draft_input, "make the button blue");

    sleep(Duration::from_millis(999)).await;
    assert!(!h.toolbar.current_session().await.unwrap().prompt_inputs_cleared());
    assert!(h.toolbar.mode().dom_selector_active);

    sleep(Duration::from_millis(2)).await;
    assert!(h.toolbar.current_session().await.unwrap().prompt_inputs_cleared());
    assert!(!h.toolbar.mode().dom_selector_active);
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);

    sleep(Duration::from_millis(798)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);

    sleep(Duration::from_millis(2)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_shows_error_then_cleans_up() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Transport));
    let h = harness(Some(bridge));
    h.toolbar.dispatch(Action::StartPromptCreation).await;

    h.toolbar.submit("add a footer").await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Error);
    assert!(h.toolbar.mode().prompt_creation_active);
    assert_eq!(h.selection.reselection_requests(), 0);

    sleep(Duration::from_millis(301)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
    assert!(!h.toolbar.mode().prompt_creation_active);
    assert!(h.toolbar.current_session().await.unwrap().prompt_inputs_cleared());
}

#[tokio::test(start_paused = true)]
async fn test_session_mismatch_requests_window_reselection() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Reject(Some(SESSION_MISMATCH))));
    let h = harness(Some(bridge.clone()));

    h.toolbar.submit("hello").await;

    assert_eq!(h.toolbar.prompt_state(), PromptState::Error);
    assert_eq!(h.selection.reselection_requests(), 1);
    assert_eq!(
        bridge.requests.lock().unwrap()[0].session_id.as_deref(),
        Some("ide-window-1")
    );

    sleep(Duration::from_millis(299)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Error);
    assert!(!h.toolbar.current_session().await.unwrap().prompt_inputs_cleared());

    sleep(Duration::from_millis(2)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
    assert!(h.toolbar.current_session().await.unwrap().prompt_inputs_cleared());
    assert_eq!(h.selection.reselection_requests(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_logical_failure_without_mismatch_keeps_selection() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Reject(Some("RATE_LIMITED"))));
    let h = harness(Some(bridge));

    h.toolbar.submit("hello").await;

    assert_eq!(h.toolbar.prompt_state(), PromptState::Error);
    assert_eq!(h.selection.reselection_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_missing_bridge_is_an_error() {
    let h = harness(None);

    h.toolbar.submit("hello").await;

    assert_eq!(h.toolbar.prompt_state(), PromptState::Error);
    assert_eq!(h.selection.reselection_requests(), 1);
    sleep(Duration::from_millis(301)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_bridge_can_be_connected_later() {
    let h = harness(None);
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    h.toolbar.connect_bridge(bridge.clone());

    h.toolbar.submit("hello").await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
    assert_eq!(bridge.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_empty_prompt_is_ignored() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let h = harness(Some(bridge.clone()));

    h.toolbar.submit("   \n\t").await;

    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
    assert_eq!(bridge.calls(), 0);
    assert!(h.toolbar.current_session().await.unwrap().messages.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_only_one_submission_in_flight() {
    let bridge = Arc::new(
        ScriptedBridge::new(Script::Succeed).with_delay(Duration::from_millis(500)),
    );
    let h = harness(Some(bridge.clone()));
    let id = h.toolbar.current_session_id().await;

    let first = h.toolbar.submit_detached(Submission::new(id.clone(), "first"));
    let_tasks_run().await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Loading);

    h.toolbar.submit_to(Submission::new(id.clone(), "second")).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Loading);

    first.await.unwrap();
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
    assert_eq!(bridge.calls(), 1);
    let messages = h.toolbar.session(&id).await.unwrap().messages;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "first");
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_pending_cleanup() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let h = harness(Some(bridge));

    h.toolbar.submit("keep my draft").await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);

    sleep(Duration::from_millis(200)).await;
    h.toolbar.reset_prompt_state();
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);

    sleep(Duration::from_millis(2000)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
    let session = h.toolbar.current_session().await.unwrap();
    assert_eq!(session.draft_input, "keep my draft");
}

#[tokio::test(start_paused = true)]
async fn test_reset_during_loading_discards_late_result() {
    let bridge = Arc::new(
        ScriptedBridge::new(Script::Succeed).with_delay(Duration::from_millis(500)),
    );
    let h = harness(Some(bridge));
    let id = h.toolbar.current_session_id().await;

    let pending = h.toolbar.submit_detached(Submission::new(id, "slow"));
    let_tasks_run().await;
    h.toolbar.reset_prompt_state();
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);

    pending.await.unwrap();
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_new_submission_supersedes_previous_display_window() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let h = harness(Some(bridge));

    h.toolbar.submit("first").await;
    sleep(Duration::from_millis(500)).await;
    h.toolbar.submit("second").await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);

    // The first submission's cleanup would have run at 1000ms.
    sleep(Duration::from_millis(700)).await;
    let session = h.toolbar.current_session().await.unwrap();
    assert_eq!(session.draft_input, "second");
    assert_eq!(session.messages.len(), 2);

    sleep(Duration::from_millis(1200)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_copy_only_delivery_skips_the_bridge() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Transport));
    let clipboard = Arc::new(RecordingClipboard::default());
    let h = harness_with(config(), Some(bridge.clone()), |b| {
        b.clipboard(clipboard.clone())
            .preferences(Arc::new(FixedPreference(DeliveryMode::Copy)))
    });

    h.toolbar.submit("copy me").await;

    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
    assert_eq!(bridge.calls(), 0);
    assert_eq!(*clipboard.writes.lock().unwrap(), vec!["PROMPT[copy me]"]);
}

#[tokio::test(start_paused = true)]
async fn test_copy_only_delivery_still_needs_a_bridge() {
    let clipboard = Arc::new(RecordingClipboard::default());
    let h = harness_with(config(), None, |b| {
        b.clipboard(clipboard.clone())
            .preferences(Arc::new(FixedPreference(DeliveryMode::Copy)))
    });

    h.toolbar.submit("copy me").await;

    assert_eq!(h.toolbar.prompt_state(), PromptState::Error);
    assert_eq!(h.selection.reselection_requests(), 1);
    assert!(clipboard.writes.lock().unwrap().is_empty());
    assert!(h.renderer.assemblies.lock().unwrap().is_empty());

    sleep(Duration::from_millis(301)).await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_clipboard_failure_does_not_block_sending() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let mut config = config();
    config.delivery_mode = DeliveryMode::Both;
    let h = harness_with(config, Some(bridge.clone()), |b| b.clipboard(Arc::new(FailingClipboard)));

    h.toolbar.submit("copy fails").await;

    assert_eq!(bridge.calls(), 1);
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
    assert_eq!(h.selection.reselection_requests(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_both_delivery_copies_and_sends() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let clipboard = Arc::new(RecordingClipboard::default());
    let mut config = config();
    config.delivery_mode = DeliveryMode::Both;
    let h = harness_with(config, Some(bridge.clone()), |b| b.clipboard(clipboard.clone()));

    h.toolbar.submit("both").await;

    assert_eq!(bridge.calls(), 1);
    assert_eq!(clipboard.writes.lock().unwrap().len(), 1);
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
}

#[tokio::test(start_paused = true)]
async fn test_bridge_timeout_is_a_transport_failure() {
    let bridge = Arc::new(
        ScriptedBridge::new(Script::Succeed).with_delay(Duration::from_secs(30)),
    );
    let mut config = config();
    config.timeouts.bridge_call_ms = Some(250);
    let h = harness_with(config, Some(bridge), |b| b);

    h.toolbar.submit("slow agent").await;
    assert_eq!(h.toolbar.prompt_state(), PromptState::Error);
}

#[tokio::test(start_paused = true)]
async fn test_analytics_failure_does_not_block_delivery() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let analytics = Arc::new(RecordingAnalytics {
        fail: true,
        ..RecordingAnalytics::default()
    });
    let h = harness_with(config(), Some(bridge.clone()), |b| b.analytics(analytics.clone()));
    let id = h.toolbar.current_session_id().await;
    h.toolbar
        .set_selected_components(
            &id,
            vec![SelectedComponent {
                id: 7,
                name: "Card".to_string(),
                description: None,
                install_command: None,
                preview_url: None,
            }],
        )
        .await;

    h.toolbar
        .submit_to(Submission::new(id, "track me").with_at_menu_mode("files"))
        .await;

    assert_eq!(bridge.calls(), 1);
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
    let events = analytics.events.lock().unwrap();
    let AnalyticsEvent::AgentPromptTriggered(event) = &events[0];
    assert_eq!(event.prompt_text, "track me");
    assert_eq!(event.component_count, 1);
    assert_eq!(event.selected_dom_elements_count, 0);
    assert_eq!(event.session_id.as_deref(), Some("ide-window-1"));
    assert_eq!(event.at_menu_mode.as_deref(), Some("files"));
}

#[tokio::test(start_paused = true)]
async fn test_submission_reveals_hidden_chat_area() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let h = harness(Some(bridge));
    assert_eq!(h.toolbar.mode().chat_area, ChatAreaState::Hidden);

    h.toolbar.submit("show me").await;
    assert_eq!(h.toolbar.mode().chat_area, ChatAreaState::Compact);
}

#[tokio::test(start_paused = true)]
async fn test_end_to_end_with_plugins() {
    let bridge = Arc::new(ScriptedBridge::new(Script::Succeed));
    let tickets = Arc::new(TicketPlugin {
        transmitted: Mutex::new(Vec::new()),
    });
    let h = harness_with(config(), Some(bridge.clone()), |b| {
        b.plugin(tickets.clone()).plugin(Arc::new(BrokenPlugin))
    });
    let id = h.toolbar.current_session_id().await;
    h.toolbar.add_dom_context(&id, ElementRef::new("el-42", "form")).await;

    h.toolbar.submit("fix checkout").await;
    let_tasks_run().await;

    let assemblies = h.renderer.assemblies.lock().unwrap();
    assert_eq!(assemblies.len(), 1);
    let assembly = &assemblies[0];
    assert_eq!(assembly.text, "fix checkout");
    assert_eq!(assembly.url, "http://localhost:3000/checkout");
    assert_eq!(assembly.dom_elements.len(), 1);
    assert_eq!(assembly.dom_elements[0].handle, "el-42");
    assert_eq!(
        assembly.plugin_snippets,
        vec![PluginContextSnippet {
            plugin_name: "tickets".to_string(),
            context_snippets: vec![ContextSnippet {
                prompt_context_name: "ticket".to_string(),
                content: "T-123".to_string(),
            }],
        }]
    );

    let requests = bridge.requests.lock().unwrap();
    assert_eq!(requests[0].prompt, "PROMPT[fix checkout]");
    assert_eq!(*tickets.transmitted.lock().unwrap(), vec!["PROMPT[fix checkout]"]);
    assert_eq!(h.toolbar.prompt_state(), PromptState::Success);
}

#[tokio::test]
async fn test_switching_sessions() {
    let h = harness(None);
    let first = h.toolbar.current_session_id().await;
    let second = h.toolbar.create_session().await;
    assert_eq!(h.toolbar.current_session_id().await, second);

    h.toolbar.set_current_session(&first).await.unwrap();
    assert_eq!(h.toolbar.current_session_id().await, first);

    let err = h.toolbar.set_current_session("missing").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(h.toolbar.current_session_id().await, first);
}
