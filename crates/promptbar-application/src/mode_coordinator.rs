//! Mode coordinator.
//!
//! Owns the live [`UiMode`] and runs the side effects of each transition. The
//! mode lives in a `watch` channel so the hotkey listener and the UI can read a
//! current snapshot without going through the coordinator.

use crate::plugin_registry::PluginRegistry;
use promptbar_core::lifecycle::PromptLifecycle;
use promptbar_core::mode::{Action, ChatAreaState, ModeEffect, UiMode};
use promptbar_core::session::ChatSessionStore;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};

pub struct ModeCoordinator {
    mode: watch::Sender<UiMode>,
    store: Arc<RwLock<ChatSessionStore>>,
    lifecycle: Arc<PromptLifecycle>,
    plugins: Arc<PluginRegistry>,
}

impl ModeCoordinator {
    pub fn new(
        initial: UiMode,
        store: Arc<RwLock<ChatSessionStore>>,
        lifecycle: Arc<PromptLifecycle>,
        plugins: Arc<PluginRegistry>,
    ) -> Self {
        let (mode, _) = watch::channel(initial);
        Self {
            mode,
            store,
            lifecycle,
            plugins,
        }
    }

    /// Current mode snapshot.
    pub fn mode(&self) -> UiMode {
        *self.mode.borrow()
    }

    /// Live view of the mode.
    pub fn subscribe(&self) -> watch::Receiver<UiMode> {
        self.mode.subscribe()
    }

    /// Applies `action` and runs its effects. Returns the resulting mode.
    pub async fn dispatch(&self, action: Action) -> UiMode {
        let mut effects = Vec::new();
        self.mode.send_modify(|mode| effects = mode.apply(action));

        tracing::debug!(
            target: "promptbar::mode",
            ?action,
            effects = effects.len(),
            "[ModeCoordinator] Action applied"
        );

        for effect in effects {
            self.run(effect).await;
        }
        self.mode()
    }

    /// Opens the compact chat area if it is hidden. Used when a prompt is
    /// submitted so the user can see the exchange.
    pub async fn reveal_chat_area(&self) {
        if self.mode().chat_area == ChatAreaState::Hidden {
            self.dispatch(Action::SetChatAreaState(ChatAreaState::Compact))
                .await;
        }
    }

    async fn run(&self, effect: ModeEffect) {
        match effect {
            ModeEffect::NotifyPromptingStart => self.plugins.notify_prompting_start(),
            ModeEffect::NotifyPromptingAbort => self.plugins.notify_prompting_abort(),
            ModeEffect::ResetLifecycle => self.lifecycle.reset(),
            ModeEffect::ClearDomContext => {
                let mut store = self.store.write().await;
                let current = store.current_session_id().to_string();
                store.clear_dom_context(&current);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promptbar_core::lifecycle::PromptState;
    use promptbar_core::session::{DomContextElement, ElementRef};

    fn coordinator() -> (ModeCoordinator, Arc<RwLock<ChatSessionStore>>, Arc<PromptLifecycle>) {
        let store = Arc::new(RwLock::new(ChatSessionStore::new()));
        let lifecycle = Arc::new(PromptLifecycle::new());
        let coordinator = ModeCoordinator::new(
            UiMode::default(),
            store.clone(),
            lifecycle.clone(),
            Arc::new(PluginRegistry::new(Vec::new())),
        );
        (coordinator, store, lifecycle)
    }

    #[tokio::test]
    async fn test_stop_prompt_creation_runs_effects() {
        let (coordinator, store, lifecycle) = coordinator();
        {
            let mut store = store.write().await;
            let id = store.current_session_id().to_string();
            store.add_dom_context(
                &id,
                DomContextElement {
                    element: ElementRef::new("el-1", "div"),
                    plugin_context: Vec::new(),
                },
            );
        }
        let _ticket = lifecycle.try_begin().unwrap();

        coordinator.dispatch(Action::StartPromptCreation).await;
        let mode = coordinator.dispatch(Action::StopPromptCreation).await;

        assert!(!mode.prompt_creation_active);
        assert_eq!(lifecycle.state(), PromptState::Idle);
        assert!(
            store
                .read()
                .await
                .current_session()
                .unwrap()
                .dom_context_elements
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_subscribers_observe_dispatches() {
        let (coordinator, _, _) = coordinator();
        let receiver = coordinator.subscribe();

        coordinator.dispatch(Action::ExpandToolbar).await;
        assert!(!receiver.borrow().minimized);
    }

    #[tokio::test]
    async fn test_reveal_chat_area_only_opens_hidden_chat() {
        let (coordinator, _, _) = coordinator();
        coordinator.dispatch(Action::ExpandToolbar).await;
        coordinator.reveal_chat_area().await;
        assert_eq!(coordinator.mode().chat_area, ChatAreaState::Compact);

        coordinator
            .dispatch(Action::SetChatAreaState(ChatAreaState::Normal))
            .await;
        coordinator.reveal_chat_area().await;
        assert_eq!(coordinator.mode().chat_area, ChatAreaState::Normal);
    }
}
