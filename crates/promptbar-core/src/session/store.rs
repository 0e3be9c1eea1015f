use super::message::Message;
use super::model::{
    ChatSession, DomContextElement, RuntimeError, SelectedComponent, SessionId,
};
use uuid::Uuid;

/// Owns every chat session and tracks which one is current.
///
/// `ChatSessionStore` is the single mutable source of truth for session data.
/// It is never empty: deleting the last session recreates the `new_chat`
/// placeholder. Per-session updates addressed to an unknown id are no-ops and
/// report `false`.
#[derive(Debug, Clone)]
pub struct ChatSessionStore {
    sessions: Vec<ChatSession>,
    current: SessionId,
}

impl ChatSessionStore {
    /// Creates a store holding only the placeholder session.
    pub fn new() -> Self {
        let placeholder = ChatSession::placeholder();
        Self {
            current: placeholder.id.clone(),
            sessions: vec![placeholder],
        }
    }

    /// Appends a new empty session and makes it current.
    pub fn create_session(&mut self) -> SessionId {
        let id = Uuid::new_v4().to_string();
        self.sessions.push(ChatSession::new(id.clone()));
        self.current = id.clone();
        tracing::debug!(session_id = %id, "[ChatSessionStore] Session created");
        id
    }

    /// Removes a session.
    ///
    /// If it was current, the first remaining session becomes current. If no
    /// sessions remain, the placeholder session is recreated.
    pub fn delete_session(&mut self, id: &str) {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        if self.sessions.len() == before {
            return;
        }

        if self.sessions.is_empty() {
            self.sessions.push(ChatSession::placeholder());
        }
        if self.current == id || !self.contains(&self.current) {
            self.current = self.sessions[0].id.clone();
        }
        tracing::debug!(
            session_id = %id,
            current = %self.current,
            "[ChatSessionStore] Session deleted"
        );
    }

    /// Makes `id` the current session. Returns `false` for unknown ids.
    pub fn set_current_session(&mut self, id: &str) -> bool {
        if self.contains(id) {
            self.current = id.to_string();
            true
        } else {
            false
        }
    }

    pub fn current_session_id(&self) -> &str {
        &self.current
    }

    pub fn current_session(&self) -> Option<&ChatSession> {
        self.session(&self.current)
    }

    pub fn session(&self, id: &str) -> Option<&ChatSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    /// All sessions in creation order.
    pub fn sessions(&self) -> &[ChatSession] {
        &self.sessions
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sessions.iter().any(|s| s.id == id)
    }

    pub fn set_draft_input(&mut self, id: &str, text: impl Into<String>) -> bool {
        let text = text.into();
        self.update(id, |s| s.draft_input = text)
    }

    /// Attaches a DOM element. An element already attached (same handle) is replaced
    /// in place so the collection stays a set.
    pub fn add_dom_context(&mut self, id: &str, element: DomContextElement) -> bool {
        self.update(id, |s| {
            match s
                .dom_context_elements
                .iter_mut()
                .find(|e| e.element.handle == element.element.handle)
            {
                Some(existing) => *existing = element,
                None => s.dom_context_elements.push(element),
            }
        })
    }

    /// Detaches the element with the given handle.
    pub fn remove_dom_context(&mut self, id: &str, handle: &str) -> bool {
        self.update(id, |s| {
            s.dom_context_elements.retain(|e| e.element.handle != handle)
        })
    }

    pub fn clear_dom_context(&mut self, id: &str) -> bool {
        self.update(id, |s| s.dom_context_elements.clear())
    }

    pub fn set_selected_components(
        &mut self,
        id: &str,
        components: Vec<SelectedComponent>,
    ) -> bool {
        self.update(id, |s| s.selected_components = components)
    }

    pub fn clear_selected_components(&mut self, id: &str) -> bool {
        self.update(id, |s| s.selected_components.clear())
    }

    /// Stores `err` as the session's runtime error, replacing any previous one.
    pub fn set_runtime_error(&mut self, id: &str, err: RuntimeError) -> bool {
        self.update(id, |s| s.last_runtime_error = Some(err))
    }

    pub fn clear_runtime_error(&mut self, id: &str) -> bool {
        self.update(id, |s| s.last_runtime_error = None)
    }

    /// Appends a message to the end of the session's log.
    pub fn append_message(&mut self, id: &str, message: Message) -> bool {
        self.update(id, |s| s.messages.push(message))
    }

    /// Clears draft input, DOM context and selected components in one step.
    pub fn clear_prompt_inputs(&mut self, id: &str) -> bool {
        self.update(id, |s| {
            s.draft_input.clear();
            s.dom_context_elements.clear();
            s.selected_components.clear();
        })
    }

    fn update<F>(&mut self, id: &str, updater: F) -> bool
    where
        F: FnOnce(&mut ChatSession),
    {
        match self.sessions.iter_mut().find(|s| s.id == id) {
            Some(session) => {
                updater(session);
                true
            }
            None => {
                tracing::trace!(session_id = %id, "[ChatSessionStore] Update for unknown session ignored");
                false
            }
        }
    }
}

impl Default for ChatSessionStore {
    fn default() -> Self {
        Self::new()
    }
}
