//! Chat session domain model.
//!
//! This module contains the `ChatSession` entity and the context types that can be
//! attached to a session while a prompt is being composed: DOM element references,
//! selected reference components, and the last runtime error reported by the page.

use super::message::Message;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Identifier of a chat session.
pub type SessionId = String;

/// Id of the placeholder session that exists whenever no other session does.
pub const DEFAULT_SESSION_ID: &str = "new_chat";

/// Title of the placeholder session.
pub const DEFAULT_SESSION_TITLE: &str = "New chat";

/// Summary of an element's parent, used when describing the element in a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParentSummary {
    pub tag: String,
    #[serde(default)]
    pub dom_id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
}

/// A reference to an element selected on the host page.
///
/// The `handle` identifies the element for the lifetime of the page and is the
/// only field used for equality between context entries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementRef {
    /// Stable handle assigned by the host page.
    pub handle: String,
    /// Lower-case tag name.
    pub tag: String,
    #[serde(default)]
    pub dom_id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Remaining attributes (style excluded by the host).
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub inner_text: Option<String>,
    #[serde(default)]
    pub parent: Option<ParentSummary>,
}

impl ElementRef {
    /// Creates a bare element reference with a handle and tag.
    pub fn new(handle: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
            tag: tag.into(),
            ..Default::default()
        }
    }
}

/// Context a plugin attaches to a selected element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementContext {
    #[serde(default)]
    pub annotation: Option<String>,
}

/// Context captured from one plugin for one element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginElementContext {
    pub plugin_name: String,
    pub context: ElementContext,
}

/// A selected element together with the per-plugin context captured at selection time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomContextElement {
    pub element: ElementRef,
    #[serde(default)]
    pub plugin_context: Vec<PluginElementContext>,
}

/// A UI component picked by the user as a reference for the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedComponent {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub install_command: Option<String>,
    #[serde(default)]
    pub preview_url: Option<String>,
}

/// An uncaught error reported by the host page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeError {
    pub message: String,
    pub source_file: String,
    pub line: u32,
    pub column: u32,
    #[serde(default)]
    pub stack_trace: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// A chat session owned by the [`ChatSessionStore`](super::ChatSessionStore).
///
/// A session contains:
/// - The message log (append-only)
/// - The draft input currently in the prompt box
/// - DOM context elements attached while composing
/// - Selected reference components
/// - The most recent runtime error, if the user attached one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Session identifier, immutable after creation
    pub id: SessionId,
    /// Optional human-readable title
    pub title: Option<String>,
    /// Messages in insertion order
    pub messages: Vec<Message>,
    /// Current prompt box contents
    pub draft_input: String,
    /// Attached DOM elements, unique by element handle
    pub dom_context_elements: Vec<DomContextElement>,
    /// Reference components in selection order
    pub selected_components: Vec<SelectedComponent>,
    /// Most recent runtime error
    pub last_runtime_error: Option<RuntimeError>,
}

impl ChatSession {
    /// Creates an empty session with the given id.
    pub fn new(id: impl Into<SessionId>) -> Self {
        Self {
            id: id.into(),
            title: None,
            messages: Vec::new(),
            draft_input: String::new(),
            dom_context_elements: Vec::new(),
            selected_components: Vec::new(),
            last_runtime_error: None,
        }
    }

    /// Creates the `new_chat` placeholder session.
    pub fn placeholder() -> Self {
        Self {
            title: Some(DEFAULT_SESSION_TITLE.to_string()),
            ..Self::new(DEFAULT_SESSION_ID)
        }
    }

    /// Element references attached to this session, in attachment order.
    pub fn context_elements(&self) -> Vec<ElementRef> {
        self.dom_context_elements
            .iter()
            .map(|e| e.element.clone())
            .collect()
    }

    /// True when draft input, DOM context and selected components are all empty.
    pub fn prompt_inputs_cleared(&self) -> bool {
        self.draft_input.is_empty()
            && self.dom_context_elements.is_empty()
            && self.selected_components.is_empty()
    }
}
