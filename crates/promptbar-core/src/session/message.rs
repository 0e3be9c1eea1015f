//! Chat message types.
//!
//! Messages are immutable once appended to a session's log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageSender {
    /// Message typed (or triggered) by the user.
    User,
    /// Message produced by the agent.
    Assistant,
}

/// Distinguishes regular chat lines from structured user requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Regular,
    UserRequest,
}

/// A single entry in a chat session's message log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format)
    pub id: String,
    /// The content of the message.
    pub content: String,
    /// The author of the message.
    pub sender: MessageSender,
    /// Message kind.
    pub kind: MessageKind,
    /// Timestamp when the message was created.
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Creates a message with a fresh id and the current timestamp.
    pub fn new(content: impl Into<String>, sender: MessageSender, kind: MessageKind) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            kind,
            timestamp: Utc::now(),
        }
    }

    /// Creates a regular user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, MessageSender::User, MessageKind::Regular)
    }

    /// Creates a regular assistant message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(content, MessageSender::Assistant, MessageKind::Regular)
    }
}
