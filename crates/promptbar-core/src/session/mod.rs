//! Chat session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session entity and attachable context (`ChatSession`, `ElementRef`, `RuntimeError`)
//! - `message`: Message log entries (`Message`, `MessageSender`, `MessageKind`)
//! - `store`: The Chat/Session Store (`ChatSessionStore`)
//!
//! # Usage
//!
//! ```
//! use promptbar_core::session::{ChatSessionStore, Message};
//!
//! let mut store = ChatSessionStore::new();
//! let id = store.create_session();
//! store.append_message(&id, Message::user("make the header sticky"));
//! assert_eq!(store.session(&id).unwrap().messages.len(), 1);
//! ```

mod message;
mod model;
mod store;

pub use message::{Message, MessageKind, MessageSender};
pub use model::{
    ChatSession, DEFAULT_SESSION_ID, DEFAULT_SESSION_TITLE, DomContextElement, ElementContext,
    ElementRef, ParentSummary, PluginElementContext, RuntimeError, SelectedComponent, SessionId,
};
pub use store::ChatSessionStore;
