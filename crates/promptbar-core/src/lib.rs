//! Domain layer of the Promptbar toolbar.
//!
//! Holds the chat session store, the prompt lifecycle slot, the UI mode reducer,
//! the hotkey resolver and the contracts of every external collaborator (agent
//! bridge, prompt renderer, plugins, clipboard, analytics, IDE session selection).
//! Nothing in this crate spawns tasks or performs I/O.

pub mod bridge;
pub mod config;
pub mod error;
pub mod host;
pub mod hotkey;
pub mod lifecycle;
pub mod mode;
pub mod plugin;
pub mod prompt;
pub mod session;

// Re-export common error type
pub use error::{Result, ToolbarError};
