//! Application layer of the Promptbar toolbar.
//!
//! Orchestrates the domain pieces from `promptbar-core` into a running toolbar:
//! plugin fan-out, mode coordination, hotkey handling and the prompt lifecycle.

pub mod host;
pub mod hotkey_listener;
pub mod mode_coordinator;
pub mod plugin_registry;
pub mod prompt_controller;
pub mod toolbar;

pub use host::{BridgeHost, BridgeSlot, WindowSelection};
pub use hotkey_listener::HotkeyListener;
pub use mode_coordinator::ModeCoordinator;
pub use plugin_registry::PluginRegistry;
pub use prompt_controller::{PromptCollaborators, PromptLifecycleController, Submission};
pub use toolbar::{Toolbar, ToolbarBuilder};
