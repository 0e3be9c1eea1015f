//! Infrastructure adapters for the Promptbar toolbar.
//!
//! Concrete implementations of the collaborator contracts defined in
//! `promptbar-core`: configuration storage, the XML prompt renderer, the HTTP
//! agent bridge, clipboards and the analytics sink.

pub mod analytics;
pub mod clipboard;
pub mod config_service;
pub mod http_bridge;
pub mod paths;
pub mod xml_renderer;

pub use analytics::TracingAnalytics;
pub use clipboard::{MemoryClipboard, SystemClipboard};
pub use config_service::ConfigService;
pub use http_bridge::HttpAgentBridge;
pub use paths::PromptbarPaths;
pub use xml_renderer::XmlPromptRenderer;
