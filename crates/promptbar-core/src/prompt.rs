//! Prompt assembly contract.

use crate::error::Result;
use crate::plugin::PluginContextSnippet;
use crate::session::{ElementRef, RuntimeError, SelectedComponent};
use async_trait::async_trait;
use serde::Serialize;

/// Everything the renderer needs to build the final prompt for one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptAssembly {
    pub dom_elements: Vec<ElementRef>,
    pub text: String,
    pub url: String,
    pub plugin_snippets: Vec<PluginContextSnippet>,
    pub selected_components: Vec<SelectedComponent>,
    pub runtime_error: Option<RuntimeError>,
}

/// Turns a [`PromptAssembly`] into the text delivered to the agent.
///
/// Implementations are side-effect-free formatters.
#[async_trait]
pub trait PromptRenderer: Send + Sync {
    async fn assemble(&self, assembly: &PromptAssembly) -> Result<String>;
}
