//! Toolbar plugin capability contract.
//!
//! A plugin is trusted code registered with the toolbar. Every hook is optional:
//! a plugin declares the hooks it implements through [`ToolbarPlugin::hooks`] and
//! callers check [`ToolbarPlugin::supports`] before invoking one. Undeclared hooks
//! keep their no-op default bodies.

use crate::bridge::ToolbarHost;
use crate::error::Result;
use crate::session::{ElementContext, ElementRef};
use async_trait::async_trait;
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// The hooks a plugin may implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginHook {
    Load,
    PromptingStart,
    PromptingAbort,
    ContextElementSelect,
    PromptSend,
    PromptTransmit,
}

/// Payload handed to `on_prompt_send` for every submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptSendPayload {
    pub id: String,
    pub text: String,
    pub context_elements: Vec<ElementRef>,
    pub sent_by_plugin: bool,
}

/// Content of a snippet returned by a plugin: either ready text or a deferred
/// producer that must be awaited before the snippet is used.
pub enum SnippetContent {
    Text(String),
    Deferred(BoxFuture<'static, Result<String>>),
}

impl SnippetContent {
    /// Wraps a future producing the snippet text.
    pub fn deferred<F>(future: F) -> Self
    where
        F: std::future::Future<Output = Result<String>> + Send + 'static,
    {
        Self::Deferred(Box::pin(future))
    }

    /// Resolves the content to its final text.
    pub async fn resolve(self) -> Result<String> {
        match self {
            Self::Text(text) => Ok(text),
            Self::Deferred(future) => future.await,
        }
    }
}

impl fmt::Debug for SnippetContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<String> for SnippetContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for SnippetContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

/// A snippet as returned by a plugin, before its content is resolved.
#[derive(Debug)]
pub struct PendingSnippet {
    pub prompt_context_name: String,
    pub content: SnippetContent,
}

impl PendingSnippet {
    pub fn new(prompt_context_name: impl Into<String>, content: impl Into<SnippetContent>) -> Self {
        Self {
            prompt_context_name: prompt_context_name.into(),
            content: content.into(),
        }
    }
}

/// What `on_prompt_send` returns.
#[derive(Debug, Default)]
pub struct PromptSendResult {
    pub context_snippets: Vec<PendingSnippet>,
}

/// A resolved snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextSnippet {
    pub prompt_context_name: String,
    pub content: String,
}

/// All snippets contributed by one plugin to one submission.
///
/// Produced per submission and discarded once the prompt is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginContextSnippet {
    pub plugin_name: String,
    pub context_snippets: Vec<ContextSnippet>,
}

/// A toolbar plugin.
#[async_trait]
pub trait ToolbarPlugin: Send + Sync {
    /// Unique plugin name, also used as the tag of its prompt context section.
    fn name(&self) -> &str;

    /// Hooks this plugin implements.
    fn hooks(&self) -> &[PluginHook] {
        &[]
    }

    fn supports(&self, hook: PluginHook) -> bool {
        self.hooks().contains(&hook)
    }

    /// Called once when the toolbar loads its plugins.
    async fn on_load(&self, _host: Arc<dyn ToolbarHost>) -> Result<()> {
        Ok(())
    }

    /// Called when prompt creation mode starts.
    fn on_prompting_start(&self) {}

    /// Called when prompt creation mode stops.
    fn on_prompting_abort(&self) {}

    /// Called when the user attaches a page element to the prompt.
    fn on_context_element_select(&self, _element: &ElementRef) -> ElementContext {
        ElementContext::default()
    }

    /// Called for every submission; may contribute context snippets.
    async fn on_prompt_send(&self, _payload: &PromptSendPayload) -> Result<Option<PromptSendResult>> {
        Ok(None)
    }

    /// Called with the final prompt right before it is delivered.
    async fn on_prompt_transmit(&self, _final_prompt: &str) -> Result<()> {
        Ok(())
    }
}
