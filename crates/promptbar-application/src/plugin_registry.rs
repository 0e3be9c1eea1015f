//! Plugin registry.
//!
//! Holds the registered plugins in registration order and fans toolbar events out
//! to them. Context collection and transmit notification use settle-all
//! semantics: every plugin runs to completion independently and a failing plugin
//! only loses its own contribution.

use futures::FutureExt;
use futures::future::{join_all, try_join_all};
use promptbar_core::bridge::ToolbarHost;
use promptbar_core::error::{Result, ToolbarError};
use promptbar_core::plugin::{
    ContextSnippet, PluginContextSnippet, PluginHook, PromptSendPayload, ToolbarPlugin,
};
use promptbar_core::session::{ElementRef, PluginElementContext};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Ordered collection of toolbar plugins.
pub struct PluginRegistry {
    plugins: Vec<Arc<dyn ToolbarPlugin>>,
    loaded: AtomicBool,
    context_timeout: Option<Duration>,
}

impl PluginRegistry {
    pub fn new(plugins: Vec<Arc<dyn ToolbarPlugin>>) -> Self {
        Self {
            plugins,
            loaded: AtomicBool::new(false),
            context_timeout: None,
        }
    }

    /// Bounds each plugin's `on_prompt_send` (including snippet resolution).
    pub fn with_context_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.context_timeout = timeout;
        self
    }

    pub fn plugins(&self) -> &[Arc<dyn ToolbarPlugin>] {
        &self.plugins
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded.load(Ordering::SeqCst)
    }

    /// Runs every `on_load` hook once, in registration order.
    ///
    /// Later calls are no-ops. Hook errors are returned to the caller and stop
    /// the remaining hooks.
    pub async fn notify_loaded(&self, host: Arc<dyn ToolbarHost>) -> Result<()> {
        if self.loaded.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        for plugin in self.with_hook(PluginHook::Load) {
            tracing::debug!(plugin = plugin.name(), "[PluginRegistry] Loading plugin");
            plugin.on_load(host.clone()).await?;
        }
        Ok(())
    }

    /// Collects context snippets from every plugin with an `on_prompt_send` hook.
    ///
    /// Hooks run concurrently. The result follows registration order and only
    /// contains plugins that returned at least one snippet. A plugin whose hook,
    /// snippet resolution or time budget fails contributes nothing.
    pub async fn collect_context(&self, payload: &PromptSendPayload) -> Vec<PluginContextSnippet> {
        let tasks = self.with_hook(PluginHook::PromptSend).map(|plugin| async move {
            let name = plugin.name().to_string();
            let contribution = AssertUnwindSafe(self.bounded_contribution(plugin.as_ref(), payload))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ToolbarError::plugin(&name, "hook panicked")));

            match contribution {
                Ok(snippets) => snippets,
                Err(e) => {
                    tracing::warn!(plugin = %name, error = %e, "[PluginRegistry] Context collection failed");
                    None
                }
            }
        });

        join_all(tasks).await.into_iter().flatten().collect()
    }

    async fn bounded_contribution(
        &self,
        plugin: &dyn ToolbarPlugin,
        payload: &PromptSendPayload,
    ) -> Result<Option<PluginContextSnippet>> {
        match self.context_timeout {
            Some(limit) => tokio::time::timeout(limit, Self::contribution(plugin, payload))
                .await
                .unwrap_or_else(|_| {
                    Err(ToolbarError::plugin(
                        plugin.name(),
                        format!("context collection timed out after {limit:?}"),
                    ))
                }),
            None => Self::contribution(plugin, payload).await,
        }
    }

    async fn contribution(
        plugin: &dyn ToolbarPlugin,
        payload: &PromptSendPayload,
    ) -> Result<Option<PluginContextSnippet>> {
        let Some(result) = plugin.on_prompt_send(payload).await? else {
            return Ok(None);
        };
        if result.context_snippets.is_empty() {
            return Ok(None);
        }

        let context_snippets = try_join_all(result.context_snippets.into_iter().map(
            |snippet| async move {
                Ok::<_, ToolbarError>(ContextSnippet {
                    prompt_context_name: snippet.prompt_context_name,
                    content: snippet.content.resolve().await?,
                })
            },
        ))
        .await?;

        Ok(Some(PluginContextSnippet {
            plugin_name: plugin.name().to_string(),
            context_snippets,
        }))
    }

    /// Hands the final prompt to every `on_prompt_transmit` hook.
    ///
    /// Failures are logged and never affect other plugins.
    pub async fn notify_transmit(&self, final_prompt: &str) {
        let tasks = self.with_hook(PluginHook::PromptTransmit).map(|plugin| async move {
            let outcome = AssertUnwindSafe(plugin.on_prompt_transmit(final_prompt))
                .catch_unwind()
                .await
                .unwrap_or_else(|_| Err(ToolbarError::plugin(plugin.name(), "hook panicked")));
            if let Err(e) = outcome {
                tracing::error!(
                    plugin = plugin.name(),
                    error = %e,
                    "[PluginRegistry] onPromptTransmit failed"
                );
            }
        });
        join_all(tasks).await;
    }

    pub fn notify_prompting_start(&self) {
        for plugin in self.with_hook(PluginHook::PromptingStart) {
            plugin.on_prompting_start();
        }
    }

    pub fn notify_prompting_abort(&self) {
        for plugin in self.with_hook(PluginHook::PromptingAbort) {
            plugin.on_prompting_abort();
        }
    }

    /// Asks every plugin with an element hook for context about `element`.
    pub fn element_context(&self, element: &ElementRef) -> Vec<PluginElementContext> {
        self.with_hook(PluginHook::ContextElementSelect)
            .map(|plugin| PluginElementContext {
                plugin_name: plugin.name().to_string(),
                context: plugin.on_context_element_select(element),
            })
            .collect()
    }

    fn with_hook(&self, hook: PluginHook) -> impl Iterator<Item = &Arc<dyn ToolbarPlugin>> {
        self.plugins.iter().filter(move |p| p.supports(hook))
    }
}
