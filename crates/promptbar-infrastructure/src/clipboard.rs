//! Clipboard adapters.

use async_trait::async_trait;
use promptbar_core::error::{Result, ToolbarError};
use promptbar_core::host::Clipboard;
use std::sync::{Arc, Mutex, PoisonError};

/// The desktop clipboard.
///
/// Holds on to the `arboard` handle so copied text stays available on
/// platforms where the clipboard owner has to stay alive (X11).
#[derive(Clone)]
pub struct SystemClipboard {
    inner: Arc<Mutex<arboard::Clipboard>>,
}

impl SystemClipboard {
    /// Connects to the platform clipboard.
    pub fn new() -> Result<Self> {
        let clipboard = arboard::Clipboard::new().map_err(|e| {
            ToolbarError::clipboard(format!("Failed to open system clipboard: {}", e))
        })?;
        Ok(Self {
            inner: Arc::new(Mutex::new(clipboard)),
        })
    }
}

#[async_trait]
impl Clipboard for SystemClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        let inner = self.inner.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || {
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .set_text(text)
                .map_err(|e| ToolbarError::clipboard(format!("Failed to copy prompt: {}", e)))
        })
        .await
        .map_err(|e| ToolbarError::internal(format!("Clipboard task failed: {}", e)))?
    }
}

/// In-process clipboard. Keeps the last written text.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> Option<String> {
        self.contents
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        *self.contents.lock().unwrap_or_else(PoisonError::into_inner) = Some(text.to_string());
        Ok(())
    }
}
