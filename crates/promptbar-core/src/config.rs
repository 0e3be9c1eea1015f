//! Toolbar configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default, so an empty or partial file is valid.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use strum::{Display, EnumString};

/// What happens to an assembled prompt.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DeliveryMode {
    /// Send to the agent through the bridge.
    #[default]
    Send,
    /// Copy to the clipboard only.
    Copy,
    /// Copy and send.
    Both,
}

impl DeliveryMode {
    pub fn copies(self) -> bool {
        matches!(self, Self::Copy | Self::Both)
    }

    pub fn sends(self) -> bool {
        matches!(self, Self::Send | Self::Both)
    }
}

/// Source of the user's delivery preference, read at every submission.
pub trait PreferenceProvider: Send + Sync {
    fn delivery_mode(&self) -> DeliveryMode;
}

/// A preference that never changes.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedPreference(pub DeliveryMode);

impl PreferenceProvider for FixedPreference {
    fn delivery_mode(&self) -> DeliveryMode {
        self.0
    }
}

/// Display windows of the prompt lifecycle and hotkey settle delay, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timings {
    /// Time `success` is shown before the prompt inputs are cleared.
    pub success_display_ms: u64,
    /// Further time `success` stays visible after cleanup before returning to idle.
    pub success_reset_ms: u64,
    /// Time the error state stays visible before cleanup and idle.
    pub error_display_ms: u64,
    /// Delay a hotkey waits for the toolbar expand transition to settle.
    pub hotkey_settle_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            success_display_ms: 1000,
            success_reset_ms: 800,
            error_display_ms: 300,
            hotkey_settle_ms: 100,
        }
    }
}

impl Timings {
    pub fn success_display(&self) -> Duration {
        Duration::from_millis(self.success_display_ms)
    }

    pub fn success_reset(&self) -> Duration {
        Duration::from_millis(self.success_reset_ms)
    }

    pub fn error_display(&self) -> Duration {
        Duration::from_millis(self.error_display_ms)
    }

    pub fn hotkey_settle(&self) -> Duration {
        Duration::from_millis(self.hotkey_settle_ms)
    }
}

/// Optional upper bounds for the suspension points of a submission.
///
/// `None` means no timeout is imposed by the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Per-plugin bound on `on_prompt_send` (including snippet resolution).
    pub context_collection_ms: Option<u64>,
    /// Bound on the bridge call; elapsing counts as a transport failure.
    pub bridge_call_ms: Option<u64>,
}

impl Timeouts {
    pub fn context_collection(&self) -> Option<Duration> {
        self.context_collection_ms.map(Duration::from_millis)
    }

    pub fn bridge_call(&self) -> Option<Duration> {
        self.bridge_call_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Base URL of the HTTP agent bridge. No endpoint means no bridge.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Root configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolbarConfig {
    pub delivery_mode: DeliveryMode,
    pub page_url: String,
    pub timings: Timings,
    pub timeouts: Timeouts,
    pub bridge: BridgeConfig,
    pub logging: LoggingConfig,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            delivery_mode: DeliveryMode::default(),
            page_url: "about:blank".to_string(),
            timings: Timings::default(),
            timeouts: Timeouts::default(),
            bridge: BridgeConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl PreferenceProvider for ToolbarConfig {
    fn delivery_mode(&self) -> DeliveryMode {
        self.delivery_mode
    }
}
