//! Error types for the Promptbar toolbar core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the toolbar crates.
///
/// Collaborators (bridge, renderer, clipboard, plugins) report failures with this
/// type. The prompt lifecycle never hands these to its caller; they are turned into
/// lifecycle transitions and log records instead.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum ToolbarError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote agent bridge failed to deliver a prompt (transport level)
    #[error("Bridge error: {0}")]
    Bridge(String),

    /// No remote agent bridge is connected
    #[error("No connection to the agent")]
    BridgeUnavailable,

    /// A plugin hook failed
    #[error("Plugin '{plugin}' failed: {message}")]
    Plugin { plugin: String, message: String },

    /// Clipboard write failed
    #[error("Clipboard error: {0}")]
    Clipboard(String),

    /// Prompt rendering failed
    #[error("Render error: {0}")]
    Render(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolbarError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a Bridge error
    pub fn bridge(message: impl Into<String>) -> Self {
        Self::Bridge(message.into())
    }

    /// Creates a Plugin error
    pub fn plugin(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Plugin {
            plugin: plugin.into(),
            message: message.into(),
        }
    }

    /// Creates a Clipboard error
    pub fn clipboard(message: impl Into<String>) -> Self {
        Self::Clipboard(message.into())
    }

    /// Creates a Render error
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a serialization error
    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }

    /// Check if this error means the bridge could not be reached at all.
    ///
    /// Returns true for `BridgeUnavailable` and transport-level `Bridge` errors.
    pub fn is_bridge_failure(&self) -> bool {
        matches!(self, Self::Bridge(_) | Self::BridgeUnavailable)
    }
}

impl From<std::io::Error> for ToolbarError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for ToolbarError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for ToolbarError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for ToolbarError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, ToolbarError>`.
pub type Result<T> = std::result::Result<T, ToolbarError>;
