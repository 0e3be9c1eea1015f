//! Unified path management for promptbar files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/promptbar/         # Config directory (platform config dir)
//! └── config.toml              # Toolbar configuration
//! ```

use promptbar_core::error::{Result, ToolbarError};
use std::path::PathBuf;

const APP_DIR: &str = "promptbar";
const CONFIG_FILE: &str = "config.toml";

/// Resolves promptbar paths, optionally under a custom base directory.
#[derive(Debug, Clone, Default)]
pub struct PromptbarPaths {
    base: Option<PathBuf>,
}

impl PromptbarPaths {
    /// `base` replaces the platform config directory when given (tests, portable installs).
    pub fn new(base: Option<PathBuf>) -> Self {
        Self { base }
    }

    /// Returns the promptbar configuration directory.
    pub fn config_dir(&self) -> Result<PathBuf> {
        match &self.base {
            Some(base) => Ok(base.clone()),
            None => dirs::config_dir()
                .map(|dir| dir.join(APP_DIR))
                .ok_or_else(|| ToolbarError::config("Cannot find config directory")),
        }
    }

    /// Returns the path to `config.toml`.
    pub fn config_file(&self) -> Result<PathBuf> {
        Ok(self.config_dir()?.join(CONFIG_FILE))
    }
}
