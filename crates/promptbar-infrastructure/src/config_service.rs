//! Configuration service implementation.
//!
//! Loads [`ToolbarConfig`] from `~/.config/promptbar/config.toml` and caches it.
//! A missing file yields the defaults; a malformed file is reported by
//! [`ConfigService::load`] and falls back to the defaults in
//! [`ConfigService::get_config`].

use crate::paths::PromptbarPaths;
use promptbar_core::config::{DeliveryMode, PreferenceProvider, ToolbarConfig};
use promptbar_core::error::Result;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

/// Configuration service that loads and caches the toolbar configuration.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
    /// Cached configuration, filled lazily on first access.
    config: Arc<RwLock<Option<ToolbarConfig>>>,
}

impl ConfigService {
    /// Creates a service for the default config file location.
    pub fn new_default() -> Result<Self> {
        Ok(Self::with_path(PromptbarPaths::default().config_file()?))
    }

    /// Creates a service reading `path`.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            config: Arc::new(RwLock::new(None)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets the configuration, loading from file if not cached.
    pub fn get_config(&self) -> ToolbarConfig {
        {
            let cached = self.config.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(config) = cached.as_ref() {
                return config.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "[ConfigService] Falling back to default configuration"
            );
            ToolbarConfig::default()
        });

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(loaded.clone());
        loaded
    }

    /// Reads the config file, bypassing the cache.
    pub fn load(&self) -> Result<ToolbarConfig> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "[ConfigService] No config file, using defaults");
            return Ok(ToolbarConfig::default());
        }
        let content = std::fs::read_to_string(&self.path)?;
        let config = toml::from_str(&content)?;
        tracing::debug!(path = %self.path.display(), "[ConfigService] Configuration loaded");
        Ok(config)
    }

    /// Writes `config` to the file and refreshes the cache.
    pub fn save(&self, config: &ToolbarConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, toml::to_string_pretty(config)?)?;
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(config.clone());
        tracing::info!(path = %self.path.display(), "[ConfigService] Configuration saved");
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}

impl PreferenceProvider for ConfigService {
    fn delivery_mode(&self) -> DeliveryMode {
        self.get_config().delivery_mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let service = ConfigService::with_path(temp_dir.path().join("config.toml"));

        assert_eq!(service.get_config(), ToolbarConfig::default());
        assert_eq!(service.delivery_mode(), DeliveryMode::Send);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
delivery_mode = "both"

[timings]
error_display_ms = 500

[bridge]
endpoint = "http://127.0.0.1:5746"
"#,
        )
        .unwrap();

        let config = ConfigService::with_path(path).get_config();
        assert_eq!(config.delivery_mode, DeliveryMode::Both);
        assert_eq!(config.timings.error_display_ms, 500);
        assert_eq!(config.timings.success_display_ms, 1000);
        assert_eq!(config.bridge.endpoint.as_deref(), Some("http://127.0.0.1:5746"));
    }

    #[test]
    fn test_malformed_file_is_reported_by_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(&path, "delivery_mode = [").unwrap();
        let service = ConfigService::with_path(path);

        let err = service.load().unwrap_err();
        assert!(err.is_serialization());
        assert_eq!(service.get_config(), ToolbarConfig::default());
    }

    #[test]
    fn test_save_then_reload_after_invalidate() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");
        let service = ConfigService::with_path(&path);

        let mut config = ToolbarConfig::default();
        config.delivery_mode = DeliveryMode::Copy;
        service.save(&config).unwrap();
        assert!(path.exists());
        assert_eq!(service.delivery_mode(), DeliveryMode::Copy);

        std::fs::write(&path, "delivery_mode = \"send\"\n").unwrap();
        assert_eq!(service.delivery_mode(), DeliveryMode::Copy);
        service.invalidate_cache();
        assert_eq!(service.delivery_mode(), DeliveryMode::Send);
    }
}
