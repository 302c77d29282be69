//! Tracker configuration
//!
//! This module re-exports shared types from iseeyou-types and provides
//! persistence for TrackerConfig.

use std::path::{Path, PathBuf};

use super::error::ConfigError;

// Re-export all shared types
pub use iseeyou_types::{
    Color, DEFAULT_MAX_HISTORY_ENTRIES, DEFAULT_POLL_FREQUENCY_MS, MIN_POLL_FREQUENCY_MS,
    TrackerConfig, clamp_color, highlight_colors,
};

/// Application name used for the platform config directory
pub const APP_NAME: &str = "iseeyou";
/// Config file stem inside the app directory
pub const CONFIG_NAME: &str = "config";

// ─────────────────────────────────────────────────────────────────────────────
// TrackerConfig Extensions
// ─────────────────────────────────────────────────────────────────────────────

/// Extension trait for TrackerConfig persistence
pub trait TrackerConfigExt: Sized {
    /// Load from the platform config dir, falling back to defaults on any error.
    fn load() -> Self;
    fn try_load() -> Result<Self, ConfigError>;
    fn save(&self) -> Result<(), ConfigError>;
    fn load_from(path: &Path) -> Result<Self, ConfigError>;
    fn save_to(&self, path: &Path) -> Result<(), ConfigError>;
    fn config_path() -> Result<PathBuf, ConfigError>;
}

impl TrackerConfigExt for TrackerConfig {
    fn load() -> Self {
        match Self::try_load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Falling back to default tracker configuration");
                Self::default()
            }
        }
    }

    fn try_load() -> Result<Self, ConfigError> {
        Ok(confy::load(APP_NAME, CONFIG_NAME)?)
    }

    fn save(&self) -> Result<(), ConfigError> {
        confy::store(APP_NAME, CONFIG_NAME, self.clone()).map_err(ConfigError::Save)
    }

    fn load_from(path: &Path) -> Result<Self, ConfigError> {
        confy::load_path(path).map_err(|source| ConfigError::LoadPath {
            path: path.to_path_buf(),
            source,
        })
    }

    fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        confy::store_path(path, self.clone()).map_err(|source| ConfigError::SavePath {
            path: path.to_path_buf(),
            source,
        })
    }

    fn config_path() -> Result<PathBuf, ConfigError> {
        confy::get_configuration_file_path(APP_NAME, CONFIG_NAME).map_err(ConfigError::ResolvePath)
    }
}
