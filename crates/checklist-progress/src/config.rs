//! Progress configuration
//!
//! [`ProgressConfig`] is deserialized from TOML; every field has a default so
//! an empty file is a valid configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default notes auto-save debounce
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 2000;

/// Default base for relative photo paths
pub const DEFAULT_PHOTO_BASE_URL: &str = "https://dashboard.eye-fi.com/";

/// Default note recorded when an item is verified without photos
pub const DEFAULT_VERIFIED_NOTE: &str = "Verified without photos";

/// Progress configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Debounce before notes are auto-saved
    pub autosave_delay_ms: u64,
    /// Directory for the file-backed cache; in-memory when absent
    pub storage_dir: Option<PathBuf>,
    /// Base URL joined to relative photo paths
    pub photo_base_url: String,
    /// Note recorded by `mark_as_verified` when the item has none
    pub verified_note: String,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            autosave_delay_ms: DEFAULT_AUTOSAVE_DELAY_MS,
            storage_dir: None,
            photo_base_url: DEFAULT_PHOTO_BASE_URL.to_string(),
            verified_note: DEFAULT_VERIFIED_NOTE.to_string(),
        }
    }
}

impl ProgressConfig {
    /// Create default config
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// [`ConfigError::Parse`] for malformed TOML, [`ConfigError::Invalid`]
    /// for out-of-range values.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    ///
    /// # Errors
    /// [`ConfigError::Read`] when the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!("Loaded progress config from {}", path.display());
        Ok(config)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// [`ConfigError::Invalid`] naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.autosave_delay_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "autosave_delay_ms",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.photo_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "photo_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    /// Set auto-save debounce
    #[inline]
    #[must_use]
    pub fn with_autosave_delay(mut self, delay: Duration) -> Self {
        self.autosave_delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Set cache directory
    #[inline]
    #[must_use]
    pub fn with_storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.storage_dir = Some(dir.into());
        self
    }

    /// Set photo base URL
    #[inline]
    #[must_use]
    pub fn with_photo_base_url(mut self, url: impl Into<String>) -> Self {
        self.photo_base_url = url.into();
        self
    }

    /// Set verified note
    #[inline]
    #[must_use]
    pub fn with_verified_note(mut self, note: impl Into<String>) -> Self {
        self.verified_note = note.into();
        self
    }

    /// Auto-save debounce as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }
}
