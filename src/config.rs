//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag)
//! 2. `~/.clearbin/config.toml` (user)
//! 3. `/etc/clearbin/config.toml` (system)
//!
//! When no file exists the built-in defaults are used.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::encoder::DEFAULT_MEDIA_TYPE;
use crate::providers::detect::{DEFAULT_ENDPOINT, DEFAULT_TIMEOUT};
use crate::{ClearbinError, Result};

/// Temp file every capture is written to, inside the cache directory.
pub const TEMP_IMAGE_NAME: &str = "photo.jpg";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
}

/// Detect service settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// Detect endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds (default: 30).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Media type label in the image data URI (default: image/jpeg).
    #[serde(default = "default_media_type")]
    pub media_type: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            timeout_secs: default_timeout(),
            media_type: default_media_type(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

fn default_media_type() -> String {
    DEFAULT_MEDIA_TYPE.to_string()
}

/// Capture settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CaptureConfig {
    /// Directory holding the temp image (default: platform cache dir).
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
}

impl CaptureConfig {
    /// Cache directory, falling back to `<platform cache>/clearbin`.
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from(".cache"))
                .join("clearbin")
        })
    }

    /// Full path of the temp image.
    pub fn temp_image_path(&self) -> PathBuf {
        self.cache_dir().join(TEMP_IMAGE_NAME)
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// Resolution order:
    /// 1. Explicit path (if provided; must exist)
    /// 2. `~/.clearbin/config.toml`
    /// 3. `/etc/clearbin/config.toml`
    /// 4. Built-in defaults
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ClearbinError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            ClearbinError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.client.endpoint.trim().is_empty() {
            return Err(ClearbinError::Configuration(
                "client.endpoint must not be empty".to_string(),
            ));
        }
        if self.client.timeout_secs == 0 {
            return Err(ClearbinError::Configuration(
                "client.timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ClearbinError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".clearbin").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/clearbin/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
