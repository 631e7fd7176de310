use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};

use crate::model::ApiKey;

/// Name under which the API key is persisted.
pub const API_KEY_STORAGE_NAME: &str = "openWeatherApiKey";

/// On-disk document. Holds exactly one value.
///
/// Example TOML:
/// openWeatherApiKey = "..."
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoredConfig {
    #[serde(rename = "openWeatherApiKey", default, skip_serializing_if = "Option::is_none")]
    api_key: Option<String>,
}

/// Durable storage for the API key.
///
/// Neither `load` nor `save` report errors to the caller: a store without a
/// backing file behaves like one that was never written to.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: Option<PathBuf>,
}

impl ConfigStore {
    /// Store in the platform config directory, or an unavailable store if
    /// that directory cannot be determined.
    pub fn from_platform_dirs() -> Self {
        match Self::default_config_path() {
            Ok(path) => Self::at(path),
            Err(err) => {
                warn!(error = %err, "No persistent storage available; API key will not be kept");
                Self::unavailable()
            }
        }
    }

    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: Some(path.into()) }
    }

    /// Store with no backing storage at all.
    pub fn unavailable() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Path to the config file.
    pub fn default_config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "ecomonitor", "ecomonitor")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Previously saved key, or the empty key.
    pub fn load(&self) -> ApiKey {
        let Some(path) = self.path.as_deref() else {
            debug!("Config store unavailable; returning empty API key");
            return ApiKey::default();
        };

        match read_key(path) {
            Ok(key) => key,
            Err(err) => {
                let error = format!("{err:#}");
                warn!(%error, "Ignoring unreadable configuration");
                ApiKey::default()
            }
        }
    }

    /// Persist `key`, overwriting any previous value. Failures are logged and dropped.
    pub fn save(&self, key: &ApiKey) {
        let Some(path) = self.path.as_deref() else {
            debug!("Config store unavailable; API key not persisted");
            return;
        };

        match write_key(path, key) {
            Ok(()) => debug!(path = %path.display(), key = %key.redacted(), "Saved API key"),
            Err(err) => {
                let error = format!("{err:#}");
                warn!(%error, "Failed to persist API key");
            }
        }
    }
}

fn read_key(path: &Path) -> Result<ApiKey> {
    if !path.exists() {
        // First run: nothing saved yet.
        return Ok(ApiKey::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let stored: StoredConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

    Ok(stored.api_key.map(ApiKey::from).unwrap_or_default())
}

fn write_key(path: &Path, key: &ApiKey) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }

    let stored = StoredConfig { api_key: Some(key.as_str().to_string()) };
    let toml =
        toml::to_string_pretty(&stored).context("Failed to serialize configuration to TOML")?;

    fs::write(path, toml)
        .with_context(|| format!("Failed to write config file: {}", path.display()))?;

    Ok(())
}
