//! Configuration loading.
//!
//! Reads `config.toml` from the platform config directory (or an explicit
//! path) and resolves the Gemini API key against the environment.

use std::path::{Path, PathBuf};

use couture_core::config::AppConfig;
use couture_core::error::{CoutureError, Result};

use crate::paths::CouturePaths;

/// Environment variables consulted for the API key, in order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["COUTURE_API_KEY", "GEMINI_API_KEY", "API_KEY"];

pub const MISSING_API_KEY_MESSAGE: &str = "API_KEY environment variable not set.";

#[derive(Debug, Clone)]
pub struct ConfigService {
    path: PathBuf,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Service for `config.toml` in the platform config directory.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(CouturePaths::resolve()?.config_file()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the configuration. A missing file yields the defaults.
    pub async fn load(&self) -> Result<AppConfig> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "No config file, using defaults");
                return Ok(AppConfig::default());
            }
            Err(e) => {
                return Err(CoutureError::config(format!(
                    "Failed to read {}: {e}",
                    self.path.display()
                )));
            }
        };

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            CoutureError::config(format!("Invalid config file {}: {e}", self.path.display()))
        })?;
        tracing::debug!(path = %self.path.display(), "Loaded config");
        Ok(config)
    }
}

/// Resolves the API key from the config file first, then the environment.
pub fn resolve_api_key(config: &AppConfig) -> Result<String> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// Same as [`resolve_api_key`] with an injectable environment lookup.
pub fn resolve_api_key_with<F>(config: &AppConfig, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    let from_file = config
        .gemini
        .api_key
        .as_deref()
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string);

    from_file
        .or_else(|| {
            API_KEY_ENV_VARS
                .iter()
                .filter_map(|name| lookup(name))
                .map(|key| key.trim().to_string())
                .find(|key| !key.is_empty())
        })
        .ok_or_else(|| CoutureError::config(MISSING_API_KEY_MESSAGE))
}
