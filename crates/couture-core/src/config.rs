//! Application configuration model.
//!
//! Loaded from `config.toml` by `couture-infrastructure`; every field has a
//! default so a missing or partial file still produces a usable config.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_SUGGESTION_MODEL: &str = "gemini-2.5-pro";
pub const DEFAULT_RENDER_MODEL: &str = "gemini-2.5-flash-image";
pub const DEFAULT_RENDER_CANDIDATES: usize = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub gemini: GeminiConfig,
    pub storage: StorageConfig,
    pub styling: StylingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct GeminiConfig {
    /// Falls back to the environment when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    pub base_url: String,
    pub suggestion_model: String,
    pub render_model: String,
    /// Independent render attempts per try-on request
    pub render_candidates: usize,
    pub request_timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            suggestion_model: DEFAULT_SUGGESTION_MODEL.to_string(),
            render_model: DEFAULT_RENDER_MODEL.to_string(),
            render_candidates: DEFAULT_RENDER_CANDIDATES,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    /// Overrides `<data dir>/couture/favorites.toml`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorites_file: Option<PathBuf>,
    /// Overrides the current directory as export target
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct StylingConfig {
    /// Request the long-form stylist dossier by default
    pub in_depth: bool,
    /// Replaces the built-in season presets when non-empty
    pub seasons: Vec<String>,
    /// Replaces the built-in occasion presets when non-empty
    pub occasions: Vec<String>,
}
