//! Season and occasion presets offered to the user.
//!
//! Both lists are suggestions only. Any non-blank value is accepted as a
//! season or occasion.

use crate::config::StylingConfig;

pub const SEASONS: [&str; 4] = ["Summer", "Winter", "Monsoon", "All Year"];

pub const OCCASIONS: [&str; 4] = ["Office Look", "Meeting Look", "Party Look", "Marriage Look"];

/// Presets after applying configuration overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylingCatalog {
    seasons: Vec<String>,
    occasions: Vec<String>,
}

impl Default for StylingCatalog {
    fn default() -> Self {
        Self {
            seasons: SEASONS.iter().map(|s| s.to_string()).collect(),
            occasions: OCCASIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl StylingCatalog {
    /// Built-in presets, replaced per list by any non-empty override.
    pub fn from_config(config: &StylingConfig) -> Self {
        let mut catalog = Self::default();
        if !config.seasons.is_empty() {
            catalog.seasons = config.seasons.clone();
        }
        if !config.occasions.is_empty() {
            catalog.occasions = config.occasions.clone();
        }
        catalog
    }

    pub fn seasons(&self) -> &[String] {
        &self.seasons
    }

    pub fn occasions(&self) -> &[String] {
        &self.occasions
    }

    /// Resolves user input against the presets.
    ///
    /// A case-insensitive preset match returns the preset's spelling;
    /// anything else is returned trimmed. Blank input yields `None`.
    pub fn resolve_season(&self, input: &str) -> Option<String> {
        resolve(&self.seasons, input)
    }

    pub fn resolve_occasion(&self, input: &str) -> Option<String> {
        resolve(&self.occasions, input)
    }
}

fn resolve(presets: &[String], input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    let preset = presets
        .iter()
        .find(|preset| preset.eq_ignore_ascii_case(trimmed))
        .cloned();
    Some(preset.unwrap_or_else(|| trimmed.to_string()))
}
