//! Favorites file DTO.
//!
//! ```toml
//! schema_version = 1
//!
//! [[favorite]]
//! image_ref = "data:image/png;base64,..."
//! added_at = "2025-06-01T10:00:00Z"
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use couture_core::image::ImageRef;

pub const FAVORITES_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoritesFile {
    pub schema_version: u32,
    #[serde(default, rename = "favorite")]
    pub entries: Vec<FavoriteEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub image_ref: ImageRef,
    pub added_at: DateTime<Utc>,
}

impl Default for FavoritesFile {
    fn default() -> Self {
        Self {
            schema_version: FAVORITES_SCHEMA_VERSION,
            entries: Vec::new(),
        }
    }
}

impl FavoritesFile {
    pub fn contains(&self, reference: &ImageRef) -> bool {
        self.entries.iter().any(|e| &e.image_ref == reference)
    }

    /// Appends unless present. Returns whether the set changed.
    pub fn insert(&mut self, reference: &ImageRef, added_at: DateTime<Utc>) -> bool {
        if self.contains(reference) {
            return false;
        }
        self.entries.push(FavoriteEntry {
            image_ref: reference.clone(),
            added_at,
        });
        true
    }

    /// Returns whether the set changed.
    pub fn remove(&mut self, reference: &ImageRef) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| &e.image_ref != reference);
        self.entries.len() != before
    }

    pub fn references(&self) -> Vec<ImageRef> {
        self.entries.iter().map(|e| e.image_ref.clone()).collect()
    }
}
