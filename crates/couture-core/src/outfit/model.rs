use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Number of variations every category must carry.
pub const VARIATIONS_PER_CATEGORY: usize = 3;

/// The three fixed outfit categories.
///
/// The kind is the identity of a category within one suggestion set.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum OutfitKind {
    Formal,
    Casual,
    Stylish,
}

impl OutfitKind {
    /// Lowercase, dash-separated form used in file names.
    pub fn slug(&self) -> String {
        self.to_string().to_lowercase().replace(' ', "-")
    }
}

/// One complete outfit composition within a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitVariation {
    /// Stylist's rationale for the look
    pub description: String,
    /// Garment names, in the order the stylist listed them
    pub items: Vec<String>,
}

impl OutfitVariation {
    pub fn new(description: impl Into<String>, items: Vec<String>) -> Self {
        Self {
            description: description.into(),
            items,
        }
    }
}

/// A category of suggestions with its variations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutfitCategory {
    pub kind: OutfitKind,
    pub variations: Vec<OutfitVariation>,
}

impl OutfitCategory {
    pub fn new(kind: OutfitKind, variations: Vec<OutfitVariation>) -> Self {
        Self { kind, variations }
    }

    pub fn variation_count(&self) -> usize {
        self.variations.len()
    }
}
