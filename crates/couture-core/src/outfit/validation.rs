//! Ingestion-time checks for suggestion responses.

use std::collections::HashSet;

use super::model::{OutfitCategory, VARIATIONS_PER_CATEGORY};
use crate::generation::GenerationError;

/// Checks a decoded suggestion response against the suggestion contract.
///
/// - at least one category (an empty set is a failure, not "no suggestions")
/// - no kind appears twice
/// - every category has exactly [`VARIATIONS_PER_CATEGORY`] variations
/// - every variation has a non-blank description and at least one item
///
/// Fewer than three categories is accepted.
pub fn validate_suggestions(
    categories: Vec<OutfitCategory>,
) -> Result<Vec<OutfitCategory>, GenerationError> {
    if categories.is_empty() {
        return Err(GenerationError::Empty(
            "Could not generate outfit suggestions. The response was empty".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for category in &categories {
        if !seen.insert(category.kind) {
            return Err(GenerationError::Validation(format!(
                "category {} appears more than once",
                category.kind
            )));
        }

        if category.variations.len() != VARIATIONS_PER_CATEGORY {
            return Err(GenerationError::Validation(format!(
                "category {} has {} variations, expected {}",
                category.kind,
                category.variations.len(),
                VARIATIONS_PER_CATEGORY
            )));
        }

        for (index, variation) in category.variations.iter().enumerate() {
            if variation.description.trim().is_empty() {
                return Err(GenerationError::Validation(format!(
                    "{} outfit {} has no description",
                    category.kind,
                    index + 1
                )));
            }
            if variation.items.is_empty() || variation.items.iter().any(|i| i.trim().is_empty()) {
                return Err(GenerationError::Validation(format!(
                    "{} outfit {} has an empty garment list",
                    category.kind,
                    index + 1
                )));
            }
        }
    }

    Ok(categories)
}
