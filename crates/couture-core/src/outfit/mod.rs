//! Outfit suggestion domain.
//!
//! A suggestion set holds up to one [`OutfitCategory`] per [`OutfitKind`],
//! each with exactly [`VARIATIONS_PER_CATEGORY`] variations.

mod model;
mod validation;

pub use model::{OutfitCategory, OutfitKind, OutfitVariation, VARIATIONS_PER_CATEGORY};
pub use validation::validate_suggestions;
