//! Generation Gateway trait.

use async_trait::async_trait;

use super::error::GenerationError;
use crate::image::{ImageRef, UploadedImage};
use crate::outfit::OutfitCategory;

/// Everything the backend needs to suggest outfits for one photo.
#[derive(Debug, Clone)]
pub struct SuggestionRequest {
    pub image: UploadedImage,
    pub season: String,
    pub occasion: String,
    /// Ask for the long-form stylist dossier instead of the standard brief
    pub in_depth: bool,
}

/// The external AI backend, seen through the two request shapes the
/// workflow uses.
///
/// # Implementation Notes
///
/// - `suggest_outfits` must hand back categories that already passed
///   [`crate::outfit::validate_suggestions`]; zero categories is an error.
/// - `render_try_on` attempts several independent renders; individual
///   failures are logged and skipped, and the call fails only when nothing
///   was produced. A shorter list is a valid partial success.
#[async_trait]
pub trait GenerationGateway: Send + Sync {
    /// Suggests outfit categories for the photo, season and occasion.
    async fn suggest_outfits(
        &self,
        request: &SuggestionRequest,
    ) -> Result<Vec<OutfitCategory>, GenerationError>;

    /// Renders the person in `image` wearing the described outfit.
    async fn render_try_on(
        &self,
        image: &UploadedImage,
        outfit_description: &str,
    ) -> Result<Vec<ImageRef>, GenerationError>;
}
