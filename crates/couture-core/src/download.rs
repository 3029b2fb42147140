//! Deterministic file names for exported try-on images.

use crate::image::ImageRef;
use crate::outfit::OutfitKind;

const FILE_PREFIX: &str = "couture-ai";

/// File name for the `index`-th rendered image of a category.
///
/// Produces `couture-ai-<kind>-<index + 1>.<ext>`, where the extension is
/// taken from the reference's `image/<subtype>` MIME prefix.
pub fn download_file_name(kind: OutfitKind, index: usize, reference: &ImageRef) -> String {
    format!(
        "{FILE_PREFIX}-{}-{}.{}",
        kind.slug(),
        index + 1,
        reference.extension()
    )
}
