use serde::{Deserialize, Serialize};

use crate::image::ImageRef;

/// What one try-on variation slot should display.
///
/// Selection priority is loading, then error, then results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "camelCase")]
pub enum VariationView {
    NotGenerated,
    Loading,
    Failed(String),
    Ready(Vec<ImageRef>),
}

impl VariationView {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn images(&self) -> &[ImageRef] {
        match self {
            Self::Ready(images) => images,
            _ => &[],
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}
