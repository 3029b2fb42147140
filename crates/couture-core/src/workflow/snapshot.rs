use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::state::{WorkflowAction, WorkflowState};
use super::view::VariationView;
use crate::outfit::{OutfitCategory, OutfitKind};

/// The try-on view currently on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TryOnSelection {
    pub kind: OutfitKind,
    pub variation_index: usize,
}

/// Read-only view of a session, published after every transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Changes on every full reset
    pub session_id: Uuid,
    pub state: WorkflowState,
    /// MIME type of the uploaded photo, if one is held
    pub image_mime_type: Option<String>,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub suggestions: Vec<OutfitCategory>,
    pub active_try_on: Option<TryOnSelection>,
    /// What the active try-on slot should show
    pub active_view: Option<VariationView>,
    pub last_error: Option<String>,
    pub actions: Vec<WorkflowAction>,
}

impl SessionSnapshot {
    pub fn has_image(&self) -> bool {
        self.image_mime_type.is_some()
    }

    pub fn category(&self, kind: OutfitKind) -> Option<&OutfitCategory> {
        self.suggestions.iter().find(|c| c.kind == kind)
    }
}
