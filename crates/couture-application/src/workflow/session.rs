use std::sync::Arc;
use uuid::Uuid;

use couture_core::image::UploadedImage;
use couture_core::outfit::{OutfitCategory, OutfitKind};
use couture_core::workflow::{SessionSnapshot, TryOnSelection, WorkflowState};

use crate::try_on::{TryOnCache, TryOnSession};

/// Mutable state of one styling session.
///
/// A reset replaces the whole value, which gives it a new id; work started
/// under the old id compares ids before applying anything.
pub(super) struct SessionData {
    pub id: Uuid,
    pub state: WorkflowState,
    pub image: Option<UploadedImage>,
    pub season: Option<String>,
    pub occasion: Option<String>,
    pub suggestions: Vec<OutfitCategory>,
    pub active_try_on: Option<TryOnSelection>,
    pub last_error: Option<String>,
    pub try_on: TryOnCache,
}

impl SessionData {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            state: WorkflowState::Home,
            image: None,
            season: None,
            occasion: None,
            suggestions: Vec::new(),
            active_try_on: None,
            last_error: None,
            try_on: TryOnCache::new(),
        }
    }

    /// Moves to `next` and clears the last error.
    pub fn advance(&mut self, next: WorkflowState) {
        tracing::debug!(session_id = %self.id, from = %self.state, to = %next, "Workflow transition");
        self.state = next;
        self.last_error = None;
    }

    /// Moves to `Failed` with a user-facing message.
    pub fn fail(&mut self, message: String) {
        tracing::debug!(session_id = %self.id, from = %self.state, "Workflow failed");
        self.state = WorkflowState::Failed;
        self.suggestions.clear();
        self.active_try_on = None;
        self.try_on.clear();
        self.last_error = Some(message);
    }

    pub fn category(&self, kind: OutfitKind) -> Option<&OutfitCategory> {
        self.suggestions.iter().find(|c| c.kind == kind)
    }

    pub fn active_session(&self) -> Option<(Arc<TryOnSession>, usize)> {
        let selection = self.active_try_on?;
        let session = self.try_on.get(selection.kind)?;
        Some((session, selection.variation_index))
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        let active_view = match self.active_session() {
            Some((session, index)) => session.view(index).await.ok(),
            None => None,
        };

        SessionSnapshot {
            session_id: self.id,
            state: self.state,
            image_mime_type: self.image.as_ref().map(|i| i.mime_type().to_string()),
            season: self.season.clone(),
            occasion: self.occasion.clone(),
            suggestions: self.suggestions.clone(),
            active_try_on: self.active_try_on,
            active_view,
            last_error: self.last_error.clone(),
            actions: self.state.available_actions().to_vec(),
        }
    }
}
