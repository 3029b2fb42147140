use serde::{Deserialize, Serialize};
use strum::Display;

/// Where a styling session currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum WorkflowState {
    Home,
    AwaitingUpload,
    AwaitingSeason,
    AwaitingOccasion,
    GeneratingSuggestions,
    SuggestionsReady,
    ViewingTryOn,
    Failed,
}

/// User actions the presentation layer can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum WorkflowAction {
    Begin,
    UploadImage,
    SelectSeason,
    SelectOccasion,
    OpenTryOn,
    SelectVariation,
    BackToSuggestions,
    Reset,
}

impl WorkflowAction {
    /// Verb phrase used in rejection messages.
    pub fn label(&self) -> &'static str {
        match self {
            WorkflowAction::Begin => "begin a session",
            WorkflowAction::UploadImage => "upload an image",
            WorkflowAction::SelectSeason => "select a season",
            WorkflowAction::SelectOccasion => "select an occasion",
            WorkflowAction::OpenTryOn => "open a try-on",
            WorkflowAction::SelectVariation => "select a variation",
            WorkflowAction::BackToSuggestions => "go back to suggestions",
            WorkflowAction::Reset => "reset",
        }
    }
}

impl WorkflowState {
    /// Actions accepted in this state.
    ///
    /// `GeneratingSuggestions` only accepts a reset, which is what keeps a
    /// second suggestion request from starting while one is in flight.
    pub fn available_actions(&self) -> &'static [WorkflowAction] {
        use WorkflowAction::*;
        match self {
            WorkflowState::Home => &[Begin],
            WorkflowState::AwaitingUpload => &[UploadImage, Reset],
            WorkflowState::AwaitingSeason => &[SelectSeason, Reset],
            WorkflowState::AwaitingOccasion => &[SelectOccasion, Reset],
            WorkflowState::GeneratingSuggestions => &[Reset],
            WorkflowState::SuggestionsReady => &[OpenTryOn, Reset],
            WorkflowState::ViewingTryOn => {
                &[OpenTryOn, SelectVariation, BackToSuggestions, Reset]
            }
            WorkflowState::Failed => &[Reset],
        }
    }

    pub fn allows(&self, action: WorkflowAction) -> bool {
        self.available_actions().contains(&action)
    }

    /// States in which the suggestion list is populated.
    pub fn has_suggestions(&self) -> bool {
        matches!(
            self,
            WorkflowState::SuggestionsReady | WorkflowState::ViewingTryOn
        )
    }
}
