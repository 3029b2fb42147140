use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use couture_core::error::{CoutureError, Result};
use couture_core::generation::{GenerationGateway, SuggestionRequest};
use couture_core::image::ImageSource;
use couture_core::outfit::{OutfitKind, validate_suggestions};
use couture_core::workflow::{
    INTAKE_FAILURE_MESSAGE, SessionSnapshot, TryOnSelection, VariationView, WorkflowAction,
    WorkflowState, suggestion_failure_message,
};

use super::session::SessionData;
use crate::try_on::{RequestOutcome, TryOnSession};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkflowOptions {
    /// Ask for the long-form stylist dossier
    pub in_depth: bool,
}

/// Drives one styling session from photo upload to try-on renders.
///
/// The session lock is never held across a gateway call or an image read.
/// Long-running steps remember the session id they started under and
/// discard their result if a reset happened meanwhile.
///
/// Every transition publishes a [`SessionSnapshot`] to subscribers.
pub struct StylingWorkflow {
    gateway: Arc<dyn GenerationGateway>,
    options: WorkflowOptions,
    session: Mutex<SessionData>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

impl StylingWorkflow {
    pub fn new(gateway: Arc<dyn GenerationGateway>) -> Self {
        Self::with_options(gateway, WorkflowOptions::default())
    }

    pub fn with_options(gateway: Arc<dyn GenerationGateway>, options: WorkflowOptions) -> Self {
        let session = SessionData::new();
        let (snapshot_tx, _) = watch::channel(SessionSnapshot {
            session_id: session.id,
            state: session.state,
            image_mime_type: None,
            season: None,
            occasion: None,
            suggestions: Vec::new(),
            active_try_on: None,
            active_view: None,
            last_error: None,
            actions: session.state.available_actions().to_vec(),
        });

        Self {
            gateway,
            options,
            session: Mutex::new(session),
            snapshot_tx,
        }
    }

    // ============================================================================
    // Observation
    // ============================================================================

    /// Receives a snapshot after every transition.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.session.lock().await.snapshot().await
    }

    pub async fn state(&self) -> WorkflowState {
        self.session.lock().await.state
    }

    pub async fn available_actions(&self) -> Vec<WorkflowAction> {
        self.state().await.available_actions().to_vec()
    }

    pub async fn session_id(&self) -> Uuid {
        self.session.lock().await.id
    }

    async fn publish(&self, data: &SessionData) {
        self.snapshot_tx.send_replace(data.snapshot().await);
    }

    async fn publish_if_current(&self, id: Uuid) -> bool {
        let data = self.session.lock().await;
        if data.id != id {
            return false;
        }
        self.publish(&data).await;
        true
    }

    async fn lock_for(&self, action: WorkflowAction) -> Result<MutexGuard<'_, SessionData>> {
        let data = self.session.lock().await;
        if !data.state.allows(action) {
            return Err(CoutureError::invalid_transition(data.state, action.label()));
        }
        Ok(data)
    }

    // ============================================================================
    // Transitions
    // ============================================================================

    /// Home → AwaitingUpload.
    pub async fn begin(&self) -> Result<()> {
        let mut data = self.lock_for(WorkflowAction::Begin).await?;
        data.advance(WorkflowState::AwaitingUpload);
        tracing::info!(session_id = %data.id, "Styling session started");
        self.publish(&data).await;
        Ok(())
    }

    /// AwaitingUpload → AwaitingSeason, or Failed when the image cannot be read.
    pub async fn upload_image(&self, source: &dyn ImageSource) -> Result<()> {
        let id = self.lock_for(WorkflowAction::UploadImage).await?.id;

        let read = source.read_image().await;

        let mut data = self.session.lock().await;
        if data.id != id || data.state != WorkflowState::AwaitingUpload {
            tracing::debug!(session_id = %id, "Discarding image read for a replaced session");
            return Err(CoutureError::cancelled("session changed while reading the image"));
        }

        match read {
            Ok(image) => {
                tracing::info!(
                    session_id = %id,
                    mime_type = %image.mime_type(),
                    bytes = image.len(),
                    "Image uploaded"
                );
                data.image = Some(image);
                data.advance(WorkflowState::AwaitingSeason);
                self.publish(&data).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(session_id = %id, error = %e, "Failed to read uploaded image");
                data.fail(INTAKE_FAILURE_MESSAGE.to_string());
                self.publish(&data).await;
                Err(match e {
                    CoutureError::Intake(_) => e,
                    other => CoutureError::intake(other.to_string()),
                })
            }
        }
    }

    /// AwaitingSeason → AwaitingOccasion.
    pub async fn select_season(&self, season: &str) -> Result<()> {
        let season = non_blank(season, "season")?;
        let mut data = self.lock_for(WorkflowAction::SelectSeason).await?;
        tracing::info!(session_id = %data.id, season = %season, "Season selected");
        data.season = Some(season);
        data.advance(WorkflowState::AwaitingOccasion);
        self.publish(&data).await;
        Ok(())
    }

    /// AwaitingOccasion → GeneratingSuggestions → SuggestionsReady | Failed.
    ///
    /// Resolves once the suggestion call has. While it runs, the state stays
    /// `GeneratingSuggestions` and a second call is rejected.
    pub async fn select_occasion(&self, occasion: &str) -> Result<()> {
        let occasion = non_blank(occasion, "occasion")?;

        let (id, request) = {
            let mut data = self.lock_for(WorkflowAction::SelectOccasion).await?;
            let image = data
                .image
                .clone()
                .ok_or_else(|| CoutureError::internal("no uploaded image in session"))?;
            let season = data
                .season
                .clone()
                .ok_or_else(|| CoutureError::internal("no season in session"))?;

            data.occasion = Some(occasion.clone());
            data.advance(WorkflowState::GeneratingSuggestions);
            self.publish(&data).await;

            let request = SuggestionRequest {
                image,
                season,
                occasion,
                in_depth: self.options.in_depth,
            };
            (data.id, request)
        };

        tracing::info!(
            session_id = %id,
            season = %request.season,
            occasion = %request.occasion,
            in_depth = request.in_depth,
            "Generating outfit suggestions"
        );
        let result = self
            .gateway
            .suggest_outfits(&request)
            .await
            .and_then(validate_suggestions);

        let mut data = self.session.lock().await;
        if data.id != id || data.state != WorkflowState::GeneratingSuggestions {
            tracing::debug!(session_id = %id, "Discarding suggestions for a replaced session");
            return Err(CoutureError::cancelled(
                "session was reset while generating suggestions",
            ));
        }

        match result {
            Ok(categories) => {
                tracing::info!(session_id = %id, categories = categories.len(), "Suggestions ready");
                data.suggestions = categories;
                data.advance(WorkflowState::SuggestionsReady);
                self.publish(&data).await;
                Ok(())
            }
            Err(e) => {
                tracing::error!(session_id = %id, error = %e, "Suggestion generation failed");
                data.fail(suggestion_failure_message(&e));
                self.publish(&data).await;
                Err(e.into())
            }
        }
    }

    /// SuggestionsReady | ViewingTryOn → ViewingTryOn.
    ///
    /// Creates the category's try-on cache on first use and reuses it
    /// afterwards. Nothing is rendered here.
    pub async fn open_try_on(&self, kind: OutfitKind, variation_index: usize) -> Result<()> {
        let mut data = self.lock_for(WorkflowAction::OpenTryOn).await?;

        let category = data
            .category(kind)
            .cloned()
            .ok_or_else(|| CoutureError::not_found("outfit category", kind.to_string()))?;
        check_variation(kind, variation_index, category.variation_count())?;
        let image = data
            .image
            .clone()
            .ok_or_else(|| CoutureError::internal("no uploaded image in session"))?;

        let id = data.id;
        let gateway = Arc::clone(&self.gateway);
        data.try_on
            .get_or_insert_with(kind, || TryOnSession::new(id, &category, image, gateway));
        data.active_try_on = Some(TryOnSelection {
            kind,
            variation_index,
        });
        data.advance(WorkflowState::ViewingTryOn);
        tracing::info!(session_id = %id, kind = %kind, variation = variation_index, "Try-on opened");
        self.publish(&data).await;
        Ok(())
    }

    /// Switches the variation shown in the active try-on.
    ///
    /// Renders running for other variations continue.
    pub async fn select_variation(&self, variation_index: usize) -> Result<()> {
        let mut data = self.lock_for(WorkflowAction::SelectVariation).await?;
        let selection = data
            .active_try_on
            .ok_or_else(|| CoutureError::internal("no active try-on"))?;
        let count = data
            .category(selection.kind)
            .map(|c| c.variation_count())
            .unwrap_or_default();
        check_variation(selection.kind, variation_index, count)?;

        data.active_try_on = Some(TryOnSelection {
            kind: selection.kind,
            variation_index,
        });
        self.publish(&data).await;
        Ok(())
    }

    /// ViewingTryOn → SuggestionsReady. Try-on caches are kept.
    pub async fn back_to_suggestions(&self) -> Result<()> {
        let mut data = self.lock_for(WorkflowAction::BackToSuggestions).await?;
        data.active_try_on = None;
        data.advance(WorkflowState::SuggestionsReady);
        self.publish(&data).await;
        Ok(())
    }

    /// Any state → Home. Drops the image, suggestions and try-on caches.
    ///
    /// Work still in flight for the old session completes into caches
    /// nobody reads any more.
    pub async fn reset(&self) {
        let mut data = self.session.lock().await;
        let previous = data.id;
        *data = SessionData::new();
        tracing::info!(previous = %previous, session_id = %data.id, "Session reset");
        self.publish(&data).await;
    }

    // ============================================================================
    // Try-on rendering
    // ============================================================================

    /// Renders one variation of an opened category, unless cached or in
    /// flight.
    ///
    /// # Returns
    ///
    /// - `Ok(outcome)`: How the request was resolved
    /// - `Err(Cancelled)`: The session was reset before the render finished
    /// - `Err(NotFound)`: No try-on was opened for `kind`
    pub async fn request_variation(
        &self,
        kind: OutfitKind,
        variation_index: usize,
    ) -> Result<RequestOutcome> {
        // the slot is claimed under the session lock, so a reset cannot slip
        // in between the state check and the claim
        let (id, session) = {
            let data = self.session.lock().await;
            if !data.state.has_suggestions() {
                return Err(CoutureError::invalid_transition(data.state, "render a try-on"));
            }
            let session = data
                .try_on
                .get(kind)
                .ok_or_else(|| CoutureError::not_found("try-on session", kind.to_string()))?;
            if let Some(outcome) = session.begin(variation_index).await? {
                return Ok(outcome);
            }
            (data.id, session)
        };

        if !self.publish_if_current(id).await {
            session.abandon(variation_index).await;
            return Err(CoutureError::cancelled("session was reset before rendering"));
        }

        let outcome = session.render(variation_index).await;

        if !self.publish_if_current(id).await {
            tracing::debug!(session_id = %id, kind = %kind, "Render finished for a replaced session");
            return Err(CoutureError::cancelled("session was reset while rendering"));
        }
        Ok(outcome)
    }

    /// Renders the variation currently on screen.
    pub async fn request_active_variation(&self) -> Result<RequestOutcome> {
        let selection = {
            let data = self.session.lock().await;
            data.active_try_on.ok_or_else(|| {
                CoutureError::invalid_transition(data.state, "render without an open try-on")
            })?
        };
        self.request_variation(selection.kind, selection.variation_index)
            .await
    }

    /// Starts [`Self::request_variation`] in the background.
    pub fn spawn_variation(
        self: &Arc<Self>,
        kind: OutfitKind,
        variation_index: usize,
    ) -> JoinHandle<Result<RequestOutcome>> {
        let workflow = Arc::clone(self);
        tokio::spawn(async move { workflow.request_variation(kind, variation_index).await })
    }

    pub async fn variation_view(
        &self,
        kind: OutfitKind,
        variation_index: usize,
    ) -> Result<VariationView> {
        let session = self
            .try_on_session(kind)
            .await
            .ok_or_else(|| CoutureError::not_found("try-on session", kind.to_string()))?;
        session.view(variation_index).await
    }

    pub async fn try_on_session(&self, kind: OutfitKind) -> Option<Arc<TryOnSession>> {
        self.session.lock().await.try_on.get(kind)
    }
}

fn non_blank(value: &str, what: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CoutureError::validation(format!("{what} must not be empty")));
    }
    Ok(trimmed.to_string())
}

fn check_variation(kind: OutfitKind, index: usize, count: usize) -> Result<()> {
    if index >= count {
        return Err(CoutureError::validation(format!(
            "variation index {index} out of range for {kind} ({count} variations)"
        )));
    }
    Ok(())
}
