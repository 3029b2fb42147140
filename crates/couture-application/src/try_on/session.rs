use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use couture_core::error::{CoutureError, Result};
use couture_core::generation::{GenerationError, GenerationGateway};
use couture_core::image::{ImageRef, UploadedImage};
use couture_core::outfit::{OutfitCategory, OutfitKind, OutfitVariation};
use couture_core::workflow::{VariationView, render_failure_message};

use super::slot::VariationSlot;

const NO_IMAGES_CAUSE: &str = "The AI model failed to generate any images";

/// How a `request_variation` call was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestOutcome {
    /// Results were already present; nothing was rendered
    Cached,
    /// A render for this index was already running; nothing was started
    InFlight,
    /// A render ran and stored this many images
    Rendered(usize),
    /// A render ran and failed; the slot now holds this message
    Failed(String),
}

/// Try-on renders for the variations of one category.
///
/// Each variation index has its own slot. At most one render per index is
/// in flight; different indices render independently. Completed results
/// are kept for the lifetime of the session, and a failure stays in its
/// slot until the index is requested again.
pub struct TryOnSession {
    session_id: Uuid,
    kind: OutfitKind,
    image: UploadedImage,
    variations: Vec<OutfitVariation>,
    gateway: Arc<dyn GenerationGateway>,
    slots: Mutex<Vec<VariationSlot>>,
}

impl TryOnSession {
    pub fn new(
        session_id: Uuid,
        category: &OutfitCategory,
        image: UploadedImage,
        gateway: Arc<dyn GenerationGateway>,
    ) -> Self {
        Self {
            session_id,
            kind: category.kind,
            image,
            variations: category.variations.clone(),
            gateway,
            slots: Mutex::new(vec![VariationSlot::Idle; category.variation_count()]),
        }
    }

    /// The workflow session this cache belongs to.
    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn kind(&self) -> OutfitKind {
        self.kind
    }

    pub fn variation_count(&self) -> usize {
        self.variations.len()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.variations.len() {
            return Err(CoutureError::validation(format!(
                "variation index {index} out of range for {} ({} variations)",
                self.kind,
                self.variations.len()
            )));
        }
        Ok(())
    }

    /// Renders variation `index` unless it is cached or already rendering.
    ///
    /// # Returns
    ///
    /// - `Ok(Cached)` / `Ok(InFlight)`: No render call was made
    /// - `Ok(Rendered(n))`: Results stored
    /// - `Ok(Failed(msg))`: Error stored in the slot
    /// - `Err(_)`: `index` is out of range
    pub async fn request_variation(&self, index: usize) -> Result<RequestOutcome> {
        if let Some(outcome) = self.begin(index).await? {
            return Ok(outcome);
        }
        Ok(self.render(index).await)
    }

    /// First phase of a request: claims the slot for rendering.
    ///
    /// Returns `Some` when no render is needed. On `None` the slot is now
    /// `Loading` and the caller must follow up with [`Self::render`].
    pub(crate) async fn begin(&self, index: usize) -> Result<Option<RequestOutcome>> {
        self.check_index(index)?;

        let mut slots = self.slots.lock().await;
        match &slots[index] {
            VariationSlot::Ready(_) => {
                tracing::debug!(kind = %self.kind, variation = index, "Try-on cached");
                Ok(Some(RequestOutcome::Cached))
            }
            VariationSlot::Loading => {
                tracing::debug!(kind = %self.kind, variation = index, "Try-on already rendering");
                Ok(Some(RequestOutcome::InFlight))
            }
            VariationSlot::Idle | VariationSlot::Failed(_) => {
                slots[index] = VariationSlot::Loading;
                Ok(None)
            }
        }
    }

    /// Releases a slot claimed by [`Self::begin`] that will not be rendered.
    pub(crate) async fn abandon(&self, index: usize) {
        let mut slots = self.slots.lock().await;
        if let Some(slot @ VariationSlot::Loading) = slots.get_mut(index) {
            *slot = VariationSlot::Idle;
        }
    }

    /// Second phase: calls the gateway and records the terminal outcome.
    pub(crate) async fn render(&self, index: usize) -> RequestOutcome {
        let description = &self.variations[index].description;

        tracing::info!(
            session_id = %self.session_id,
            kind = %self.kind,
            variation = index,
            "Rendering try-on"
        );

        let (slot, outcome) = match self.gateway.render_try_on(&self.image, description).await {
            Ok(images) if !images.is_empty() => {
                let count = images.len();
                tracing::info!(kind = %self.kind, variation = index, images = count, "Try-on ready");
                (VariationSlot::Ready(images), RequestOutcome::Rendered(count))
            }
            Ok(_) => {
                let message =
                    render_failure_message(GenerationError::Empty(NO_IMAGES_CAUSE.to_string()));
                tracing::warn!(kind = %self.kind, variation = index, "Try-on returned no images");
                (
                    VariationSlot::Failed(message.clone()),
                    RequestOutcome::Failed(message),
                )
            }
            Err(e) => {
                tracing::warn!(kind = %self.kind, variation = index, error = %e, "Try-on failed");
                let message = render_failure_message(&e);
                (
                    VariationSlot::Failed(message.clone()),
                    RequestOutcome::Failed(message),
                )
            }
        };

        let mut slots = self.slots.lock().await;
        slots[index] = slot;
        outcome
    }

    /// Display state of `index`: loading, then error, then results.
    pub async fn view(&self, index: usize) -> Result<VariationView> {
        self.check_index(index)?;
        Ok(self.slots.lock().await[index].view())
    }

    pub async fn views(&self) -> Vec<VariationView> {
        self.slots.lock().await.iter().map(VariationSlot::view).collect()
    }

    /// Stored images, empty when nothing has been generated.
    pub async fn results(&self, index: usize) -> Vec<ImageRef> {
        match self.slots.lock().await.get(index) {
            Some(VariationSlot::Ready(images)) => images.clone(),
            _ => Vec::new(),
        }
    }

    pub async fn is_loading(&self, index: usize) -> bool {
        matches!(
            self.slots.lock().await.get(index),
            Some(VariationSlot::Loading)
        )
    }

    pub async fn error(&self, index: usize) -> Option<String> {
        match self.slots.lock().await.get(index) {
            Some(VariationSlot::Failed(message)) => Some(message.clone()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use couture_core::generation::SuggestionRequest;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Gateway that renders from a scripted queue of responses.
    struct ScriptedGateway {
        responses: std::sync::Mutex<Vec<std::result::Result<Vec<ImageRef>, GenerationError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGateway {
        fn new(responses: Vec<std::result::Result<Vec<ImageRef>, GenerationError>>) -> Self {
            Self {
                responses: std::sync::Mutex::new(responses),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl GenerationGateway for ScriptedGateway {
        async fn suggest_outfits(
            &self,
            _request: &SuggestionRequest,
        ) -> std::result::Result<Vec<OutfitCategory>, GenerationError> {
            unreachable!("try-on sessions never ask for suggestions")
        }

        async fn render_try_on(
            &self,
            _image: &UploadedImage,
            _outfit_description: &str,
        ) -> std::result::Result<Vec<ImageRef>, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses.lock().unwrap().remove(0)
        }
    }

    fn category() -> OutfitCategory {
        OutfitCategory::new(
            OutfitKind::Formal,
            (1..=3)
                .map(|n| OutfitVariation::new(format!("Look {n}"), vec![format!("Item {n}")]))
                .collect(),
        )
    }

    fn session(gateway: Arc<ScriptedGateway>) -> TryOnSession {
        let image = UploadedImage::new(b"photo".to_vec(), "image/png").unwrap();
        TryOnSession::new(Uuid::new_v4(), &category(), image, gateway)
    }

    #[tokio::test]
    async fn test_abandoned_claim_is_released() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(vec![ImageRef::from("img-a")])]));
        let session = session(gateway.clone());

        assert_eq!(session.begin(1).await.unwrap(), None);
        assert!(session.is_loading(1).await);

        session.abandon(1).await;
        assert!(!session.is_loading(1).await);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);

        assert_eq!(session.request_variation(1).await.unwrap(), RequestOutcome::Rendered(1));
    }

    #[tokio::test]
    async fn test_second_request_uses_cache() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(vec![ImageRef::from("img-a")])]));
        let session = session(gateway.clone());

        assert_eq!(session.request_variation(0).await.unwrap(), RequestOutcome::Rendered(1));
        assert_eq!(session.request_variation(0).await.unwrap(), RequestOutcome::Cached);
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 1);
        assert_eq!(session.results(0).await, vec![ImageRef::from("img-a")]);
    }

    #[tokio::test]
    async fn test_empty_render_is_a_failure() {
        let gateway = Arc::new(ScriptedGateway::new(vec![Ok(Vec::new())]));
        let session = session(gateway);

        let outcome = session.request_variation(1).await.unwrap();
        assert!(matches!(outcome, RequestOutcome::Failed(_)));
        assert!(session.results(1).await.is_empty());
        assert_eq!(
            session.error(1).await.as_deref(),
            Some(
                "Failed to generate try-on images: The AI model failed to generate any images. Please try again."
            )
        );
        assert!(!session.is_loading(1).await);
    }

    #[tokio::test]
    async fn test_error_is_sticky_until_rerequested() {
        let gateway = Arc::new(ScriptedGateway::new(vec![
            Err(GenerationError::Transport("connection reset".to_string())),
            Ok(vec![ImageRef::from("img-b")]),
        ]));
        let session = session(gateway);

        session.request_variation(2).await.unwrap();
        assert!(session.view(2).await.unwrap().error().is_some());
        assert!(session.view(2).await.unwrap().error().is_some());

        assert_eq!(session.request_variation(2).await.unwrap(), RequestOutcome::Rendered(1));
        assert_eq!(
            session.view(2).await.unwrap(),
            VariationView::Ready(vec![ImageRef::from("img-b")])
        );
    }

    #[tokio::test]
    async fn test_index_out_of_range() {
        let gateway = Arc::new(ScriptedGateway::new(Vec::new()));
        let session = session(gateway.clone());

        let err = session.request_variation(3).await.unwrap_err();
        assert!(matches!(err, CoutureError::Validation(_)));
        assert!(session.view(3).await.is_err());
        assert_eq!(gateway.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_slots_show_nothing() {
        let gateway = Arc::new(ScriptedGateway::new(Vec::new()));
        let session = session(gateway);
        assert_eq!(session.views().await, vec![VariationView::NotGenerated; 3]);
    }
}
