//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Semaphore, mpsc};

use couture_core::error::{CoutureError, Result};
use couture_core::favorites::FavoritesRepository;
use couture_core::generation::{GenerationError, GenerationGateway, SuggestionRequest};
use couture_core::image::{ImageRef, UploadedImage};
use couture_core::outfit::{OutfitCategory, OutfitKind, OutfitVariation};

pub type Reply<T> = std::result::Result<T, GenerationError>;

pub fn photo() -> UploadedImage {
    UploadedImage::new(b"full-body photo".to_vec(), "image/jpeg").unwrap()
}

pub fn description(kind: OutfitKind, index: usize) -> String {
    format!("{kind} look {}", index + 1)
}

pub fn category(kind: OutfitKind) -> OutfitCategory {
    OutfitCategory::new(
        kind,
        (0..3)
            .map(|i| OutfitVariation::new(description(kind, i), vec![format!("{kind} item {i}")]))
            .collect(),
    )
}

pub fn full_suggestions() -> Vec<OutfitCategory> {
    vec![
        category(OutfitKind::Formal),
        category(OutfitKind::Casual),
        category(OutfitKind::Stylish),
    ]
}

pub fn rendered(description: &str) -> ImageRef {
    ImageRef::from(format!("data:image/png;base64,{}", description.replace(' ', "_")))
}

/// Scriptable Generation Gateway.
///
/// Suggestion replies are served in order (full suggestions once the queue
/// is empty). Render replies are keyed by outfit description and default
/// to one image. Gated calls wait for a semaphore permit before replying,
/// and every call start is reported on the event channel.
#[derive(Default)]
pub struct MockGateway {
    suggestion_replies: Mutex<VecDeque<Reply<Vec<OutfitCategory>>>>,
    suggestion_gate: Mutex<Option<Arc<Semaphore>>>,
    render_replies: Mutex<HashMap<String, Reply<Vec<ImageRef>>>>,
    render_gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    events: Mutex<Option<mpsc::UnboundedSender<String>>>,
    pub suggest_calls: AtomicUsize,
    pub suggestion_requests: Mutex<Vec<SuggestionRequest>>,
    pub render_calls: Mutex<Vec<String>>,
}

impl MockGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn push_suggestions(&self, reply: Reply<Vec<OutfitCategory>>) {
        self.suggestion_replies.lock().unwrap().push_back(reply);
    }

    pub fn gate_suggestions(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.suggestion_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn set_render(&self, description: &str, reply: Reply<Vec<ImageRef>>) {
        self.render_replies
            .lock()
            .unwrap()
            .insert(description.to_string(), reply);
    }

    pub fn gate_render(&self, description: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.render_gates
            .lock()
            .unwrap()
            .insert(description.to_string(), Arc::clone(&gate));
        gate
    }

    pub fn events(&self) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        *self.events.lock().unwrap() = Some(tx);
        rx
    }

    pub fn render_count(&self, description: &str) -> usize {
        self.render_calls
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.as_str() == description)
            .count()
    }

    fn emit(&self, event: String) {
        if let Some(tx) = self.events.lock().unwrap().as_ref() {
            let _ = tx.send(event);
        }
    }
}

async fn pass(gate: Option<Arc<Semaphore>>) {
    if let Some(gate) = gate {
        gate.acquire().await.unwrap().forget();
    }
}

#[async_trait]
impl GenerationGateway for MockGateway {
    async fn suggest_outfits(&self, request: &SuggestionRequest) -> Reply<Vec<OutfitCategory>> {
        self.suggest_calls.fetch_add(1, Ordering::SeqCst);
        self.suggestion_requests.lock().unwrap().push(request.clone());
        self.emit("suggest".to_string());

        let gate = self.suggestion_gate.lock().unwrap().clone();
        pass(gate).await;

        self.suggestion_replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(full_suggestions()))
    }

    async fn render_try_on(
        &self,
        image: &UploadedImage,
        outfit_description: &str,
    ) -> Reply<Vec<ImageRef>> {
        assert_eq!(image.mime_type(), "image/jpeg");
        self.render_calls
            .lock()
            .unwrap()
            .push(outfit_description.to_string());
        self.emit(format!("render:{outfit_description}"));

        let gate = self
            .render_gates
            .lock()
            .unwrap()
            .get(outfit_description)
            .cloned();
        pass(gate).await;

        self.render_replies
            .lock()
            .unwrap()
            .get(outfit_description)
            .cloned()
            .unwrap_or_else(|| Ok(vec![rendered(outfit_description)]))
    }
}

/// In-memory favorites store with switchable write failures.
#[derive(Default)]
pub struct MemoryFavorites {
    pub items: Mutex<Vec<ImageRef>>,
    pub fail_writes: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryFavorites {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn stored(&self) -> Vec<ImageRef> {
        self.items.lock().unwrap().clone()
    }

    fn write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoutureError::persistence("storage unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl FavoritesRepository for MemoryFavorites {
    async fn list_all(&self) -> Result<Vec<ImageRef>> {
        Ok(self.stored())
    }

    async fn add(&self, reference: &ImageRef) -> Result<()> {
        self.write()?;
        let mut items = self.items.lock().unwrap();
        if !items.contains(reference) {
            items.push(reference.clone());
        }
        Ok(())
    }

    async fn remove(&self, reference: &ImageRef) -> Result<()> {
        self.write()?;
        self.items.lock().unwrap().retain(|item| item != reference);
        Ok(())
    }
}

/// Image source whose read always fails.
pub struct BrokenSource;

#[async_trait]
impl couture_core::image::ImageSource for BrokenSource {
    async fn read_image(&self) -> Result<UploadedImage> {
        Err(CoutureError::intake("unexpected end of file"))
    }
}
