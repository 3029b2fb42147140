use std::sync::Arc;
use tokio::sync::{Mutex, RwLock, watch};
use tokio::task::JoinHandle;

use couture_core::favorites::FavoritesRepository;
use couture_core::image::ImageRef;

use super::change::FavoriteChange;

struct FavoritesState {
    items: Vec<ImageRef>,
    loaded: bool,
    /// Changes made before the initial load finished, replayed over it
    early: Vec<FavoriteChange>,
}

/// In-memory favorites set kept in step with a [`FavoritesRepository`].
///
/// Every mutation is applied to memory first, then written through. A
/// failed write reverts the in-memory change and is logged; callers only
/// see a `false` return. Mutations are serialized, so a rollback never
/// races another edit.
///
/// The initial load runs in the background. Until it completes, `list()`
/// holds only changes made in this process.
pub struct FavoritesController {
    repository: Arc<dyn FavoritesRepository>,
    state: RwLock<FavoritesState>,
    write_gate: Mutex<()>,
    loaded_tx: watch::Sender<bool>,
}

impl FavoritesController {
    /// Creates a controller that has not loaded anything yet.
    pub fn new(repository: Arc<dyn FavoritesRepository>) -> Self {
        let (loaded_tx, _) = watch::channel(false);
        Self {
            repository,
            state: RwLock::new(FavoritesState {
                items: Vec::new(),
                loaded: false,
                early: Vec::new(),
            }),
            write_gate: Mutex::new(()),
            loaded_tx,
        }
    }

    /// Creates a controller and starts its initial load.
    pub fn start(repository: Arc<dyn FavoritesRepository>) -> Arc<Self> {
        let controller = Arc::new(Self::new(repository));
        controller.spawn_load();
        controller
    }

    pub fn spawn_load(self: &Arc<Self>) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        tokio::spawn(async move { controller.load().await })
    }

    /// Loads the stored set and merges in changes made while loading.
    ///
    /// The merge waits for any write in flight, so a change that ends up
    /// rolled back is never replayed over the stored set.
    pub async fn load(&self) {
        let stored = self.repository.list_all().await;

        let gate = self.write_gate.lock().await;
        let mut state = self.state.write().await;
        match stored {
            Ok(stored) => {
                let mut items = stored;
                for change in state.early.drain(..) {
                    change.apply(&mut items);
                }
                state.items = items;
                tracing::info!(count = state.items.len(), "Loaded favorites");
            }
            Err(e) => {
                state.early.clear();
                tracing::error!(error = %e, "Failed to load favorites");
            }
        }
        state.loaded = true;
        drop(state);
        drop(gate);

        self.loaded_tx.send_replace(true);
    }

    pub fn is_loaded(&self) -> bool {
        *self.loaded_tx.borrow()
    }

    pub async fn wait_until_loaded(&self) {
        let mut rx = self.loaded_tx.subscribe();
        // the sender lives as long as self
        let _ = rx.wait_for(|loaded| *loaded).await;
    }

    pub async fn list(&self) -> Vec<ImageRef> {
        self.state.read().await.items.clone()
    }

    pub async fn is_favorite(&self, reference: &ImageRef) -> bool {
        self.state.read().await.items.contains(reference)
    }

    /// Adds `reference`. Adding a present reference does nothing.
    ///
    /// # Returns
    ///
    /// `false` when the write failed and the change was rolled back.
    pub async fn add(&self, reference: ImageRef) -> bool {
        let _gate = self.write_gate.lock().await;

        let change = FavoriteChange::Add {
            reference: reference.clone(),
        };
        {
            let mut state = self.state.write().await;
            if state.items.contains(&reference) {
                return true;
            }
            change.apply(&mut state.items);
            if !state.loaded {
                state.early.push(change.clone());
            }
        }

        match self.repository.add(&reference).await {
            Ok(()) => {
                tracing::debug!(reference = %reference.short(), "Favorite added");
                true
            }
            Err(e) => {
                tracing::error!(
                    reference = %reference.short(),
                    error = %e,
                    "Failed to add favorite, rolling back"
                );
                self.rollback(&change, true).await;
                false
            }
        }
    }

    /// Removes `reference`. Removing an absent reference does nothing.
    ///
    /// # Returns
    ///
    /// `false` when the write failed and the change was rolled back.
    pub async fn remove(&self, reference: &ImageRef) -> bool {
        let _gate = self.write_gate.lock().await;

        let (change, changed) = {
            let mut state = self.state.write().await;
            let position = state.items.iter().position(|item| item == reference);
            match (position, state.loaded) {
                (None, true) => return true,
                (position, loaded) => {
                    let change = FavoriteChange::Remove {
                        reference: reference.clone(),
                        position: position.unwrap_or(0),
                    };
                    let changed = change.apply(&mut state.items);
                    if !loaded {
                        // may only exist in storage, which has not been read yet
                        state.early.push(change.clone());
                    }
                    (change, changed)
                }
            }
        };

        match self.repository.remove(reference).await {
            Ok(()) => {
                tracing::debug!(reference = %reference.short(), "Favorite removed");
                true
            }
            Err(e) => {
                tracing::error!(
                    reference = %reference.short(),
                    error = %e,
                    "Failed to remove favorite, rolling back"
                );
                self.rollback(&change, changed).await;
                false
            }
        }
    }

    /// Adds or removes `reference`. Returns whether it is now a favorite.
    pub async fn toggle(&self, reference: ImageRef) -> bool {
        if self.is_favorite(&reference).await {
            let committed = self.remove(&reference).await;
            !committed
        } else {
            self.add(reference).await
        }
    }

    /// Removes every favorite. Returns how many removals were committed.
    pub async fn clear(&self) -> usize {
        let mut removed = 0;
        for reference in self.list().await {
            if self.remove(&reference).await {
                removed += 1;
            }
        }
        removed
    }

    async fn rollback(&self, change: &FavoriteChange, changed: bool) {
        let mut state = self.state.write().await;
        if changed {
            change.revert(&mut state.items);
        }
        state.early.retain(|early| early != change);
        tracing::debug!(reference = %change.reference().short(), "Favorite change rolled back");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use couture_core::error::{CoutureError, Result};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::{Semaphore, mpsc};

    /// Vec-backed repository whose writes can be switched to fail.
    #[derive(Default)]
    struct FlakyRepository {
        items: std::sync::Mutex<Vec<ImageRef>>,
        fail_writes: AtomicBool,
    }

    impl FlakyRepository {
        fn seeded(items: &[&str]) -> Self {
            let repo = Self::default();
            *repo.items.lock().unwrap() = items.iter().map(|s| ImageRef::from(*s)).collect();
            repo
        }

        fn check(&self) -> Result<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                return Err(CoutureError::persistence("disk full"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl FavoritesRepository for FlakyRepository {
        async fn list_all(&self) -> Result<Vec<ImageRef>> {
            Ok(self.items.lock().unwrap().clone())
        }

        async fn add(&self, reference: &ImageRef) -> Result<()> {
            self.check()?;
            let mut items = self.items.lock().unwrap();
            if !items.contains(reference) {
                items.push(reference.clone());
            }
            Ok(())
        }

        async fn remove(&self, reference: &ImageRef) -> Result<()> {
            self.check()?;
            self.items.lock().unwrap().retain(|item| item != reference);
            Ok(())
        }
    }

    /// Holds every remove until a permit is released, then fails it.
    struct StalledRemoveRepository {
        items: Vec<ImageRef>,
        gate: Semaphore,
        entered: mpsc::UnboundedSender<()>,
    }

    #[async_trait]
    impl FavoritesRepository for StalledRemoveRepository {
        async fn list_all(&self) -> Result<Vec<ImageRef>> {
            Ok(self.items.clone())
        }

        async fn add(&self, _reference: &ImageRef) -> Result<()> {
            Ok(())
        }

        async fn remove(&self, _reference: &ImageRef) -> Result<()> {
            let _ = self.entered.send(());
            let _permit = self.gate.acquire().await;
            Err(CoutureError::persistence("disk full"))
        }
    }

    #[tokio::test]
    async fn test_failed_early_remove_survives_concurrent_load() {
        let (entered, mut entered_rx) = mpsc::unbounded_channel();
        let repo = Arc::new(StalledRemoveRepository {
            items: vec![ImageRef::from("stored-x")],
            gate: Semaphore::new(0),
            entered,
        });
        let controller = Arc::new(FavoritesController::new(repo.clone()));

        let removing = {
            let controller = Arc::clone(&controller);
            tokio::spawn(async move { controller.remove(&ImageRef::from("stored-x")).await })
        };
        entered_rx.recv().await.unwrap();

        let loading = controller.spawn_load();
        for _ in 0..8 {
            tokio::task::yield_now().await;
        }

        repo.gate.add_permits(1);
        assert!(!removing.await.unwrap());
        loading.await.unwrap();

        assert!(controller.is_loaded());
        assert_eq!(controller.list().await, vec![ImageRef::from("stored-x")]);
    }

    #[tokio::test]
    async fn test_list_empty_until_loaded() {
        let repo = Arc::new(FlakyRepository::seeded(&["a", "b"]));
        let controller = FavoritesController::new(repo);

        assert!(!controller.is_loaded());
        assert!(controller.list().await.is_empty());

        controller.load().await;
        assert!(controller.is_loaded());
        assert_eq!(controller.list().await.len(), 2);
    }

    #[tokio::test]
    async fn test_failed_remove_restores_position() {
        let repo = Arc::new(FlakyRepository::seeded(&["a", "b", "c"]));
        let controller = FavoritesController::new(repo.clone());
        controller.load().await;

        repo.fail_writes.store(true, Ordering::SeqCst);
        assert!(!controller.remove(&ImageRef::from("b")).await);

        let names: Vec<String> = controller
            .list()
            .await
            .into_iter()
            .map(ImageRef::into_inner)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_toggle() {
        let repo = Arc::new(FlakyRepository::default());
        let controller = FavoritesController::new(repo.clone());
        controller.load().await;
        let reference = ImageRef::from("look");

        assert!(controller.toggle(reference.clone()).await);
        assert!(controller.is_favorite(&reference).await);
        assert!(!controller.toggle(reference.clone()).await);
        assert!(!controller.is_favorite(&reference).await);
        assert!(repo.items.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_changes_before_load_are_merged() {
        let repo = Arc::new(FlakyRepository::seeded(&["stored-1", "stored-2"]));
        let controller = FavoritesController::new(repo);

        assert!(controller.add(ImageRef::from("new")).await);
        assert!(controller.remove(&ImageRef::from("stored-1")).await);
        assert_eq!(controller.list().await, vec![ImageRef::from("new")]);

        controller.load().await;
        assert_eq!(
            controller.list().await,
            vec![ImageRef::from("stored-2"), ImageRef::from("new")]
        );
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let repo = Arc::new(FlakyRepository::seeded(&["a", "b"]));
        let controller = FavoritesController::new(repo.clone());
        controller.load().await;

        assert_eq!(controller.clear().await, 2);
        assert!(controller.list().await.is_empty());
        assert!(repo.items.lock().unwrap().is_empty());
    }
}
