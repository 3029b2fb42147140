use std::collections::HashMap;
use std::sync::Arc;

use couture_core::outfit::OutfitKind;

use super::session::TryOnSession;

/// Try-on sessions of one workflow session, keyed by category.
///
/// Sessions are created on first use and reused afterwards; clearing the
/// cache only drops this map's handles, so renders still running keep
/// their session alive until they finish.
#[derive(Default)]
pub struct TryOnCache {
    sessions: HashMap<OutfitKind, Arc<TryOnSession>>,
}

impl TryOnCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: OutfitKind) -> Option<Arc<TryOnSession>> {
        self.sessions.get(&kind).cloned()
    }

    /// Returns the cached session for `kind`, creating it with `create`.
    pub fn get_or_insert_with<F>(&mut self, kind: OutfitKind, create: F) -> Arc<TryOnSession>
    where
        F: FnOnce() -> TryOnSession,
    {
        Arc::clone(
            self.sessions
                .entry(kind)
                .or_insert_with(|| Arc::new(create())),
        )
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }
}
