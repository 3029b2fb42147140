//! Favorites repository trait.
//!
//! Defines the Persistence Gateway for favorite image references.

use async_trait::async_trait;

use crate::error::Result;
use crate::image::ImageRef;

/// An abstract store for favorite image references.
///
/// The reference string itself is the key, so the store has set semantics.
///
/// # Implementation Notes
///
/// Implementations should report failures as
/// [`crate::error::CoutureError::Persistence`] so callers can roll back.
#[async_trait]
pub trait FavoritesRepository: Send + Sync {
    /// Lists every stored reference, oldest first.
    async fn list_all(&self) -> Result<Vec<ImageRef>>;

    /// Stores a reference.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Stored, or was already present
    /// - `Err(_)`: The write failed
    async fn add(&self, reference: &ImageRef) -> Result<()>;

    /// Removes a reference.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: Removed, or was not present
    /// - `Err(_)`: The write failed
    async fn remove(&self, reference: &ImageRef) -> Result<()>;
}
