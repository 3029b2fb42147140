//! TOML file-based favorites repository.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

use couture_core::error::{CoutureError, Result};
use couture_core::favorites::FavoritesRepository;
use couture_core::image::ImageRef;

use crate::dto::{FAVORITES_SCHEMA_VERSION, FavoritesFile};
use crate::paths::CouturePaths;
use crate::storage::{AtomicTomlError, AtomicTomlFile};

/// Stores favorite references in a single `favorites.toml`.
///
/// Every operation runs the blocking file work on tokio's blocking pool.
#[derive(Clone)]
pub struct TomlFavoritesRepository {
    file: Arc<AtomicTomlFile<FavoritesFile>>,
}

impl TomlFavoritesRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Arc::new(AtomicTomlFile::new(path)),
        }
    }

    /// Repository at the default data location.
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(CouturePaths::resolve()?.favorites_file()))
    }

    pub fn path(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }

    async fn run<R, F>(&self, op: &'static str, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&AtomicTomlFile<FavoritesFile>) -> std::result::Result<R, AtomicTomlError>
            + Send
            + 'static,
    {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || f(file.as_ref()))
            .await
            .map_err(|e| CoutureError::internal(format!("Failed to join task: {e}")))?
            .map_err(|e| CoutureError::persistence(format!("Failed to {op} favorites: {e}")))
    }

    async fn mutate<F>(&self, op: &'static str, f: F) -> Result<bool>
    where
        F: FnOnce(&mut FavoritesFile) -> bool + Send + 'static,
    {
        self.run(op, move |file| {
            file.update(FavoritesFile::default, |data| {
                check_version(data)?;
                let changed = f(data);
                Ok((changed, changed))
            })
        })
        .await
    }
}

fn check_version(data: &FavoritesFile) -> std::result::Result<(), AtomicTomlError> {
    if data.schema_version > FAVORITES_SCHEMA_VERSION {
        return Err(AtomicTomlError::Rejected(format!(
            "unsupported schema version {} (expected at most {})",
            data.schema_version, FAVORITES_SCHEMA_VERSION
        )));
    }
    Ok(())
}

#[async_trait]
impl FavoritesRepository for TomlFavoritesRepository {
    async fn list_all(&self) -> Result<Vec<ImageRef>> {
        self.run("read", |file| {
            let data = file.load()?.unwrap_or_default();
            check_version(&data)?;
            Ok(data.references())
        })
        .await
    }

    async fn add(&self, reference: &ImageRef) -> Result<()> {
        let reference = reference.clone();
        let added = self
            .mutate("write", move |data| data.insert(&reference, Utc::now()))
            .await?;
        if !added {
            tracing::debug!("Favorite already stored, nothing to write");
        }
        Ok(())
    }

    async fn remove(&self, reference: &ImageRef) -> Result<()> {
        let reference = reference.clone();
        let removed = self
            .mutate("write", move |data| data.remove(&reference))
            .await?;
        if !removed {
            tracing::debug!("Favorite was not stored, nothing to remove");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn repo_in(dir: &TempDir) -> TomlFavoritesRepository {
        TomlFavoritesRepository::new(dir.path().join("favorites.toml"))
    }

    #[tokio::test]
    async fn test_empty_when_missing() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_twice_stores_once() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        let reference = ImageRef::from_inline("image/png", "AAAA");

        repo.add(&reference).await.unwrap();
        repo.add(&reference).await.unwrap();

        assert_eq!(repo.list_all().await.unwrap(), vec![reference]);
    }

    #[tokio::test]
    async fn test_remove_absent_is_ok() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        repo.remove(&ImageRef::from("never-added")).await.unwrap();
        assert!(repo.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_persists_in_insertion_order() {
        let dir = TempDir::new().unwrap();
        let first = ImageRef::from("look-1");
        let second = ImageRef::from("look-2");
        let third = ImageRef::from("look-3");

        {
            let repo = repo_in(&dir);
            repo.add(&first).await.unwrap();
            repo.add(&second).await.unwrap();
            repo.add(&third).await.unwrap();
            repo.remove(&second).await.unwrap();
        }

        let reopened = repo_in(&dir);
        assert_eq!(reopened.list_all().await.unwrap(), vec![first, third]);
    }

    #[tokio::test]
    async fn test_newer_schema_is_a_persistence_error() {
        let dir = TempDir::new().unwrap();
        let repo = repo_in(&dir);
        std::fs::write(repo.path(), "schema_version = 99\n").unwrap();

        let err = repo.list_all().await.unwrap_err();
        assert!(err.is_persistence());

        let err = repo.add(&ImageRef::from("x")).await.unwrap_err();
        assert!(err.is_persistence());
    }
}
