pub mod favorites;
pub mod logging;
pub mod presets;
pub mod style;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;

use couture_application::FavoritesController;
use couture_core::config::AppConfig;
use couture_infrastructure::{ConfigService, TomlFavoritesRepository};

pub async fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let service = match path {
        Some(path) => ConfigService::new(path),
        None => ConfigService::default_location().context("Failed to locate config directory")?,
    };
    service
        .load()
        .await
        .with_context(|| format!("Failed to load {}", service.path().display()))
}

/// Favorites controller over the configured store, fully loaded.
pub async fn favorites(config: &AppConfig) -> Result<Arc<FavoritesController>> {
    let repository = match &config.storage.favorites_file {
        Some(path) => TomlFavoritesRepository::new(path),
        None => TomlFavoritesRepository::default_location()
            .context("Failed to locate favorites file")?,
    };
    tracing::debug!(path = %repository.path().display(), "Using favorites store");

    let controller = FavoritesController::start(Arc::new(repository));
    controller.wait_until_loaded().await;
    Ok(controller)
}
