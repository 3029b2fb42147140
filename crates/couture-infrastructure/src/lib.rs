pub mod config_service;
pub mod dto;
pub mod image_exporter;
pub mod image_source;
pub mod paths;
pub mod storage;
pub mod toml_favorites_repository;

pub use crate::config_service::ConfigService;
pub use crate::image_exporter::ImageExporter;
pub use crate::image_source::FileImageSource;
pub use crate::paths::CouturePaths;
pub use crate::toml_favorites_repository::TomlFavoritesRepository;
