//! Favorites domain module.
//!
//! Favorites are a durable set of [`crate::image::ImageRef`] values that
//! outlive any single styling session.

mod repository;

pub use repository::FavoritesRepository;
