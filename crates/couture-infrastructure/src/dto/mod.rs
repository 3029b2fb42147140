//! On-disk representations.

pub mod favorites;

pub use favorites::{FAVORITES_SCHEMA_VERSION, FavoriteEntry, FavoritesFile};
