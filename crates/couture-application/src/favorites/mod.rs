//! Favorites Controller with optimistic updates.

mod change;
mod controller;

pub use change::FavoriteChange;
pub use controller::FavoritesController;
