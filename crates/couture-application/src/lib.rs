pub mod favorites;
pub mod try_on;
pub mod workflow;

pub use favorites::FavoritesController;
pub use try_on::{RequestOutcome, TryOnCache, TryOnSession};
pub use workflow::StylingWorkflow;
