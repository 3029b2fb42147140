//! Per-category try-on render cache.

mod cache;
mod session;
mod slot;

pub use cache::TryOnCache;
pub use session::{RequestOutcome, TryOnSession};
pub use slot::VariationSlot;
