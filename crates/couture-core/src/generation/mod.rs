//! Generation Gateway contract.
//!
//! The generative backend is a black box keyed by prompt and image. This
//! module defines the two request shapes the workflow depends on and the
//! typed failure every implementation reports.

mod error;
mod gateway;

pub use error::GenerationError;
pub use gateway::{GenerationGateway, SuggestionRequest};
