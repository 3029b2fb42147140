pub mod catalog;
pub mod config;
pub mod download;
pub mod error;
pub mod favorites;
pub mod generation;
pub mod image;
pub mod outfit;
pub mod workflow;

// Re-export common error type
pub use error::{CoutureError, Result};
