//! Typed failures reported by a Generation Gateway.

use std::time::Duration;
use thiserror::Error;

/// Failure of a "suggest outfits" or "render try-on" request.
///
/// The `Display` output is used verbatim as the cause inside user-facing
/// messages, so variants render as a single sentence fragment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    /// The request never produced an HTTP response
    #[error("Generation request failed: {0}")]
    Transport(String),

    /// The backend answered with an error status
    #[error("{message}")]
    Backend {
        status: Option<u16>,
        message: String,
        retryable: bool,
        retry_after: Option<Duration>,
    },

    /// The backend answered but the payload could not be decoded
    #[error("Malformed generation response: {0}")]
    Malformed(String),

    /// The backend answered with nothing usable
    #[error("{0}")]
    Empty(String),

    /// The payload decoded but broke the suggestion contract
    #[error("Invalid outfit suggestions: {0}")]
    Validation(String),

    /// The request could not be built
    #[error("Failed to build generation prompt: {0}")]
    Prompt(String),
}

impl GenerationError {
    /// Creates a Backend error without retry hints.
    pub fn backend(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Backend {
            status,
            message: message.into(),
            retryable: false,
            retry_after: None,
        }
    }

    /// Whether repeating the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Backend { retryable, .. } => *retryable,
            _ => false,
        }
    }
}
