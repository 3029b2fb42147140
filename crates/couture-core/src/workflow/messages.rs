//! User-facing failure texts.

/// Shown when the uploaded photo cannot be read.
pub const INTAKE_FAILURE_MESSAGE: &str = "Failed to read the uploaded file.";

/// Full-screen message for a failed suggestion request.
pub fn suggestion_failure_message(cause: impl std::fmt::Display) -> String {
    format!("Failed to get suggestions: {cause}. Please try a different image or prompt.")
}

/// Inline message for a failed try-on render of one variation.
pub fn render_failure_message(cause: impl std::fmt::Display) -> String {
    format!("Failed to generate try-on images: {cause}. Please try again.")
}
