//! File-based image intake.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use couture_core::error::{CoutureError, Result};
use couture_core::image::{ImageSource, UploadedImage};

/// Reads the user's photo from disk, guessing the MIME type from the
/// file extension.
#[derive(Debug, Clone)]
pub struct FileImageSource {
    path: PathBuf,
}

impl FileImageSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ImageSource for FileImageSource {
    async fn read_image(&self) -> Result<UploadedImage> {
        let mime_type = mime_guess::from_path(&self.path)
            .first()
            .map(|mime| mime.essence_str().to_string())
            .ok_or_else(|| {
                CoutureError::intake(format!(
                    "cannot determine the type of {}",
                    self.path.display()
                ))
            })?;

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            CoutureError::intake(format!("{}: {e}", self.path.display()))
        })?;

        tracing::debug!(
            path = %self.path.display(),
            mime_type = %mime_type,
            bytes = bytes.len(),
            "Read uploaded image"
        );
        UploadedImage::new(bytes, mime_type)
    }
}
