//! Writes rendered try-on images to disk.

use std::path::PathBuf;

use couture_core::download::download_file_name;
use couture_core::error::Result;
use couture_core::image::ImageRef;
use couture_core::outfit::OutfitKind;

#[derive(Debug, Clone)]
pub struct ImageExporter {
    dir: PathBuf,
}

impl ImageExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Decodes `reference` and writes it under its download name.
    ///
    /// # Returns
    ///
    /// The path of the written file. An existing file of the same name is
    /// replaced.
    pub async fn export(
        &self,
        kind: OutfitKind,
        index: usize,
        reference: &ImageRef,
    ) -> Result<PathBuf> {
        let bytes = reference.decode()?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.dir.join(download_file_name(kind, index, reference));
        tokio::fs::write(&path, &bytes).await?;

        tracing::info!(path = %path.display(), bytes = bytes.len(), "Exported try-on image");
        Ok(path)
    }
}
