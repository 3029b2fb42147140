//! Path management for Couture configuration and data files.
//!
//! ```text
//! ~/.config/couture/            # Config directory
//! └── config.toml               # Application configuration
//!
//! ~/.local/share/couture/       # Data directory
//! └── favorites.toml            # Favorite try-on images
//! ```

use std::path::PathBuf;
use thiserror::Error;

use couture_core::CoutureError;

const APP_DIR: &str = "couture";

/// Errors that can occur during path resolution.
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot determine the platform {0} directory")]
    DirNotFound(&'static str),
}

impl From<PathError> for CoutureError {
    fn from(err: PathError) -> Self {
        CoutureError::config(err.to_string())
    }
}

/// Resolved config and data directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouturePaths {
    config_dir: PathBuf,
    data_dir: PathBuf,
}

impl CouturePaths {
    /// Platform directories (XDG on Linux, the usual locations elsewhere).
    pub fn resolve() -> Result<Self, PathError> {
        let config_dir = dirs::config_dir().ok_or(PathError::DirNotFound("config"))?;
        let data_dir = dirs::data_dir().ok_or(PathError::DirNotFound("data"))?;
        Ok(Self {
            config_dir: config_dir.join(APP_DIR),
            data_dir: data_dir.join(APP_DIR),
        })
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    pub fn favorites_file(&self) -> PathBuf {
        self.data_dir.join("favorites.toml")
    }
}
