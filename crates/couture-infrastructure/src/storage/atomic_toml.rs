//! Atomic TOML file operations.
//!
//! Reads are plain; writes go through a temp file in the same directory
//! followed by a rename, and read-modify-write cycles hold an exclusive
//! `fs2` lock on a sibling `.lock` file.

use fs2::FileExt;
use serde::{Serialize, de::DeserializeOwned};
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during atomic TOML operations.
#[derive(Debug, Error)]
pub enum AtomicTomlError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("TOML serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Failed to lock {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Rejected by the update closure
    #[error("{0}")]
    Rejected(String),
}

/// A handle to a TOML document that is only ever replaced whole.
pub struct AtomicTomlFile<T> {
    path: PathBuf,
    _phantom: PhantomData<fn() -> T>,
}

impl<T> AtomicTomlFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _phantom: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads and deserializes the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded
    /// - `Ok(None)`: File is missing or blank
    /// - `Err`: Failed to read or parse the file
    pub fn load(&self) -> Result<Option<T>, AtomicTomlError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        toml::from_str(&content)
            .map(Some)
            .map_err(|source| AtomicTomlError::Parse {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the document with `data`.
    pub fn save(&self, data: &T) -> Result<(), AtomicTomlError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(data)?;

        let tmp_path = self.temp_path();
        let mut tmp_file = File::create(&tmp_path)?;
        tmp_file.write_all(toml_string.as_bytes())?;
        tmp_file.sync_all()?;
        drop(tmp_file);

        fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    /// Locked read-modify-write.
    ///
    /// `f` sees the current document (or `default()` when there is none) and
    /// returns whether it changed it. Unchanged documents are not rewritten.
    pub fn update<R, D, F>(&self, default: D, f: F) -> Result<R, AtomicTomlError>
    where
        D: FnOnce() -> T,
        F: FnOnce(&mut T) -> Result<(R, bool), AtomicTomlError>,
    {
        let _lock = FileLock::acquire(&self.path)?;

        let mut data = self.load()?.unwrap_or_else(default);
        let (result, changed) = f(&mut data)?;
        if changed {
            self.save(&data)?;
        }
        Ok(result)
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        self.path.with_file_name(format!(".{file_name}.tmp"))
    }
}

/// Exclusive lock released on drop.
struct FileLock {
    file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicTomlError> {
        let lock_path = path.with_extension("lock");
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()
            .map_err(|source| AtomicTomlError::Lock {
                path: lock_path,
                source,
            })?;

        Ok(Self { file })
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Wardrobe {
        items: Vec<String>,
    }

    #[test]
    fn test_load_missing_and_blank() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wardrobe.toml");
        let file = AtomicTomlFile::<Wardrobe>::new(&path);
        assert!(file.load().unwrap().is_none());

        fs::write(&path, "   \n").unwrap();
        assert!(file.load().unwrap().is_none());
    }

    #[test]
    fn test_update_skips_write_when_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("wardrobe.toml");
        let file = AtomicTomlFile::<Wardrobe>::new(&path);

        let len = file
            .update(Wardrobe::default, |w| {
                w.items.push("linen blazer".to_string());
                Ok((w.items.len(), true))
            })
            .unwrap();
        assert_eq!(len, 1);
        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join(".wardrobe.toml.tmp").exists());

        let modified = fs::metadata(&path).unwrap().modified().unwrap();
        file.update(Wardrobe::default, |_| Ok(((), false))).unwrap();
        assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), modified);

        let loaded = file.load().unwrap().unwrap();
        assert_eq!(loaded.items, vec!["linen blazer".to_string()]);
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("broken.toml");
        fs::write(&path, "items = [").unwrap();

        let err = AtomicTomlFile::<Wardrobe>::new(&path).load().unwrap_err();
        assert!(matches!(err, AtomicTomlError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_rejected_update_leaves_file_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("wardrobe.toml");
        let file = AtomicTomlFile::<Wardrobe>::new(&path);
        file.save(&Wardrobe {
            items: vec!["silk scarf".to_string()],
        })
        .unwrap();

        let result: Result<(), _> = file.update(Wardrobe::default, |w| {
            w.items.clear();
            Err(AtomicTomlError::Rejected("nope".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(file.load().unwrap().unwrap().items.len(), 1);
    }
}
