//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading document bytes from a local directory.

use std::fs;
use std::path::{Component, Path, PathBuf};

use crate::storage::{Storage, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a source directory.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use mdcanon_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("docs"));
/// let bytes = storage.read(Path::new("guide.md"))?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    /// Root directory that locators are resolved against.
    source_dir: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage.
    ///
    /// # Arguments
    ///
    /// * `source_dir` - Root directory containing markdown files
    #[must_use]
    pub fn new(source_dir: PathBuf) -> Self {
        Self { source_dir }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Validate that a locator doesn't escape the source directory.
    ///
    /// Rejects locators containing parent directory components (`..`) or
    /// absolute roots (e.g., `../../../etc/passwd`, `/etc/passwd`).
    fn validate_path(path: &Path) -> Result<(), StorageError> {
        let escapes = path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });

        if escapes {
            return Err(StorageError::new(StorageErrorKind::InvalidPath)
                .with_path(path)
                .with_backend(BACKEND));
        }
        Ok(())
    }
}

impl Storage for FsStorage {
    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        Self::validate_path(path)?;
        let full_path = self.source_dir.join(path);
        tracing::debug!(path = %full_path.display(), "Reading document");
        fs::read(&full_path)
            .map_err(|e| StorageError::io(e, Some(full_path.clone())).with_backend(BACKEND))
    }

    fn exists(&self, path: &Path) -> bool {
        Self::validate_path(path).is_ok() && self.source_dir.join(path).is_file()
    }
}
