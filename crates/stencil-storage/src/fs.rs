//! Filesystem storage implementation.
//!
//! Provides [`FsStorage`] for reading and writing files below a project root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::storage::{Storage, StorageError, validate_path};

/// Backend identifier for error messages.
const BACKEND: &str = "Fs";

/// Filesystem storage rooted at a project directory.
///
/// # Example
///
/// ```ignore
/// use std::path::{Path, PathBuf};
/// use stencil_storage::{FsStorage, Storage};
///
/// let storage = FsStorage::new(PathBuf::from("site"));
/// let layout = storage.read(Path::new("templates/layout.html"))?;
/// ```
#[derive(Debug, Clone)]
pub struct FsStorage {
    /// Root directory all paths are resolved against.
    root: PathBuf,
}

impl FsStorage {
    /// Create a new filesystem storage rooted at `root`.
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Root directory of this storage.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a relative path against the root after validation.
    fn resolve(&self, path: &Path) -> Result<PathBuf, StorageError> {
        validate_path(path, BACKEND)?;
        Ok(self.root.join(path))
    }

    /// Scan directory recursively and collect file paths relative to `base_path`.
    fn scan_directory(dir_path: &Path, base_path: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let entries = fs::read_dir(dir_path).map_err(io_error(dir_path.to_path_buf()))?;

        let mut files = Vec::new();

        // Collect entries with cached file_type to avoid repeated stat calls in sort.
        let mut entries: Vec<_> = entries
            .filter_map(Result::ok)
            .map(|e| {
                let is_dir = e.file_type().is_ok_and(|t| t.is_dir());
                (e, is_dir)
            })
            .collect();
        entries.sort_by_key(|(e, _)| e.file_name());

        for (entry, is_dir) in entries {
            let rel_path = base_path.join(entry.file_name());
            if is_dir {
                files.extend(Self::scan_directory(&entry.path(), &rel_path)?);
            } else {
                files.push(rel_path);
            }
        }

        Ok(files)
    }
}

impl Storage for FsStorage {
    fn scan(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        let full_path = self.resolve(dir)?;
        if !full_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Self::scan_directory(&full_path, Path::new(""))?;
        files.sort();
        tracing::debug!(dir = %full_path.display(), count = files.len(), "Scanned directory");
        Ok(files)
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        let full_path = self.resolve(path)?;
        fs::read(&full_path).map_err(io_error(full_path))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        let full_path = self.resolve(path)?;
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent.to_path_buf()))?;
        }
        fs::write(&full_path, contents).map_err(io_error(full_path))
    }
}

/// Tag an io error on `path` with this backend.
fn io_error(path: PathBuf) -> impl FnOnce(io::Error) -> StorageError {
    move |e| StorageError::io(e, Some(path)).with_backend(BACKEND)
}
