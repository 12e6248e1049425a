//! Mock storage implementation for testing.
//!
//! Provides [`MockStorage`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::storage::{Storage, StorageError, validate_path};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

/// Mock storage for testing.
///
/// Stores files in memory. Use the builder methods to configure the mock
/// with test data.
///
/// # Example
///
/// ```ignore
/// use std::path::Path;
/// use stencil_storage::{MockStorage, Storage};
///
/// let storage = MockStorage::new()
///     .with_file("src/index.md", "---\ntemplate: layout.html\n---\nHello")
///     .with_file("templates/layout.html", "<main>{{ contents }}</main>");
///
/// let files = storage.scan(Path::new("src")).unwrap();
/// ```
#[derive(Debug, Default)]
pub struct MockStorage {
    files: RwLock<BTreeMap<PathBuf, Vec<u8>>>,
}

impl MockStorage {
    /// Create a new empty mock storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given contents.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.files
            .write()
            .unwrap()
            .insert(path.into(), contents.into());
        self
    }

    /// Get the current contents of a file, if present.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn contents(&self, path: impl AsRef<Path>) -> Option<Vec<u8>> {
        self.files.read().unwrap().get(path.as_ref()).cloned()
    }
}

impl Storage for MockStorage {
    fn scan(&self, dir: &Path) -> Result<Vec<PathBuf>, StorageError> {
        validate_path(dir, BACKEND)?;
        let files = self.files.read().unwrap();
        Ok(files
            .keys()
            .filter_map(|path| path.strip_prefix(dir).ok())
            .map(Path::to_path_buf)
            .collect())
    }

    fn read(&self, path: &Path) -> Result<Vec<u8>, StorageError> {
        validate_path(path, BACKEND)?;
        self.files
            .read()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| StorageError::not_found(path).with_backend(BACKEND))
    }

    fn write(&self, path: &Path, contents: &[u8]) -> Result<(), StorageError> {
        validate_path(path, BACKEND)?;
        self.files
            .write()
            .unwrap()
            .insert(path.to_path_buf(), contents.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::StorageErrorKind;

    #[test]
    fn test_scan_strips_dir_prefix() {
        let storage = MockStorage::new()
            .with_file("src/index.md", "a")
            .with_file("src/blog/post.md", "b")
            .with_file("templates/layout.html", "c");

        let files = storage.scan(Path::new("src")).unwrap();

        assert_eq!(
            files,
            vec![PathBuf::from("blog/post.md"), PathBuf::from("index.md")]
        );
    }

    #[test]
    fn test_read_missing() {
        let storage = MockStorage::new();

        let err = storage.read(Path::new("templates/none.html")).unwrap_err();
        assert_eq!(err.kind, StorageErrorKind::NotFound);
        assert_eq!(
            err.to_string(),
            "[Mock] Not found (path: templates/none.html)"
        );
    }

    #[test]
    fn test_write_then_read() {
        let storage = MockStorage::new();

        let path = Path::new("build/a.html");
        storage.write(path, b"<p>a</p>").unwrap();

        assert_eq!(storage.contents("build/a.html"), Some(b"<p>a</p>".to_vec()));
    }
}
