//! The build collaborator: file collection, global metadata and storage.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use stencil_storage::{Storage, StorageError};

use crate::file::{ContentFile, Files, path_to_key};
use crate::frontmatter::FrontMatterError;

/// Error type for reading and writing a [`Build`].
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// Storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),
    /// A source file has malformed front-matter.
    #[error("Invalid front-matter in {path}: {source}")]
    FrontMatter {
        /// Collection key of the file.
        path: String,
        /// Underlying parse error.
        #[source]
        source: FrontMatterError,
    },
}

/// Files and metadata for a single build pass.
///
/// Paths handed to storage are relative to the project root. File keys are
/// relative to the source directory.
pub struct Build {
    storage: Arc<dyn Storage>,
    source: PathBuf,
    metadata: Map<String, Value>,
    files: Files,
}

impl Build {
    /// Create an empty build over `storage` with the given source directory.
    pub fn new(storage: Arc<dyn Storage>, source: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            source: normalize(&source.into()),
            metadata: Map::new(),
            files: Files::new(),
        }
    }

    /// Read every file under `source`, parsing front-matter of text files.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError`] if scanning or reading fails, or a text file has
    /// malformed front-matter.
    pub fn read(storage: Arc<dyn Storage>, source: impl Into<PathBuf>) -> Result<Self, BuildError> {
        let mut build = Self::new(storage, source);

        for relative in build.storage.scan(&build.source)? {
            let bytes = build.storage.read(&build.source.join(&relative))?;
            let path = path_to_key(&relative);
            let file = ContentFile::parse(bytes).map_err(|source| BuildError::FrontMatter {
                path: path.clone(),
                source,
            })?;
            build.files.insert(path, file);
        }

        tracing::debug!(
            source = %build.source.display(),
            count = build.files.len(),
            "Read source files"
        );
        Ok(build)
    }

    /// Write every file's contents under `destination`.
    ///
    /// Returns the number of files written.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Storage`] on the first failed write.
    pub fn write(&self, destination: impl AsRef<Path>) -> Result<usize, BuildError> {
        let destination = normalize(destination.as_ref());
        for (path, file) in &self.files {
            self.storage.write(&destination.join(path), &file.contents)?;
        }
        tracing::debug!(
            destination = %destination.display(),
            count = self.files.len(),
            "Wrote build output"
        );
        Ok(self.files.len())
    }

    /// Replace the global metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add or replace a file.
    pub fn insert(&mut self, path: impl Into<String>, file: ContentFile) {
        self.files.insert(path.into(), file);
    }

    /// Look up a file by key.
    pub fn file(&self, path: &str) -> Option<&ContentFile> {
        self.files.get(path)
    }

    pub fn files(&self) -> &Files {
        &self.files
    }

    pub fn files_mut(&mut self) -> &mut Files {
        &mut self.files
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    /// Source directory, relative to the project root.
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Join `parts` onto the project root, returning a root-relative path.
    ///
    /// Leading separators and `.` components are dropped so the result can
    /// always be handed to storage.
    pub fn join<I, P>(&self, parts: I) -> PathBuf
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut path = PathBuf::new();
        for part in parts {
            path.push(normalize(part.as_ref()));
        }
        path
    }

    /// Root-relative path of the file stored under `key`.
    pub fn source_path(&self, key: &str) -> PathBuf {
        self.source.join(key)
    }
}

impl std::fmt::Debug for Build {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Build")
            .field("source", &self.source)
            .field("metadata", &self.metadata)
            .field("files", &self.files.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

/// Drop root, prefix and `.` components, keeping the rest verbatim.
pub(crate) fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| {
            matches!(component, Component::Normal(_) | Component::ParentDir)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use stencil_storage::MockStorage;

    use super::*;

    fn storage() -> Arc<MockStorage> {
        Arc::new(
            MockStorage::new()
                .with_file("src/index.md", "---\ntitle: Hi\n---\nHello")
                .with_file("src/nested/page.md", "Plain")
                .with_file("src/logo.png", vec![0x89, 0x00, 0xff])
                .with_file("templates/layout.html", "{{ contents }}"),
        )
    }

    #[test]
    fn test_read_parses_front_matter() {
        let build = Build::read(storage(), "src").unwrap();

        assert_eq!(
            build.files().keys().collect::<Vec<_>>(),
            vec!["index.md", "logo.png", "nested/page.md"]
        );
        let index = build.file("index.md").unwrap();
        assert_eq!(index.contents, b"Hello");
        assert_eq!(index.metadata["title"], json!("Hi"));
        assert_eq!(
            build.file("logo.png").unwrap().contents,
            vec![0x89, 0x00, 0xff]
        );
    }

    #[test]
    fn test_read_reports_bad_front_matter() {
        let storage = MockStorage::new().with_file("src/bad.md", "---\n: [\n---\n");
        let storage = Arc::new(storage);

        let err = Build::read(storage, "src").unwrap_err();

        assert!(matches!(err, BuildError::FrontMatter { ref path, .. } if path == "bad.md"));
    }

    #[test]
    fn test_write_to_destination() {
        let storage = storage();
        let build = Build::read(Arc::clone(&storage) as Arc<dyn Storage>, "src").unwrap();

        let written = build.write("build").unwrap();

        assert_eq!(written, 3);
        assert_eq!(storage.contents("build/index.md").unwrap(), b"Hello");
        assert_eq!(storage.contents("build/nested/page.md").unwrap(), b"Plain");
        assert_eq!(
            storage.contents("build/logo.png").unwrap(),
            vec![0x89, 0x00, 0xff]
        );
    }

    #[test]
    fn test_join_strips_root_and_current_dir() {
        let build = Build::new(storage(), "./src");

        assert_eq!(build.source(), Path::new("src"));
        assert_eq!(
            build.join(["templates", "/partials/nav.html"]),
            PathBuf::from("templates/partials/nav.html")
        );
        assert_eq!(build.source_path("a/b.md"), PathBuf::from("src/a/b.md"));
    }
}
