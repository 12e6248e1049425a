//! Layout resolution and loading.
//!
//! Layouts tracked by the build (files under the template directory that
//! were read as part of the source tree) are reused with their already parsed
//! metadata. Anything else is read from storage once and cached for the rest
//! of the pass.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use serde_json::{Map, Value};
use stencil_engine::{EngineError, TemplateLoader};
use stencil_storage::Storage;

use crate::build::{Build, normalize};
use crate::error::FileError;
use crate::file::{ContentFile, TEMPLATE_KEY, is_text, path_to_key};
use crate::frontmatter::parse_front_matter;

/// A loaded layout: front-matter metadata and template body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    pub metadata: Map<String, Value>,
    pub body: String,
}

impl Layout {
    /// Next layout up the chain, if this one declares it.
    pub fn template(&self) -> Option<&str> {
        self.metadata
            .get(TEMPLATE_KEY)
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
    }

    fn from_file(file: &ContentFile) -> Option<Self> {
        file.text().map(|body| Self {
            metadata: file.metadata.clone(),
            body: body.to_owned(),
        })
    }
}

/// Where a layout lives.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateReference {
    /// Name as referenced by the file or layout.
    pub name: String,
    /// Root-relative path.
    pub path: PathBuf,
    /// Collection key, when the layout is tracked by the build.
    pub key: Option<String>,
}

impl TemplateReference {
    pub fn is_tracked(&self) -> bool {
        self.key.is_some()
    }
}

/// Resolves layout names against the template directory.
pub struct LayoutResolver {
    storage: Arc<dyn Storage>,
    directory: PathBuf,
    source: PathBuf,
    tracked: HashMap<String, Arc<Layout>>,
    cache: RwLock<HashMap<PathBuf, Arc<Layout>>>,
}

impl LayoutResolver {
    /// Create a resolver for `directory`, snapshotting layouts tracked by `build`.
    pub fn new(build: &Build, directory: &str) -> Self {
        let directory = build.join([directory]);
        let tracked = build
            .files()
            .iter()
            .filter(|(key, _)| build.source_path(key).starts_with(&directory))
            .filter_map(|(key, file)| {
                let layout = Layout::from_file(file)?;
                Some((key.clone(), Arc::new(layout)))
            })
            .collect::<HashMap<_, _>>();

        tracing::debug!(
            directory = %directory.display(),
            tracked = tracked.len(),
            "Created layout resolver"
        );

        Self {
            storage: Arc::clone(build.storage()),
            directory,
            source: build.source().to_path_buf(),
            tracked,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a layout name to its location.
    pub fn resolve(&self, name: &str) -> TemplateReference {
        let path = self.directory.join(normalize(Path::new(name)));
        let key = path
            .strip_prefix(&self.source)
            .ok()
            .map(path_to_key)
            .filter(|key| self.tracked.contains_key(key));

        TemplateReference {
            name: name.to_owned(),
            path,
            key,
        }
    }

    /// Load a resolved layout.
    ///
    /// # Errors
    ///
    /// Returns [`FileError::TemplateNotFound`] if the layout is neither tracked
    /// nor in storage, or another [`FileError`] if it cannot be read or parsed.
    pub fn load(&self, reference: &TemplateReference) -> Result<Arc<Layout>, FileError> {
        if let Some(key) = &reference.key
            && let Some(layout) = self.tracked.get(key)
        {
            return Ok(Arc::clone(layout));
        }
        if let Some(layout) = self.cache.read().unwrap().get(&reference.path) {
            return Ok(Arc::clone(layout));
        }

        let bytes = self.storage.read(&reference.path).map_err(|e| {
            if e.is_not_found() {
                FileError::TemplateNotFound {
                    name: reference.name.clone(),
                    path: reference.path.clone(),
                }
            } else {
                FileError::Storage(e)
            }
        })?;
        if !is_text(&bytes) {
            return Err(FileError::NotText {
                path: reference.path.clone(),
            });
        }
        let text = String::from_utf8_lossy(&bytes);
        let (metadata, body) = parse_front_matter(&text).map_err(|source| FileError::FrontMatter {
            path: reference.path.clone(),
            source,
        })?;
        let layout = Arc::new(Layout {
            metadata,
            body: body.to_owned(),
        });

        tracing::debug!(path = %reference.path.display(), "Loaded layout from storage");
        self.cache
            .write()
            .unwrap()
            .entry(reference.path.clone())
            .or_insert_with(|| Arc::clone(&layout));
        Ok(layout)
    }
}

impl TemplateLoader for LayoutResolver {
    fn load_template(&self, name: &str) -> Result<String, EngineError> {
        match self.load(&self.resolve(name)) {
            Ok(layout) => Ok(layout.body.clone()),
            Err(FileError::TemplateNotFound { name, .. }) => {
                Err(EngineError::TemplateNotFound(name))
            }
            Err(e) => Err(EngineError::Template(e.to_string())),
        }
    }
}

impl std::fmt::Debug for LayoutResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutResolver")
            .field("directory", &self.directory)
            .field("source", &self.source)
            .field("tracked", &self.tracked.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}
