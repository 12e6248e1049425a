//! Error types for the layout pass.

use std::path::PathBuf;

use stencil_config::ConfigError;
use stencil_engine::EngineError;
use stencil_storage::StorageError;

use crate::frontmatter::FrontMatterError;

/// Failure converting a single file.
#[derive(Debug, thiserror::Error)]
pub enum FileError {
    /// Layout missing from both the collection and storage.
    #[error("Template not found: {name} (looked for {})", path.display())]
    TemplateNotFound {
        /// Name as referenced.
        name: String,
        /// Resolved root-relative path.
        path: PathBuf,
    },
    /// The engine rejected a template or failed while rendering it.
    #[error(transparent)]
    Render(#[from] EngineError),
    /// A layout chain came back to a layout it already applied.
    #[error("Layout cycle: {} is already part of the chain", layout.display())]
    LayoutCycle {
        /// Layout that was revisited.
        layout: PathBuf,
    },
    /// A layout has malformed front-matter.
    #[error("Invalid front-matter in layout {}: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },
    /// A layout is not text.
    #[error("Layout is not text: {}", path.display())]
    NotText { path: PathBuf },
    /// Reading a layout failed for a reason other than absence.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Error type for the layout pass.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    /// Invalid options, reported before any file is touched.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The configured engine is not registered.
    #[error("Unknown template engine: {0}")]
    UnknownEngine(String),
    /// One or more files failed; carries the first in path order.
    #[error("Failed to render {path}: {source}")]
    File {
        /// Collection key of the first failed file.
        path: String,
        /// Why it failed.
        #[source]
        source: FileError,
        /// Number of files that failed in the pass.
        failed: usize,
    },
}
