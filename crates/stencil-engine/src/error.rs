//! Engine error type.

use std::path::PathBuf;

/// Error raised by the render adapter.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// No engine is registered under this name.
    #[error("Unknown template engine: {0}")]
    UnknownEngine(String),
    /// A template referenced by name could not be located.
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    /// Syntax or runtime failure reported by the engine.
    #[error("Template error: {0}")]
    Template(String),
    /// A template file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    Io {
        /// Path of the template file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl From<minijinja::Error> for EngineError {
    fn from(err: minijinja::Error) -> Self {
        if matches!(err.kind(), minijinja::ErrorKind::TemplateNotFound) {
            let name = err
                .detail()
                .map_or_else(|| err.to_string(), ToOwned::to_owned);
            return Self::TemplateNotFound(name);
        }
        Self::Template(err.to_string())
    }
}
