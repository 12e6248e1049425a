//! Template engine abstraction.
//!
//! This module defines the [`TemplateEngine`] trait that every rendering
//! backend implements, and the [`TemplateLoader`] trait engines use to
//! resolve templates referenced by name from inside a template.

use std::path::Path;
use std::sync::Arc;

use crate::error::EngineError;

/// Merged key/value mapping passed to a single render invocation.
pub type Context = serde_json::Map<String, serde_json::Value>;

/// Resolves template names referenced from inside a template.
///
/// Engines with native inheritance call this when they encounter
/// `{% extends "name" %}` or `{% include "name" %}`.
pub trait TemplateLoader: Send + Sync {
    /// Load the source text of the template called `name`.
    ///
    /// Returns [`EngineError::TemplateNotFound`] when no such template exists.
    fn load_template(&self, name: &str) -> Result<String, EngineError>;
}

/// A template engine that renders template text against a [`Context`].
///
/// Implementations only render a single template. Chaining rendered output
/// through further layouts is the caller's job.
pub trait TemplateEngine: Send + Sync {
    /// Registered name of the engine.
    fn name(&self) -> &'static str;

    /// Render template source text with the given context.
    ///
    /// `loader` resolves templates the source refers to by name. Engines that
    /// do not support inheritance ignore it.
    fn render_str(
        &self,
        source: &str,
        context: &Context,
        loader: Option<Arc<dyn TemplateLoader>>,
    ) -> Result<String, EngineError>;

    /// Read a template file from disk and render it with the given context.
    fn render_file(&self, path: &Path, context: &Context) -> Result<String, EngineError> {
        let source = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.render_str(&source, context, None)
    }

    /// Whether the engine understands `{% extends %}` / `{% block %}` natively.
    fn supports_inheritance(&self) -> bool;
}
