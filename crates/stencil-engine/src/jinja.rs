//! MiniJinja-backed engine.

use std::sync::Arc;

use minijinja::{AutoEscape, Environment, ErrorKind};

use crate::engine::{Context, TemplateEngine, TemplateLoader};
use crate::error::EngineError;

/// MiniJinja-based template engine.
///
/// Provides Jinja2-compatible syntax: loops, conditionals, filters, macros and
/// template inheritance. Auto-escaping is disabled so rendered child content
/// passed as `contents` is emitted verbatim, and trailing newlines are kept.
///
/// # Example
///
/// ```
/// use stencil_engine::{Context, MiniJinjaEngine, TemplateEngine};
///
/// let engine = MiniJinjaEngine::new();
/// let mut context = Context::new();
/// context.insert("items".to_owned(), serde_json::json!(["a", "b"]));
///
/// let output = engine
///     .render_str("{% for i in items %}{{ i }};{% endfor %}", &context, None)
///     .unwrap();
/// assert_eq!(output, "a;b;");
/// ```
#[derive(Clone)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
}

impl MiniJinjaEngine {
    /// Create a new engine with stencil's environment defaults.
    #[must_use]
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        Self { env }
    }

    /// Returns a mutable reference to the underlying MiniJinja environment.
    ///
    /// Use this to register custom filters or functions before the engine is
    /// handed to an [`EngineRegistry`](crate::EngineRegistry).
    pub fn environment_mut(&mut self) -> &mut Environment<'static> {
        &mut self.env
    }
}

impl Default for MiniJinjaEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateEngine for MiniJinjaEngine {
    fn name(&self) -> &'static str {
        "minijinja"
    }

    fn render_str(
        &self,
        source: &str,
        context: &Context,
        loader: Option<Arc<dyn TemplateLoader>>,
    ) -> Result<String, EngineError> {
        let Some(loader) = loader else {
            return Ok(self.env.render_str(source, context)?);
        };

        // Loaders are 'static closures, so scope them to a per-render environment.
        let mut env = self.env.clone();
        env.set_loader(move |name| match loader.load_template(name) {
            Ok(source) => Ok(Some(source)),
            Err(EngineError::TemplateNotFound(_)) => Ok(None),
            Err(err) => Err(minijinja::Error::new(
                ErrorKind::InvalidOperation,
                err.to_string(),
            )),
        });
        Ok(env.render_str(source, context)?)
    }

    fn supports_inheritance(&self) -> bool {
        true
    }
}
