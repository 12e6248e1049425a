//! Capability map from engine names to engines.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::engine::TemplateEngine;
use crate::error::EngineError;
use crate::jinja::MiniJinjaEngine;
use crate::simple::SimpleEngine;

/// Registry of template engines keyed by name.
///
/// Lookups are case-sensitive. A name that was never registered yields
/// [`EngineError::UnknownEngine`], so callers can validate their configured
/// engine before any rendering starts.
#[derive(Clone, Default)]
pub struct EngineRegistry {
    engines: BTreeMap<String, Arc<dyn TemplateEngine>>,
}

impl EngineRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the built-in engines.
    ///
    /// | name | engine |
    /// |---|---|
    /// | `minijinja`, `jinja`, `jinja2` | [`MiniJinjaEngine`] |
    /// | `simple` | [`SimpleEngine`] |
    #[must_use]
    pub fn with_defaults() -> Self {
        let jinja: Arc<dyn TemplateEngine> = Arc::new(MiniJinjaEngine::new());
        let mut registry = Self::new();
        for alias in ["minijinja", "jinja", "jinja2"] {
            registry.register_arc(alias, Arc::clone(&jinja));
        }
        registry.register("simple", SimpleEngine::new());
        registry
    }

    /// Register an engine under `name`, replacing any previous entry.
    pub fn register(&mut self, name: impl Into<String>, engine: impl TemplateEngine + 'static) {
        self.register_arc(name, Arc::new(engine));
    }

    /// Register a shared engine under `name`, replacing any previous entry.
    pub fn register_arc(&mut self, name: impl Into<String>, engine: Arc<dyn TemplateEngine>) {
        self.engines.insert(name.into(), engine);
    }

    /// Look up an engine by name.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::UnknownEngine`] if nothing is registered under `name`.
    pub fn get(&self, name: &str) -> Result<Arc<dyn TemplateEngine>, EngineError> {
        self.engines
            .get(name)
            .map(Arc::clone)
            .ok_or_else(|| EngineError::UnknownEngine(name.to_owned()))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.engines.keys().map(String::as_str)
    }
}

impl std::fmt::Debug for EngineRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineRegistry")
            .field("engines", &self.engines.keys().collect::<Vec<_>>())
            .finish()
    }
}
