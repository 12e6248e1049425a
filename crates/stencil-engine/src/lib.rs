//! Template engine adapters for stencil.
//!
//! The layout pass never depends on a specific template syntax. It talks to a
//! [`TemplateEngine`] looked up by name in an [`EngineRegistry`]:
//!
//! - [`MiniJinjaEngine`] (`"minijinja"`, aliases `"jinja"` and `"jinja2"`):
//!   Jinja2 syntax with loops, filters and native `{% extends %}` support
//! - [`SimpleEngine`] (`"simple"`): `{{ name }}` substitution only
//!
//! # Example
//!
//! ```
//! use stencil_engine::{Context, EngineRegistry};
//!
//! let registry = EngineRegistry::with_defaults();
//! let engine = registry.get("minijinja").unwrap();
//!
//! let mut context = Context::new();
//! context.insert("title".to_owned(), "Hi".into());
//! let output = engine.render_str("<h1>{{ title }}</h1>", &context, None).unwrap();
//! assert_eq!(output, "<h1>Hi</h1>");
//! ```

mod engine;
mod error;
mod jinja;
mod registry;
mod simple;

pub use engine::{Context, TemplateEngine, TemplateLoader};
pub use error::EngineError;
pub use jinja::MiniJinjaEngine;
pub use registry::EngineRegistry;
pub use simple::SimpleEngine;
