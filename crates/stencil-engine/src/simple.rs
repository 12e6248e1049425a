//! Simple template engine using `{{ name }}` substitution.
//!
//! # Syntax
//!
//! - `{{ name }}` - variable substitution
//! - `{{ user.name }}` - nested property access via dot notation
//! - `{{ items.0 }}` - array index access
//!
//! Missing variables render as an empty string. Everything outside a
//! `{{ ... }}` pair is copied verbatim, so single braces (CSS, JSON) are safe.
//!
//! # Limitations
//!
//! No loops, conditionals, filters, includes or inheritance. Pair it with the
//! layout chain for wrapping and use [`MiniJinjaEngine`](crate::MiniJinjaEngine)
//! for anything else.

use std::sync::Arc;

use serde_json::Value;

use crate::engine::{Context, TemplateEngine, TemplateLoader};
use crate::error::EngineError;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A lightweight engine that only substitutes variables.
///
/// # Example
///
/// ```
/// use stencil_engine::{Context, SimpleEngine, TemplateEngine};
///
/// let mut context = Context::new();
/// context.insert("user".to_owned(), serde_json::json!({"name": "Ada"}));
///
/// let output = SimpleEngine::new()
///     .render_str("Hi {{ user.name }}!", &context, None)
///     .unwrap();
/// assert_eq!(output, "Hi Ada!");
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct SimpleEngine;

impl SimpleEngine {
    /// Creates a new `SimpleEngine`.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Resolves a dotted path in the context.
    fn resolve_path<'a>(context: &'a Context, path: &str) -> Option<&'a Value> {
        let mut parts = path.split('.');
        let mut current = context.get(parts.next()?)?;

        for part in parts {
            current = match current {
                Value::Object(map) => map.get(part)?,
                Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
                _ => return None,
            };
        }

        Some(current)
    }

    /// Formats a JSON value as a string for output.
    fn format_value(value: &Value, out: &mut String) {
        match value {
            Value::String(s) => out.push_str(s),
            Value::Number(n) => out.push_str(&n.to_string()),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Null => {}
            // For arrays and objects, use JSON representation
            Value::Array(_) | Value::Object(_) => out.push_str(&value.to_string()),
        }
    }
}

impl TemplateEngine for SimpleEngine {
    fn name(&self) -> &'static str {
        "simple"
    }

    fn render_str(
        &self,
        source: &str,
        context: &Context,
        _loader: Option<Arc<dyn TemplateLoader>>,
    ) -> Result<String, EngineError> {
        let mut result = String::with_capacity(source.len());
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            result.push_str(&rest[..start]);
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                return Err(EngineError::Template(format!(
                    "Unclosed variable substitution: {}",
                    &rest[start..]
                )));
            };

            let var_name = after_open[..end].trim();
            if var_name.is_empty() {
                return Err(EngineError::Template(
                    "Empty variable name in template".to_owned(),
                ));
            }

            if let Some(value) = Self::resolve_path(context, var_name) {
                Self::format_value(value, &mut result);
            }
            rest = &after_open[end + CLOSE.len()..];
        }
        result.push_str(rest);

        Ok(result)
    }

    fn supports_inheritance(&self) -> bool {
        false
    }
}
