//! Layout plugin options.
//!
//! Options arrive as a JSON-like value (a `[templates]` TOML table, a JSON
//! object, or a bare engine name). Recognized keys become typed fields; every
//! other key is kept verbatim in [`TemplatesOptions::params`] and exposed to
//! every render context.

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::{ConfigError, require_relative};

/// Default template directory, relative to the project root.
pub const DEFAULT_DIRECTORY: &str = "templates";
/// Default block name used in extends mode.
pub const DEFAULT_BLOCK: &str = "content";
/// Default textual pattern for the extends statement.
pub const DEFAULT_EXTENDS_PATTERN: &str = "{% extends \"%s\" %}";
/// Default opening/closing block statements.
pub const DEFAULT_BLOCK_PATTERN: [&str; 2] = ["{% block %s %}", "{% endblock %}"];

/// One glob or a list of globs restricting which files are rendered.
///
/// Entries starting with `!` remove matches of earlier entries.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    /// A single glob.
    One(String),
    /// Several globs, applied in order.
    Many(Vec<String>),
}

impl PatternList {
    /// Iterate over the globs in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let slice: &[String] = match self {
            Self::One(pattern) => std::slice::from_ref(pattern),
            Self::Many(patterns) => patterns,
        };
        slice.iter().map(String::as_str)
    }
}

/// Options for the layout pass.
///
/// # Example
///
/// ```
/// use stencil_config::TemplatesOptions;
///
/// let options = TemplatesOptions::from_value(serde_json::json!({
///     "engine": "minijinja",
///     "default": "page.html",
///     "siteUrl": "https://example.com",
/// }))
/// .unwrap();
///
/// assert_eq!(options.default_template.as_deref(), Some("page.html"));
/// assert_eq!(options.params["siteUrl"], "https://example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplatesOptions {
    /// Name of the rendering engine (required).
    #[serde(default)]
    pub engine: String,
    /// Template folder, relative to the project root.
    #[serde(default = "default_directory")]
    pub directory: String,
    /// Optional globs restricting eligible files.
    #[serde(default)]
    pub pattern: Option<PatternList>,
    /// Render each file's own contents as a template before any layout.
    #[serde(default)]
    pub in_place: bool,
    /// Layout used when a file names none.
    #[serde(default, deserialize_with = "non_empty", rename = "default")]
    pub default_template: Option<String>,
    /// Outermost layout applied once after a file's own layout chain.
    #[serde(default, deserialize_with = "non_empty")]
    pub master: Option<String>,
    /// Inject `extends`/`block` statements around the contents instead of
    /// chaining layouts (for engines with native inheritance).
    #[serde(default)]
    pub use_extends: bool,
    /// Layout extended when a file names none (extends mode).
    #[serde(default, deserialize_with = "non_empty")]
    pub default_extends: Option<String>,
    /// Block receiving the contents when a file names none (extends mode).
    #[serde(default = "default_block")]
    pub default_block: String,
    /// Extends statement, `%s` replaced with the layout name.
    #[serde(default = "default_extends_pattern")]
    pub extends_pattern: String,
    /// Opening and closing block statements, `%s` replaced with the block name.
    #[serde(default = "default_block_pattern")]
    pub block_pattern: [String; 2],
    /// Unrecognized options, passed to every render context.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Treat an empty layout name as unset.
fn non_empty<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.filter(|name| !name.trim().is_empty()))
}

fn default_directory() -> String {
    DEFAULT_DIRECTORY.to_owned()
}

fn default_block() -> String {
    DEFAULT_BLOCK.to_owned()
}

fn default_extends_pattern() -> String {
    DEFAULT_EXTENDS_PATTERN.to_owned()
}

fn default_block_pattern() -> [String; 2] {
    DEFAULT_BLOCK_PATTERN.map(str::to_owned)
}

impl TemplatesOptions {
    /// Options with only the engine set.
    #[must_use]
    pub fn engine(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            directory: default_directory(),
            pattern: None,
            in_place: false,
            default_template: None,
            master: None,
            use_extends: false,
            default_extends: None,
            default_block: default_block(),
            extends_pattern: default_extends_pattern(),
            block_pattern: default_block_pattern(),
            params: Map::new(),
        }
    }

    /// Parse options from a value and validate them.
    ///
    /// A bare string is shorthand for `{ "engine": <string> }`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Options`] if the value has the wrong shape and
    /// [`ConfigError::Validation`] if a value is invalid.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let options = match value {
            Value::String(engine) => Self::engine(engine),
            other => serde_json::from_value(other)?,
        };
        options.validate()?;
        Ok(options)
    }

    /// Validate option values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the offending option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.trim().is_empty() {
            return Err(ConfigError::Validation(
                "\"engine\" option required".to_owned(),
            ));
        }
        require_relative(Path::new(self.directory.trim()), "\"directory\" option")?;
        for (name, value) in [
            ("default", &self.default_template),
            ("master", &self.master),
            ("defaultExtends", &self.default_extends),
        ] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "\"{name}\" option cannot be empty"
                )));
            }
        }
        for pattern in self.pattern.iter().flat_map(PatternList::iter) {
            let glob = pattern.strip_prefix('!').unwrap_or(pattern);
            glob::Pattern::new(glob).map_err(|e| {
                ConfigError::Validation(format!("invalid \"pattern\" {pattern:?}: {e}"))
            })?;
        }
        if self.use_extends {
            if !self.extends_pattern.contains("%s") {
                return Err(ConfigError::Validation(
                    "\"extendsPattern\" must contain %s".to_owned(),
                ));
            }
            if self.default_block.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "\"defaultBlock\" cannot be empty".to_owned(),
                ));
            }
        }
        Ok(())
    }

    /// Whether a file without its own reference still gets a layout.
    #[must_use]
    pub fn has_fallback_layout(&self) -> bool {
        self.default_template.is_some()
            || self.master.is_some()
            || (self.use_extends && self.default_extends.is_some())
    }
}
