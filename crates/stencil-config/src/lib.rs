//! Configuration management for stencil.
//!
//! Parses `stencil.toml` project files with serde and provides auto-discovery
//! of the file in parent directories. CLI settings can be applied during load
//! via [`CliSettings`].
//!
//! ```toml
//! source = "src"
//! destination = "build"
//!
//! [metadata]
//! site = "Demo"
//!
//! [templates]
//! engine = "minijinja"
//! default = "page.html"
//! ```
//!
//! The `[templates]` section (or a bare `templates = "minijinja"`) is parsed
//! into [`TemplatesOptions`].

mod options;

pub use options::{
    DEFAULT_BLOCK, DEFAULT_BLOCK_PATTERN, DEFAULT_DIRECTORY, DEFAULT_EXTENDS_PATTERN, PatternList,
    TemplatesOptions,
};

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override source directory (relative to the project root).
    pub source: Option<PathBuf>,
    /// Override destination directory (relative to the project root).
    pub destination: Option<PathBuf>,
    /// Override template engine.
    pub engine: Option<String>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "stencil.toml";

/// Project configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Source directory as written in the file.
    source: Option<String>,
    /// Destination directory as written in the file.
    destination: Option<String>,
    /// Global site metadata, visible to every render.
    pub metadata: Map<String, Value>,
    /// Raw `[templates]` value; parsed after loading.
    templates: Option<Value>,

    /// Resolved project paths (set after loading).
    #[serde(skip)]
    pub paths: ProjectPaths,
    /// Parsed layout options (set after loading).
    #[serde(skip)]
    pub templates_resolved: Option<TemplatesOptions>,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Resolved project layout.
///
/// `source` and `destination` are relative to `root`, which is the directory
/// containing the config file (or the working directory without one).
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProjectPaths {
    /// Project root directory.
    pub root: PathBuf,
    /// Directory holding the content files.
    pub source: PathBuf,
    /// Directory rendered files are written to.
    pub destination: PathBuf,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Layout options have the wrong shape.
    #[error("Invalid templates options: {0}")]
    Options(#[from] serde_json::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a project path to stay below the project root.
pub(crate) fn require_relative(path: &Path, field: &str) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    let escapes =
        path.is_absolute() || path.components().any(|c| matches!(c, Component::ParentDir));
    if escapes {
        return Err(ConfigError::Validation(format!(
            "{field} must be a relative path inside the project"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `stencil.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading, allowing CLI arguments to take
    /// precedence over config file values. Validation runs last.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails, or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML text with `root` as the project root.
    ///
    /// # Errors
    ///
    /// Returns error if parsing fails or the configuration is invalid.
    pub fn from_toml_str(content: &str, root: &Path) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.resolve(root)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(source) = &settings.source {
            self.paths.source.clone_from(source);
        }
        if let Some(destination) = &settings.destination {
            self.paths.destination.clone_from(destination);
        }
        if let Some(engine) = &settings.engine {
            match &mut self.templates_resolved {
                Some(options) => options.engine.clone_from(engine),
                None => self.templates_resolved = Some(TemplatesOptions::engine(engine.clone())),
            }
        }
    }

    /// Get validated layout options.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if no `[templates]` section was
    /// configured and no engine was given on the command line.
    pub fn require_templates(&self) -> Result<&TemplatesOptions, ConfigError> {
        self.templates_resolved.as_ref().ok_or_else(|| {
            ConfigError::Validation("[templates] section required in config".into())
        })
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_relative(&self.paths.source, "source")?;
        require_relative(&self.paths.destination, "destination")?;
        if self.paths.source == self.paths.destination {
            return Err(ConfigError::Validation(
                "source and destination must differ".to_owned(),
            ));
        }
        if let Some(options) = &self.templates_resolved {
            options.validate()?;
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config rooted at the current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config rooted at `base`.
    fn default_with_base(base: &Path) -> Self {
        Self {
            source: None,
            destination: None,
            metadata: Map::new(),
            templates: None,
            paths: ProjectPaths {
                root: base.to_path_buf(),
                source: PathBuf::from("src"),
                destination: PathBuf::from("build"),
            },
            templates_resolved: None,
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve(config_dir)?;
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Resolve raw values: project paths and layout options.
    fn resolve(&mut self, root: &Path) -> Result<(), ConfigError> {
        self.paths = ProjectPaths {
            root: root.to_path_buf(),
            source: PathBuf::from(self.source.as_deref().unwrap_or("src")),
            destination: PathBuf::from(self.destination.as_deref().unwrap_or("build")),
        };
        self.templates_resolved = self
            .templates
            .take()
            .map(TemplatesOptions::from_value)
            .transpose()?;
        Ok(())
    }
}
