//! The layout pass over a whole build.

use std::sync::Arc;

use rayon::prelude::*;
use serde_json::Value;
use stencil_config::{ConfigError, TemplatesOptions};
use stencil_engine::{EngineRegistry, TemplateEngine};

use crate::build::Build;
use crate::error::{FileError, TemplateError};
use crate::merge::PassContext;
use crate::render::Renderer;
use crate::resolve::LayoutResolver;
use crate::select::FileSelector;

/// Counts reported by a successful pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Files whose contents were replaced.
    pub rendered: usize,
    /// Files left untouched.
    pub skipped: usize,
}

enum Outcome {
    Skipped,
    Rendered,
    Failed(String, FileError),
}

/// Renders eligible files of a [`Build`] through their layouts.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use stencil_config::TemplatesOptions;
/// use stencil_core::{Build, ContentFile, Templates};
/// use stencil_engine::EngineRegistry;
/// use stencil_storage::MockStorage;
///
/// let storage =
///     MockStorage::new().with_file("templates/layout.html", "<h1>{{ title }}</h1>{{ contents }}");
/// let mut build = Build::new(Arc::new(storage), "src");
/// build.insert(
///     "index.md",
///     ContentFile::new("Body")
///         .with_metadata("template", "layout.html")
///         .with_metadata("title", "Hi"),
/// );
///
/// let registry = EngineRegistry::with_defaults();
/// let templates = Templates::new(TemplatesOptions::engine("simple"), &registry).unwrap();
/// templates.run(&mut build).unwrap();
///
/// assert_eq!(build.file("index.md").unwrap().contents, b"<h1>Hi</h1>Body");
/// ```
pub struct Templates {
    options: TemplatesOptions,
    engine: Arc<dyn TemplateEngine>,
}

impl Templates {
    /// Validate `options` and look up the engine in `registry`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Config`] for invalid options and
    /// [`TemplateError::UnknownEngine`] if the engine is not registered.
    pub fn new(
        options: TemplatesOptions,
        registry: &EngineRegistry,
    ) -> Result<Self, TemplateError> {
        options.validate()?;
        let engine = registry
            .get(&options.engine)
            .map_err(|_| TemplateError::UnknownEngine(options.engine.clone()))?;

        if options.use_extends && !engine.supports_inheritance() {
            return Err(ConfigError::Validation(format!(
                "\"useExtends\" requires an engine with template inheritance, {:?} has none",
                options.engine
            ))
            .into());
        }

        tracing::debug!(engine = engine.name(), "Configured templates pass");
        Ok(Self { options, engine })
    }

    /// Parse options from a value (object or engine name) and construct.
    ///
    /// # Errors
    ///
    /// Same as [`Templates::new`].
    pub fn from_value(value: Value, registry: &EngineRegistry) -> Result<Self, TemplateError> {
        Self::new(TemplatesOptions::from_value(value)?, registry)
    }

    pub fn options(&self) -> &TemplatesOptions {
        &self.options
    }

    /// Render every eligible file of `build` in place.
    ///
    /// Files are converted in parallel. A failing file does not stop the
    /// others; once all are done, the first failure in path order is
    /// returned and every failure is logged.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::File`] if any file failed.
    pub fn run(&self, build: &mut Build) -> Result<PassSummary, TemplateError> {
        let selector = FileSelector::new(&self.options, build.source())?;
        let pass = PassContext::new(self.options.params.clone(), build.metadata().clone());
        let resolver = Arc::new(LayoutResolver::new(build, &self.options.directory));
        let renderer = Renderer::new(self.engine.as_ref(), &resolver, &self.options, &pass);

        let outcomes: Vec<Outcome> = build
            .files_mut()
            .par_iter_mut()
            .map(|(path, file)| {
                if !selector.is_eligible(path, file) {
                    return Outcome::Skipped;
                }
                match renderer.render(path, file) {
                    Ok(output) => {
                        file.contents = output.into_bytes();
                        Outcome::Rendered
                    }
                    Err(e) => Outcome::Failed(path.clone(), e),
                }
            })
            .collect();

        let mut summary = PassSummary::default();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Outcome::Skipped => summary.skipped += 1,
                Outcome::Rendered => summary.rendered += 1,
                Outcome::Failed(path, e) => failures.push((path, e)),
            }
        }

        if failures.is_empty() {
            tracing::info!(
                rendered = summary.rendered,
                skipped = summary.skipped,
                "Templates pass finished"
            );
            return Ok(summary);
        }

        failures.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (path, e) in &failures {
            tracing::error!(path = %path, error = %e, "Failed to render file");
        }
        let failed = failures.len();
        let (path, source) = failures.swap_remove(0);
        Err(TemplateError::File {
            path,
            source,
            failed,
        })
    }
}

impl std::fmt::Debug for Templates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Templates")
            .field("options", &self.options)
            .field("engine", &self.engine.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use stencil_engine::{Context, EngineError, TemplateLoader};
    use stencil_storage::MockStorage;

    use super::*;
    use crate::file::ContentFile;

    struct PlainEngine;

    impl TemplateEngine for PlainEngine {
        fn name(&self) -> &'static str {
            "plain"
        }

        fn render_str(
            &self,
            source: &str,
            _context: &Context,
            _loader: Option<Arc<dyn TemplateLoader>>,
        ) -> Result<String, EngineError> {
            Ok(source.to_owned())
        }

        fn supports_inheritance(&self) -> bool {
            false
        }
    }

    static_assertions::assert_impl_all!(Templates: Send, Sync);

    #[test]
    fn test_unknown_engine() {
        let registry = EngineRegistry::with_defaults();

        let err = Templates::new(TemplatesOptions::engine("liquid"), &registry).unwrap_err();

        assert!(matches!(err, TemplateError::UnknownEngine(ref name) if name == "liquid"));
    }

    #[test]
    fn test_missing_engine_is_config_error() {
        let registry = EngineRegistry::with_defaults();

        let err = Templates::from_value(json!({"directory": "layouts"}), &registry).unwrap_err();

        assert!(matches!(err, TemplateError::Config(_)));
    }

    #[test]
    fn test_extends_requires_inheritance() {
        let mut registry = EngineRegistry::new();
        registry.register("plain", PlainEngine);

        let options = json!({"engine": "plain", "useExtends": true});

        let err = Templates::from_value(options, &registry).unwrap_err();

        assert!(matches!(
            err,
            TemplateError::Config(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_empty_default_and_master_leave_plain_files_alone() {
        let mut build = Build::new(Arc::new(MockStorage::new()), "src");
        build.insert("a.md", ContentFile::new("A"));
        let templates = Templates::from_value(
            json!({"engine": "simple", "default": "", "master": ""}),
            &EngineRegistry::with_defaults(),
        )
        .unwrap();

        let summary = templates.run(&mut build).unwrap();

        assert_eq!(
            summary,
            PassSummary {
                rendered: 0,
                skipped: 1
            }
        );
        assert_eq!(build.file("a.md").unwrap().contents, b"A");
    }

    #[test]
    fn test_directory_outside_project_rejected_up_front() {
        let err = Templates::from_value(
            json!({"engine": "simple", "directory": "../shared"}),
            &EngineRegistry::with_defaults(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            TemplateError::Config(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_custom_engine() {
        let mut registry = EngineRegistry::new();
        registry.register("plain", PlainEngine);
        let storage = MockStorage::new().with_file("templates/layout.html", "{{ contents }}!");
        let mut build = Build::new(Arc::new(storage), "src");
        let file = ContentFile::new("A").with_metadata("template", "layout.html");
        build.insert("a.md", file);

        let summary = Templates::from_value(json!("plain"), &registry)
            .unwrap()
            .run(&mut build)
            .unwrap();

        assert_eq!(
            summary,
            PassSummary {
                rendered: 1,
                skipped: 0
            }
        );
        assert_eq!(build.file("a.md").unwrap().contents, b"{{ contents }}!");
    }

    #[test]
    fn test_failures_reported_in_path_order() {
        let mut build = Build::new(Arc::new(MockStorage::new()), "src");
        for name in ["b", "a"] {
            let template = format!("missing-{name}.html");
            let file = ContentFile::new(name).with_metadata("template", template);
            build.insert(format!("{name}.md"), file);
        }
        let registry = EngineRegistry::with_defaults();
        let templates = Templates::from_value(json!("simple"), &registry).unwrap();

        let err = templates.run(&mut build).unwrap_err();

        match err {
            TemplateError::File {
                path,
                source: FileError::TemplateNotFound { name, .. },
                failed,
            } => {
                assert_eq!(path, "a.md");
                assert_eq!(name, "missing-a.html");
                assert_eq!(failed, 2);
            }
            other => panic!("expected missing template, got {other:?}"),
        }
    }
}
