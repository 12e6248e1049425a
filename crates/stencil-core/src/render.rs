//! Layout-chain rendering for a single file.

use std::collections::HashSet;
use std::sync::Arc;

use serde_json::Value;
use stencil_config::TemplatesOptions;
use stencil_engine::{Context, TemplateEngine, TemplateLoader};

use crate::error::FileError;
use crate::file::{CONTENTS_KEY, ContentFile, TEMPLATE_KEY};
use crate::merge::PassContext;
use crate::resolve::{LayoutResolver, TemplateReference};

/// Renders files through their layout chains.
///
/// Holds only shared, read-only state so one renderer serves every file of a
/// pass concurrently.
pub struct Renderer<'a> {
    engine: &'a dyn TemplateEngine,
    resolver: &'a Arc<LayoutResolver>,
    options: &'a TemplatesOptions,
    pass: &'a PassContext,
}

impl<'a> Renderer<'a> {
    pub fn new(
        engine: &'a dyn TemplateEngine,
        resolver: &'a Arc<LayoutResolver>,
        options: &'a TemplatesOptions,
        pass: &'a PassContext,
    ) -> Self {
        Self {
            engine,
            resolver,
            options,
            pass,
        }
    }

    /// Render `file` and return its final output.
    ///
    /// The file itself is not modified.
    pub fn render(&self, path: &str, file: &ContentFile) -> Result<String, FileError> {
        let text = file.text().unwrap_or_default();
        let mut context = self.pass.context_for(&file.metadata, text);
        let mut output = text.to_owned();

        if let Some(wrapped) = self.wrap_extends(file, text) {
            tracing::debug!(path, "Rendering with injected extends");
            output = self.render_step(&wrapped, &context)?;
            context.insert(CONTENTS_KEY.to_owned(), Value::String(output.clone()));
        } else if self.options.in_place {
            tracing::debug!(path, "Rendering in place");
            output = self.render_step(&output, &context)?;
            context.insert(CONTENTS_KEY.to_owned(), Value::String(output.clone()));
        }

        let mut next = file
            .template()
            .or(self.options.default_template.as_deref())
            .map(ToOwned::to_owned);
        let mut master = self
            .options
            .master
            .as_deref()
            .map(|name| self.resolver.resolve(name));
        let mut visited = HashSet::new();

        loop {
            let reference = match next.take() {
                Some(name) => self.resolver.resolve(&name),
                None => match master.take() {
                    Some(reference) if !visited.contains(&reference.path) => reference,
                    _ => break,
                },
            };
            if !visited.insert(reference.path.clone()) {
                return Err(FileError::LayoutCycle {
                    layout: reference.path,
                });
            }
            output = self.apply_layout(path, &reference, &mut context, output, &mut next)?;
        }

        Ok(output)
    }

    /// Render `output` into one layout, updating the accumulated context.
    fn apply_layout(
        &self,
        path: &str,
        reference: &TemplateReference,
        context: &mut Context,
        output: String,
        next: &mut Option<String>,
    ) -> Result<String, FileError> {
        let layout = self.resolver.load(reference)?;
        tracing::debug!(
            path,
            layout = %reference.path.display(),
            tracked = reference.is_tracked(),
            "Applying layout"
        );

        for (key, value) in &layout.metadata {
            context.insert(key.clone(), value.clone());
        }
        context.insert(CONTENTS_KEY.to_owned(), Value::String(output));

        *next = layout.template().map(ToOwned::to_owned);
        if next.is_none() {
            context.remove(TEMPLATE_KEY);
        }

        self.render_step(&layout.body, context)
    }

    fn render_step(&self, source: &str, context: &Context) -> Result<String, FileError> {
        let loader = Arc::clone(self.resolver) as Arc<dyn TemplateLoader>;
        Ok(self.engine.render_str(source, context, Some(loader))?)
    }

    /// Wrap text in the configured extends and block statements.
    ///
    /// Returns `None` outside extends mode or when the file extends nothing.
    fn wrap_extends(&self, file: &ContentFile, text: &str) -> Option<String> {
        if !self.options.use_extends {
            return None;
        }
        let extends = file.extends().or(self.options.default_extends.as_deref())?;
        let block = file.block().unwrap_or(&self.options.default_block);
        let [open, close] = &self.options.block_pattern;

        Some(format!(
            "{}{}{}{}",
            self.options.extends_pattern.replace("%s", extends),
            open.replace("%s", block),
            text,
            close.replace("%s", block),
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use stencil_engine::{MiniJinjaEngine, SimpleEngine};
    use stencil_storage::MockStorage;

    use std::path::Path;

    use super::*;
    use crate::build::Build;

    struct Fixture {
        resolver: Arc<LayoutResolver>,
        options: TemplatesOptions,
        pass: PassContext,
    }

    impl Fixture {
        fn new(storage: MockStorage, options: serde_json::Value) -> Self {
            let build = Build::new(Arc::new(storage), "src");
            let options = TemplatesOptions::from_value(options).unwrap();
            let resolver = Arc::new(LayoutResolver::new(&build, &options.directory));
            let pass = PassContext::new(options.params.clone(), build.metadata().clone());
            Self {
                resolver,
                options,
                pass,
            }
        }

        fn render(
            &self,
            engine: &dyn TemplateEngine,
            file: &ContentFile,
        ) -> Result<String, FileError> {
            Renderer::new(engine, &self.resolver, &self.options, &self.pass)
                .render("index.md", file)
        }
    }

    #[test]
    fn test_single_layout() {
        let fixture = Fixture::new(
            MockStorage::new().with_file("templates/layout.html", "<main>{{ contents }}</main>"),
            json!("simple"),
        );
        let file = ContentFile::new("Body").with_metadata("template", "layout.html");

        let output = fixture.render(&SimpleEngine, &file).unwrap();

        assert_eq!(output, "<main>Body</main>");
    }

    #[test]
    fn test_contents_not_rendered_without_in_place() {
        let fixture = Fixture::new(
            MockStorage::new().with_file("templates/layout.html", "{{ contents }}"),
            json!("minijinja"),
        );
        let file = ContentFile::new("{{ title }}")
            .with_metadata("template", "layout.html")
            .with_metadata("title", "Hi");

        let output = fixture.render(&MiniJinjaEngine::new(), &file).unwrap();

        assert_eq!(output, "{{ title }}");
    }

    #[test]
    fn test_in_place_then_layout() {
        let fixture = Fixture::new(
            MockStorage::new().with_file("templates/layout.html", "[{{ contents }}]"),
            json!({"engine": "minijinja", "inPlace": true}),
        );
        let file = ContentFile::new("{{ title }}")
            .with_metadata("template", "layout.html")
            .with_metadata("title", "Hi");

        let output = fixture.render(&MiniJinjaEngine::new(), &file).unwrap();

        assert_eq!(output, "[Hi]");
    }

    #[test]
    fn test_in_place_without_layout() {
        let options = json!({"engine": "simple", "inPlace": true});
        let fixture = Fixture::new(MockStorage::new(), options);
        let file = ContentFile::new("Hello {{ name }}").with_metadata("name", "Ada");

        let output = fixture.render(&SimpleEngine, &file).unwrap();

        assert_eq!(output, "Hello Ada");
    }

    #[test]
    fn test_two_level_chain_metadata() {
        let inner = concat!(
            "---\ntemplate: outer.html\ncolor: red\n---\n",
            "<inner color=\"{{ color }}\">{{ contents }}</inner>",
        );
        let outer = concat!(
            "---\nsection: docs\n---\n",
            "<outer color=\"{{ color }}\" section=\"{{ section }}\" template=\"{{ template }}\">",
            "{{ contents }}</outer>",
        );
        let fixture = Fixture::new(
            MockStorage::new()
                .with_file("templates/inner.html", inner)
                .with_file("templates/outer.html", outer),
            json!({"engine": "simple", "inPlace": true}),
        );
        let file = ContentFile::new("{{ color }}")
            .with_metadata("template", "inner.html")
            .with_metadata("color", "blue");

        let output = fixture.render(&SimpleEngine, &file).unwrap();

        assert_eq!(
            output,
            concat!(
                "<outer color=\"red\" section=\"docs\" template=\"\">",
                "<inner color=\"red\">blue</inner></outer>",
            )
        );
    }

    #[test]
    fn test_default_template() {
        let fixture = Fixture::new(
            MockStorage::new().with_file("templates/default.html", "<d>{{ contents }}</d>"),
            json!({"engine": "simple", "default": "default.html"}),
        );

        let file = ContentFile::new("Body");

        let output = fixture.render(&SimpleEngine, &file).unwrap();

        assert_eq!(output, "<d>Body</d>");
    }

    #[test]
    fn test_master_applied_after_chain() {
        let fixture = Fixture::new(
            MockStorage::new()
                .with_file("templates/page.html", "<page>{{ contents }}</page>")
                .with_file("templates/master.html", "<html>{{ contents }}</html>"),
            json!({"engine": "simple", "master": "master.html"}),
        );
        let file = ContentFile::new("Body").with_metadata("template", "page.html");

        let output = fixture.render(&SimpleEngine, &file).unwrap();

        assert_eq!(output, "<html><page>Body</page></html>");
    }

    #[test]
    fn test_master_not_applied_twice() {
        let fixture = Fixture::new(
            MockStorage::new()
                .with_file(
                    "templates/page.html",
                    "---\ntemplate: master.html\n---\n<page>{{ contents }}</page>",
                )
                .with_file("templates/master.html", "<html>{{ contents }}</html>"),
            json!({"engine": "simple", "master": "master.html"}),
        );
        let file = ContentFile::new("Body").with_metadata("template", "page.html");

        let output = fixture.render(&SimpleEngine, &file).unwrap();

        assert_eq!(output, "<html><page>Body</page></html>");
    }

    #[test]
    fn test_layout_cycle() {
        let fixture = Fixture::new(
            MockStorage::new()
                .with_file("templates/a.html", "---\ntemplate: b.html\n---\nA")
                .with_file("templates/b.html", "---\ntemplate: a.html\n---\nB"),
            json!("simple"),
        );
        let file = ContentFile::new("Body").with_metadata("template", "a.html");

        let err = fixture.render(&SimpleEngine, &file).unwrap_err();

        match err {
            FileError::LayoutCycle { layout } => assert_eq!(layout, Path::new("templates/a.html")),
            other => panic!("expected layout cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_layout() {
        let fixture = Fixture::new(MockStorage::new(), json!("simple"));
        let file = ContentFile::new("Body").with_metadata("template", "missing.html");

        let err = fixture.render(&SimpleEngine, &file).unwrap_err();

        assert!(matches!(err, FileError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_extends_mode() {
        let fixture = Fixture::new(
            MockStorage::new().with_file(
                "templates/base.html",
                "<title>{{ title }}</title>{% block content %}{% endblock %}",
            ),
            json!({"engine": "minijinja", "useExtends": true}),
        );
        let file = ContentFile::new("<p>{{ title }}</p>")
            .with_metadata("extends", "base.html")
            .with_metadata("title", "Hi");

        let output = fixture.render(&MiniJinjaEngine::new(), &file).unwrap();

        assert_eq!(output, "<title>Hi</title><p>Hi</p>");
    }

    #[test]
    fn test_extends_mode_custom_block() {
        let fixture = Fixture::new(
            MockStorage::new().with_file(
                "templates/base.html",
                "<aside>{% block side %}{% endblock %}</aside>",
            ),
            json!({
                "engine": "minijinja",
                "useExtends": true,
                "defaultExtends": "base.html",
            }),
        );
        let file = ContentFile::new("note").with_metadata("block", "side");

        let output = fixture.render(&MiniJinjaEngine::new(), &file).unwrap();

        assert_eq!(output, "<aside>note</aside>");
    }

    #[test]
    fn test_static_params_visible() {
        let fixture = Fixture::new(
            MockStorage::new().with_file("templates/layout.html", "{{ author }}: {{ contents }}"),
            json!({"engine": "simple", "author": "Ada"}),
        );
        let file = ContentFile::new("Body").with_metadata("template", "layout.html");

        let output = fixture.render(&SimpleEngine, &file).unwrap();

        assert_eq!(output, "Ada: Body");
    }
}
