//! File selection.

use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use stencil_config::{ConfigError, PatternList, TemplatesOptions};

use crate::build::normalize;
use crate::file::ContentFile;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

/// Decides which files of a build are rendered.
#[derive(Debug)]
pub struct FileSelector {
    template_directory: PathBuf,
    source: PathBuf,
    patterns: Vec<(bool, Pattern)>,
    in_place: bool,
    use_extends: bool,
    has_fallback: bool,
}

impl FileSelector {
    /// Compile the selection rules for a build rooted at `source`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] if a pattern does not compile.
    pub fn new(options: &TemplatesOptions, source: &Path) -> Result<Self, ConfigError> {
        let patterns = options
            .pattern
            .iter()
            .flat_map(PatternList::iter)
            .map(|raw| {
                let (negated, glob) = match raw.strip_prefix('!') {
                    Some(glob) => (true, glob),
                    None => (false, raw),
                };
                Pattern::new(glob)
                    .map(|pattern| (negated, pattern))
                    .map_err(|e| {
                        ConfigError::Validation(format!("invalid \"pattern\" {raw:?}: {e}"))
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            template_directory: normalize(Path::new(&options.directory)),
            source: normalize(source),
            patterns,
            in_place: options.in_place,
            use_extends: options.use_extends,
            has_fallback: options.has_fallback_layout(),
        })
    }

    /// Whether `file`, stored under `path`, should be rendered.
    pub fn is_eligible(&self, path: &str, file: &ContentFile) -> bool {
        if self.source.join(path).starts_with(&self.template_directory) {
            tracing::trace!(path, "Skipping file inside template directory");
            return false;
        }
        if !self.matches(path) {
            tracing::trace!(path, "Skipping file not matching pattern");
            return false;
        }
        if !file.is_text() {
            tracing::trace!(path, "Skipping binary file");
            return false;
        }
        if !self.in_place && !self.has_fallback && !self.references_layout(file) {
            tracing::trace!(path, "Skipping file without layout");
            return false;
        }
        true
    }

    /// Apply the patterns in order; negated entries remove earlier matches.
    fn matches(&self, path: &str) -> bool {
        if self.patterns.is_empty() {
            return true;
        }
        let mut matched = false;
        for (negated, pattern) in &self.patterns {
            if pattern.matches_with(path, MATCH_OPTIONS) {
                matched = !negated;
            }
        }
        matched
    }

    fn references_layout(&self, file: &ContentFile) -> bool {
        file.template().is_some() || (self.use_extends && file.extends().is_some())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn selector(options: serde_json::Value) -> FileSelector {
        let options = TemplatesOptions::from_value(options).unwrap();
        FileSelector::new(&options, Path::new("src")).unwrap()
    }

    fn templated() -> ContentFile {
        ContentFile::new("body").with_metadata("template", "layout.html")
    }

    #[test]
    fn test_file_with_template_selected() {
        let selector = selector(json!("simple"));

        assert!(selector.is_eligible("index.md", &templated()));
    }

    #[test]
    fn test_file_without_template_skipped() {
        let selector = selector(json!("simple"));

        assert!(!selector.is_eligible("index.md", &ContentFile::new("body")));
    }

    #[test]
    fn test_in_place_selects_everything_textual() {
        let selector = selector(json!({"engine": "simple", "inPlace": true}));

        assert!(selector.is_eligible("index.md", &ContentFile::new("body")));
    }

    #[test]
    fn test_default_and_master_select_plain_files() {
        let with_default = selector(json!({"engine": "simple", "default": "page.html"}));
        let with_master = selector(json!({"engine": "simple", "master": "master.html"}));

        let file = ContentFile::new("body");

        assert!(with_default.is_eligible("index.md", &file));
        assert!(with_master.is_eligible("index.md", &file));
    }

    #[test]
    fn test_extends_reference_selects_in_extends_mode() {
        let file = ContentFile::new("body").with_metadata("extends", "base.html");
        let extends = selector(json!({"engine": "minijinja", "useExtends": true}));

        assert!(extends.is_eligible("a.md", &file));
        assert!(!selector(json!("minijinja")).is_eligible("a.md", &file));
    }

    #[test]
    fn test_binary_skipped() {
        let selector = selector(json!({"engine": "simple", "inPlace": true}));
        let file = ContentFile::new(vec![0x00, 0x01, 0x02]).with_metadata("template", "x.html");

        assert!(!selector.is_eligible("image.bin", &file));
    }

    #[test]
    fn test_template_directory_excluded() {
        let options = TemplatesOptions::from_value(json!({
            "engine": "simple",
            "directory": "src/layouts",
        }))
        .unwrap();
        let selector = FileSelector::new(&options, Path::new("src")).unwrap();

        assert!(!selector.is_eligible("layouts/page.html", &templated()));
        assert!(selector.is_eligible("layouts-old/page.html", &templated()));
        assert!(selector.is_eligible("page.html", &templated()));
    }

    #[test]
    fn test_pattern_restricts_selection() {
        let selector = selector(json!({"engine": "simple", "pattern": "*.md"}));

        assert!(selector.is_eligible("index.md", &templated()));
        assert!(!selector.is_eligible("index.html", &templated()));
        assert!(!selector.is_eligible("nested/index.md", &templated()));
    }

    #[test]
    fn test_pattern_list_with_negation() {
        let selector = selector(json!({
            "engine": "simple",
            "pattern": ["**/*.md", "!drafts/**"],
        }));

        assert!(selector.is_eligible("index.md", &templated()));
        assert!(selector.is_eligible("posts/first.md", &templated()));
        assert!(!selector.is_eligible("drafts/wip.md", &templated()));
    }

    #[test]
    fn test_pattern_skips_dotfiles_unless_literal() {
        let literal = selector(json!({"engine": "simple", "pattern": ".*.md"}));
        let options = json!({"engine": "simple", "pattern": ["*.md", "**/*.html"]});
        let selector = selector(options);

        assert!(!selector.is_eligible(".draft.md", &templated()));
        assert!(!selector.is_eligible(".cache/page.html", &templated()));
        assert!(selector.is_eligible("docs/page.html", &templated()));
        assert!(literal.is_eligible(".draft.md", &templated()));
    }
}
