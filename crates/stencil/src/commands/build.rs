//! `stencil build` command implementation.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use stencil_config::{CliSettings, Config};
use stencil_core::{Build, TemplateError, Templates};
use stencil_engine::EngineRegistry;
use stencil_storage::{FsStorage, Storage};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the build command.
#[derive(Args)]
pub(crate) struct BuildArgs {
    /// Source directory, relative to the project root (overrides config).
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Destination directory, relative to the project root (overrides config).
    #[arg(short, long)]
    destination: Option<PathBuf>,

    /// Template engine (overrides config).
    #[arg(short, long, env = "STENCIL_ENGINE")]
    engine: Option<String>,

    /// Path to configuration file (default: auto-discover stencil.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose output.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl BuildArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            source: self.source,
            destination: self.destination,
            engine: self.engine,
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let options = config.require_templates()?.clone();
        let paths = &config.paths;
        tracing::debug!(
            config = ?config.config_path,
            root = %paths.root.display(),
            "Loaded configuration"
        );

        output.field("Source", paths.root.join(&paths.source).display());
        output.field("Destination", paths.root.join(&paths.destination).display());
        output.field("Engine", &options.engine);

        let templates = Templates::new(options, &EngineRegistry::with_defaults())?;
        let storage: Arc<dyn Storage> = Arc::new(FsStorage::new(paths.root.clone()));
        let mut build = Build::read(storage, &paths.source)?
            .with_metadata(config.metadata.clone());

        let summary = templates.run(&mut build).inspect_err(|err| {
            if let TemplateError::File { failed, .. } = err
                && *failed > 1
            {
                output.warning(&format!("{failed} files failed to render"));
            }
        })?;
        let written = build.write(&paths.destination)?;

        output.success(&format!(
            "Rendered {} of {written} files to {}",
            summary.rendered,
            paths.root.join(&paths.destination).display()
        ));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    use super::*;

    fn write(root: &Path, path: &str, contents: &str) {
        let path = root.join(path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn args(config: PathBuf) -> BuildArgs {
        BuildArgs {
            source: None,
            destination: None,
            engine: None,
            config: Some(config),
            verbose: false,
        }
    }

    #[test]
    fn test_build_writes_rendered_files() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            "stencil.toml",
            "[metadata]\nsite = \"Demo\"\n\n[templates]\nengine = \"minijinja\"\n",
        );
        write(
            dir.path(),
            "src/index.md",
            "---\ntemplate: page.html\ntitle: Hi\n---\nBody",
        );
        write(dir.path(), "src/raw.txt", "untouched");
        write(
            dir.path(),
            "templates/page.html",
            "{{ title }}/{{ site }}/{{ contents }}",
        );

        args(dir.path().join("stencil.toml")).execute().unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("build/index.md")).unwrap(),
            "Hi/Demo/Body"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("build/raw.txt")).unwrap(),
            "untouched"
        );
    }

    #[test]
    fn test_build_fails_without_writing_on_missing_layout() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "stencil.toml", "templates = \"simple\"\n");
        write(
            dir.path(),
            "src/index.md",
            "---\ntemplate: missing.html\n---\nBody",
        );

        let err = args(dir.path().join("stencil.toml")).execute().unwrap_err();

        assert!(matches!(
            err,
            CliError::Templates(TemplateError::File { .. })
        ));
        assert!(!dir.path().join("build").exists());
    }

    #[test]
    fn test_engine_override() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "stencil.toml", "");
        write(
            dir.path(),
            "src/index.md",
            "---\ntemplate: page.html\n---\nBody",
        );
        write(dir.path(), "templates/page.html", "<{{ contents }}>");

        BuildArgs {
            engine: Some("simple".to_owned()),
            ..args(dir.path().join("stencil.toml"))
        }
        .execute()
        .unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("build/index.md")).unwrap(),
            "<Body>"
        );
    }
}
