//! CLI error types.

use stencil_config::ConfigError;
use stencil_core::{BuildError, TemplateError};
use stencil_engine::EngineError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Build(#[from] BuildError),

    #[error("{0}")]
    Templates(#[from] TemplateError),

    #[error("{0}")]
    Engine(#[from] EngineError),
}
