//! `stencil engines` command implementation.

use clap::Args;
use stencil_engine::EngineRegistry;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the engines command.
#[derive(Args)]
pub(crate) struct EnginesArgs {
    /// Only list engines usable with `useExtends`.
    #[arg(long)]
    inheritance: bool,
}

impl EnginesArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let registry = EngineRegistry::with_defaults();

        for name in registry.names() {
            let engine = registry.get(name)?;
            let inheritance = engine.supports_inheritance();
            if self.inheritance && !inheritance {
                continue;
            }
            let note = if inheritance {
                format!("({}, template inheritance)", engine.name())
            } else {
                format!("({})", engine.name())
            };
            output.engine(name, &note);
        }
        Ok(())
    }
}
