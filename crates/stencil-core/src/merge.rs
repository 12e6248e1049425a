//! Render context assembly.

use serde_json::{Map, Value};
use stencil_engine::Context;

use crate::file::CONTENTS_KEY;

/// Build a render context from layered sources.
///
/// Precedence, lowest first: static params, global metadata, file metadata,
/// then `contents`. None of the inputs are modified.
pub fn merge(
    params: &Map<String, Value>,
    global: &Map<String, Value>,
    file: &Map<String, Value>,
    contents: &str,
) -> Context {
    let mut context = params.clone();
    for layer in [global, file] {
        for (key, value) in layer {
            context.insert(key.clone(), value.clone());
        }
    }
    context.insert(CONTENTS_KEY.to_owned(), Value::String(contents.to_owned()));
    context
}

/// Build-wide render inputs, captured once before any conversion.
#[derive(Debug, Clone, Default)]
pub struct PassContext {
    params: Map<String, Value>,
    metadata: Map<String, Value>,
}

impl PassContext {
    pub fn new(params: Map<String, Value>, metadata: Map<String, Value>) -> Self {
        Self { params, metadata }
    }

    /// First-step context for a file.
    pub fn context_for(&self, file_metadata: &Map<String, Value>, contents: &str) -> Context {
        merge(&self.params, &self.metadata, file_metadata, contents)
    }
}
