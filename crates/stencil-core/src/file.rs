//! In-memory content files.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::frontmatter::{FrontMatterError, parse_front_matter};

/// Reserved context key holding the content being rendered.
pub const CONTENTS_KEY: &str = "contents";
/// Metadata key naming a file's layout.
pub const TEMPLATE_KEY: &str = "template";
/// Metadata key naming the layout extended in extends mode.
pub const EXTENDS_KEY: &str = "extends";
/// Metadata key naming the block receiving the contents in extends mode.
pub const BLOCK_KEY: &str = "block";

/// Collection of files keyed by path relative to the source root.
///
/// Keys always use `/` separators.
pub type Files = BTreeMap<String, ContentFile>;

/// A source file held in memory for one build pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentFile {
    /// Raw contents, front-matter removed.
    pub contents: Vec<u8>,
    /// Front-matter metadata.
    pub metadata: Map<String, Value>,
}

impl ContentFile {
    /// Create a file with the given contents and no metadata.
    pub fn new(contents: impl Into<Vec<u8>>) -> Self {
        Self {
            contents: contents.into(),
            metadata: Map::new(),
        }
    }

    /// Parse raw bytes, splitting front-matter off text contents.
    ///
    /// Binary contents are kept as-is with empty metadata.
    ///
    /// # Errors
    ///
    /// Returns [`FrontMatterError`] if a text file has malformed front-matter.
    pub fn parse(bytes: Vec<u8>) -> Result<Self, FrontMatterError> {
        if !is_text(&bytes) {
            return Ok(Self::new(bytes));
        }
        let text = String::from_utf8_lossy(&bytes);
        let (metadata, body) = parse_front_matter(&text)?;
        Ok(Self {
            contents: body.as_bytes().to_vec(),
            metadata,
        })
    }

    /// Set a metadata value.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Layout named by the `template` key.
    pub fn template(&self) -> Option<&str> {
        self.string_metadata(TEMPLATE_KEY)
    }

    /// Layout named by the `extends` key.
    pub fn extends(&self) -> Option<&str> {
        self.string_metadata(EXTENDS_KEY)
    }

    /// Block named by the `block` key.
    pub fn block(&self) -> Option<&str> {
        self.string_metadata(BLOCK_KEY)
    }

    /// Whether the contents are text.
    pub fn is_text(&self) -> bool {
        is_text(&self.contents)
    }

    /// Contents as text, or `None` for binary files.
    pub fn text(&self) -> Option<&str> {
        if self.contents.contains(&0) {
            return None;
        }
        std::str::from_utf8(&self.contents).ok()
    }

    fn string_metadata(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// Binary sniff: valid UTF-8 without NUL bytes counts as text.
pub fn is_text(bytes: &[u8]) -> bool {
    !bytes.contains(&0) && std::str::from_utf8(bytes).is_ok()
}

/// Convert a relative path into a collection key.
pub(crate) fn path_to_key(path: &std::path::Path) -> String {
    path.components()
        .filter_map(|component| match component {
            std::path::Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
