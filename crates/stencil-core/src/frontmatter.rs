//! Front-matter parsing.
//!
//! A front-matter block is YAML between a leading `---` line and the next
//! `---` line. Everything after the closing line is the body.

use serde_json::{Map, Value};

const DELIMITER: &str = "---";

/// Error type for front-matter parsing.
#[derive(Debug, thiserror::Error)]
pub enum FrontMatterError {
    /// The block is not valid YAML.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The block is valid YAML but not a mapping.
    #[error("front-matter must be a mapping")]
    NotMapping,
}

/// Split text into the raw YAML block and the body.
///
/// Returns `None` when the text has no complete front-matter block.
pub fn split_front_matter(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix(DELIMITER)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            return Some((&rest[..offset], &rest[offset + line.len()..]));
        }
        offset += line.len();
    }
    None
}

/// Parse leading front-matter into metadata and return it with the body.
///
/// Text without front-matter yields empty metadata and the whole text.
///
/// # Errors
///
/// Returns [`FrontMatterError`] if the block is malformed or not a mapping.
pub fn parse_front_matter(text: &str) -> Result<(Map<String, Value>, &str), FrontMatterError> {
    let Some((yaml, body)) = split_front_matter(text) else {
        return Ok((Map::new(), text));
    };

    if yaml.trim().is_empty() {
        return Ok((Map::new(), body));
    }

    match serde_yaml::from_str::<Value>(yaml)? {
        Value::Object(map) => Ok((map, body)),
        Value::Null => Ok((Map::new(), body)),
        _ => Err(FrontMatterError::NotMapping),
    }
}
