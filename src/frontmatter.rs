//! YAML front matter extraction for Markdown content files.
//!
//! A content file starts with a `---` fenced YAML block followed by the
//! Markdown body:
//!
//! ```text
//! ---
//! title: Folio
//! pubDatetime: 2024-05-01
//! draft: false
//! ---
//! Body text...
//! ```
//!
//! Leading blank lines and a UTF-8 BOM are tolerated before the opening
//! fence. A file without a fence has empty front matter and is all body;
//! schema validation downstream decides whether that is acceptable.

use serde_yaml::{Mapping, Value};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Unterminated YAML front matter: expected closing '---'")]
    Unterminated,
    #[error("Front matter parse error: {0}")]
    Parse(String),
    #[error("Front matter must be a YAML mapping at the top level")]
    InvalidRootType,
}

/// A content file split into its front matter and body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub data: Mapping,
    pub body: String,
}

/// Split a content file into parsed front matter and the remaining body.
pub fn parse_document(input: &str) -> Result<Document, FrontmatterError> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);

    let mut lines = input.split_inclusive('\n');
    let mut consumed = 0usize;

    // Skip leading blank lines; the first non-blank line must be the fence.
    let opened = loop {
        match lines.next() {
            Some(line) if line.trim().is_empty() => consumed += line.len(),
            Some(line) if is_fence(line) => {
                consumed += line.len();
                break true;
            }
            _ => break false,
        }
    };

    if !opened {
        return Ok(Document {
            data: Mapping::new(),
            body: input.to_string(),
        });
    }

    let block_start = consumed;
    for line in lines {
        if is_fence(line) {
            let block = &input[block_start..consumed];
            let body = &input[consumed + line.len()..];
            return Ok(Document {
                data: parse_block(block)?,
                body: body.to_string(),
            });
        }
        consumed += line.len();
    }

    Err(FrontmatterError::Unterminated)
}

fn is_fence(line: &str) -> bool {
    line.trim_end_matches(['\r', '\n']).trim_end() == "---"
}

fn parse_block(block: &str) -> Result<Mapping, FrontmatterError> {
    if block.trim().is_empty() {
        return Ok(Mapping::new());
    }
    let value: Value =
        serde_yaml::from_str(block).map_err(|e| FrontmatterError::Parse(e.to_string()))?;
    match value {
        Value::Null => Ok(Mapping::new()),
        Value::Mapping(map) => Ok(map),
        _ => Err(FrontmatterError::InvalidRootType),
    }
}
