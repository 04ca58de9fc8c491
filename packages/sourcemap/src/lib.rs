//! Source maps for build-time module rewrites.
//!
//! A rewrite keeps most of a module verbatim and replaces a few expressions.
//! [`SourceMapBuilder`] produces the rewritten text and its map in one pass:
//! copied ranges are mapped line by line, replacements are mapped to the
//! start of the expression they stand for.

pub mod builder;
pub mod line_index;

pub use builder::{RewrittenSource, SourceMapBuilder};
pub use line_index::LineIndex;
pub use sourcemap::SourceMap;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SourceMapError {
    #[error("Failed to encode source map: {0}")]
    Encode(#[from] sourcemap::Error),

    #[error("Source map is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Encode a map as JSON
pub fn to_json(map: &SourceMap) -> Result<String, SourceMapError> {
    let mut buf = Vec::new();
    map.to_writer(&mut buf)?;
    Ok(String::from_utf8(buf)?)
}
