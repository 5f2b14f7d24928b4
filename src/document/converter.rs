//! Document converters for creating documents from files.
//!
//! Used by the command line `add` command to read documents in bulk.

use std::path::Path;

use crate::document::document::Document;
use crate::error::Result;

pub mod json;
pub mod jsonl;

pub use json::JsonDocumentConverter;
pub use jsonl::JsonlDocumentConverter;

/// Converts a file into a stream of documents.
pub trait DocumentConverter {
    type Iter: Iterator<Item = Result<Document>>;

    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter>;
}

/// Pick a converter by file extension: `.jsonl`/`.ndjson` are read line by
/// line, anything else as a JSON document or array of documents.
pub fn convert_file<P: AsRef<Path>>(path: P) -> Result<Box<dyn Iterator<Item = Result<Document>>>> {
    let path = path.as_ref();
    let is_lines = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("jsonl") || e.eq_ignore_ascii_case("ndjson"));
    if is_lines {
        Ok(Box::new(JsonlDocumentConverter::new().convert(path)?))
    } else {
        Ok(Box::new(JsonDocumentConverter::new().convert(path)?))
    }
}
