//! JSONL format document converter.
//!
//! Each line in the file should be a single JSON object:
//! ```jsonl
//! {"id": "1", "title": "Rust Programming", "year": 2024}
//! {"id": "2", "title": "Python Basics", "year": 2023}
//! ```

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::document::converter::DocumentConverter;
use crate::document::document::Document;
use crate::error::{Result, SolriumError};

/// A document converter for JSONL format.
#[derive(Debug, Clone, Default)]
pub struct JsonlDocumentConverter;

impl JsonlDocumentConverter {
    pub fn new() -> Self {
        JsonlDocumentConverter
    }

    fn parse_json_line(line: &str, number: usize) -> Result<Document> {
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| SolriumError::parse(format!("Line {number}: {e}")))?;
        if !value.is_object() {
            return Err(SolriumError::parse(format!("Line {number}: expected a JSON object")));
        }
        Ok(Document::from_json(&value))
    }
}

/// Iterator over JSONL documents.
pub struct JsonlDocumentIterator {
    reader: BufReader<File>,
    line_number: usize,
}

impl Iterator for JsonlDocumentIterator {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = String::new();
        loop {
            line.clear();
            self.line_number += 1;
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    return Some(JsonlDocumentConverter::parse_json_line(line, self.line_number));
                }
                Err(e) => return Some(Err(SolriumError::Io(e))),
            }
        }
    }
}

impl DocumentConverter for JsonlDocumentConverter {
    type Iter = JsonlDocumentIterator;

    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            SolriumError::file_access(format!("Failed to open '{}': {e}", path.display()))
        })?;

        Ok(JsonlDocumentIterator {
            reader: BufReader::new(file),
            line_number: 0,
        })
    }
}
