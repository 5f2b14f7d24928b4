//! JSON format document converter.
//!
//! Accepts either a single object or an array of objects:
//! ```json
//! [
//!   {"id": "1", "title": "Rust Programming"},
//!   {"id": "2", "title": "Python Basics"}
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde_json::Value;

use crate::document::converter::DocumentConverter;
use crate::document::document::Document;
use crate::error::{Result, SolriumError};

/// A document converter for JSON files.
#[derive(Debug, Clone, Default)]
pub struct JsonDocumentConverter;

impl JsonDocumentConverter {
    pub fn new() -> Self {
        JsonDocumentConverter
    }

    /// Convert an in-memory JSON string.
    pub fn convert_str(&self, input: &str) -> Result<Vec<Document>> {
        let value: Value = serde_json::from_str(input)
            .map_err(|e| SolriumError::parse(format!("Failed to parse JSON: {e}")))?;
        match value {
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Object(_) => Ok(Document::from_json(item)),
                    _ => Err(SolriumError::parse("JSON array must contain objects")),
                })
                .collect(),
            Value::Object(_) => Ok(vec![Document::from_json(&value)]),
            _ => Err(SolriumError::parse("Expected a JSON object or array of objects")),
        }
    }
}

impl DocumentConverter for JsonDocumentConverter {
    type Iter = std::vec::IntoIter<Result<Document>>;

    fn convert<P: AsRef<Path>>(&self, path: P) -> Result<Self::Iter> {
        let path = path.as_ref();
        let input = fs::read_to_string(path).map_err(|e| {
            SolriumError::file_access(format!("Failed to read '{}': {e}", path.display()))
        })?;
        let docs = self.convert_str(&input)?;
        Ok(docs.into_iter().map(Ok).collect::<Vec<_>>().into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_array() {
        let converter = JsonDocumentConverter::new();
        let docs = converter
            .convert_str(r#"[{"id": "1", "year": 2024}, {"id": "2"}]"#)
            .unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].get_i64("year"), Some(2024));
    }

    #[test]
    fn test_json_single_object() {
        let converter = JsonDocumentConverter::new();
        let docs = converter.convert_str(r#"{"id": "1"}"#).unwrap();
        assert_eq!(docs[0].get_str("id"), Some("1"));
    }

    #[test]
    fn test_json_scalar_is_rejected() {
        let converter = JsonDocumentConverter::new();
        assert!(matches!(converter.convert_str("42"), Err(SolriumError::Parse(_))));
    }
}
