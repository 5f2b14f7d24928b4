//! Field value types for documents.
//!
//! [`FieldValue`] is used both for documents read from a select response
//! and for documents sent with an update. Conversions from common Rust
//! types are provided so documents can be filled with `doc.set_field("price", 9.5)`.
//!
//! ```
//! use solrium::document::field_value::FieldValue;
//!
//! let value = FieldValue::from(vec!["a", "b"]);
//! assert_eq!(value.as_list().len(), 2);
//! assert_eq!(FieldValue::from(42).as_i64(), Some(42));
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::document::document::Document;
use crate::query::helper;

/// A value of a document field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Explicit null. In atomic updates this removes the stored value.
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    /// Sent in Solr's `YYYY-MM-DDThh:mm:ssZ` format.
    Date(DateTime<Utc>),
    /// Multi-valued field.
    Multi(Vec<FieldValue>),
    /// Labelled nested document.
    Doc(Box<Document>),
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value; integral strings are accepted.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            FieldValue::Int(i) => Some(*i),
            FieldValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Floating point value; integers and numeric strings are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(f) => Some(*f),
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            FieldValue::Str(s) => match s.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// Date value; RFC 3339 strings (as Solr returns them) are parsed.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(d) => Some(*d),
            FieldValue::Str(s) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| d.with_timezone(&Utc)),
            _ => None,
        }
    }

    pub fn as_document(&self) -> Option<&Document> {
        match self {
            FieldValue::Doc(doc) => Some(doc),
            _ => None,
        }
    }

    /// The values of a multi-valued field, or the value itself as a
    /// one-element slice.
    pub fn as_list(&self) -> &[FieldValue] {
        match self {
            FieldValue::Multi(values) => values,
            FieldValue::Null => &[],
            other => std::slice::from_ref(other),
        }
    }

    /// Render a scalar the way Solr expects it in XML update bodies and
    /// request parameters. Multi values are comma-joined.
    pub fn to_solr_string(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Int(i) => i.to_string(),
            FieldValue::Float(f) => f.to_string(),
            FieldValue::Str(s) => s.clone(),
            FieldValue::Date(d) => helper::format_date(d),
            FieldValue::Multi(values) => values
                .iter()
                .map(|v| v.to_solr_string())
                .collect::<Vec<_>>()
                .join(","),
            FieldValue::Doc(doc) => doc.to_json().to_string(),
        }
    }

    /// JSON representation used by the JSON update format.
    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            FieldValue::Str(s) => Value::String(s.clone()),
            FieldValue::Date(d) => Value::String(helper::format_date(d)),
            FieldValue::Multi(values) => Value::Array(values.iter().map(|v| v.to_json()).collect()),
            FieldValue::Doc(doc) => doc.to_json(),
        }
    }

    /// Convert a decoded response value.
    ///
    /// Objects become nested documents; strings are kept as strings even
    /// when they look like dates.
    pub fn from_json(value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => FieldValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => FieldValue::Str(s.clone()),
            Value::Array(items) => FieldValue::Multi(items.iter().map(FieldValue::from_json).collect()),
            Value::Object(_) => FieldValue::Doc(Box::new(Document::from_json(value))),
        }
    }
}

impl std::fmt::Display for FieldValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_solr_string())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Str(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Str(value)
    }
}

impl From<&String> for FieldValue {
    fn from(value: &String) -> Self {
        FieldValue::Str(value.clone())
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(value: $t) -> Self {
                FieldValue::Int(value as i64)
            }
        })*
    };
}

impl_from_int!(i32, i64, u32, usize);

impl From<f32> for FieldValue {
    fn from(value: f32) -> Self {
        FieldValue::Float(value as f64)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Float(value)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

impl From<Document> for FieldValue {
    fn from(value: Document) -> Self {
        FieldValue::Doc(Box::new(value))
    }
}

impl<T: Into<FieldValue>> From<Vec<T>> for FieldValue {
    fn from(values: Vec<T>) -> Self {
        FieldValue::Multi(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(FieldValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_conversions() {
        assert_eq!(FieldValue::from("x"), FieldValue::Str("x".into()));
        assert_eq!(FieldValue::from(3u32), FieldValue::Int(3));
        assert_eq!(FieldValue::from(None::<i64>), FieldValue::Null);
        assert_eq!(FieldValue::from(vec![1, 2]).as_list().len(), 2);
        assert_eq!(FieldValue::Str("7".into()).as_i64(), Some(7));
        assert_eq!(FieldValue::Int(2).as_f64(), Some(2.0));
    }

    #[test]
    fn test_date_rendering() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let value = FieldValue::from(date);
        assert_eq!(value.to_solr_string(), "2024-01-02T03:04:05Z");
        assert_eq!(FieldValue::Str("2024-01-02T03:04:05Z".into()).as_date(), Some(date));
    }

    #[test]
    fn test_from_json() {
        let value = FieldValue::from_json(&json!(["a", 1, 1.5, null, {"id": "c"}]));
        let list = value.as_list();
        assert_eq!(list[0].as_str(), Some("a"));
        assert_eq!(list[1], FieldValue::Int(1));
        assert_eq!(list[2], FieldValue::Float(1.5));
        assert!(list[3].is_null());
        assert_eq!(
            list[4].as_document().and_then(|d| d.get_str("id")),
            Some("c")
        );
    }
}
