//! Document structure shared by select results and update commands.

use serde_json::{Map, Value};

use crate::document::field_value::FieldValue;

/// `_version_` value: overwrite regardless of the stored version.
pub const VERSION_DONT_CARE: i64 = 0;
/// `_version_` value: the document must already exist.
pub const VERSION_MUST_EXIST: i64 = 1;
/// `_version_` value: the document must not exist yet.
pub const VERSION_MUST_NOT_EXIST: i64 = -1;

/// Atomic update operation applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Set,
    Add,
    AddDistinct,
    Remove,
    RemoveRegex,
    Inc,
}

impl Modifier {
    /// Name used in update bodies.
    pub fn as_str(&self) -> &'static str {
        match self {
            Modifier::Set => "set",
            Modifier::Add => "add",
            Modifier::AddDistinct => "add-distinct",
            Modifier::Remove => "remove",
            Modifier::RemoveRegex => "removeregex",
            Modifier::Inc => "inc",
        }
    }
}

/// A Solr document: ordered fields plus update metadata.
///
/// Documents read from a response only carry fields (and child documents
/// when the response has them). Modifiers and `_version_` only matter when
/// the document is sent with an update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, FieldValue)>,
    modifiers: Vec<(String, Modifier)>,
    version: Option<i64>,
    children: Vec<Document>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    /// Create a builder for constructing documents.
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Set a field, replacing any previous value.
    pub fn set_field<S: Into<String>, V: Into<FieldValue>>(&mut self, name: S, value: V) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Add a value to a field, turning it into a multi-valued field when it
    /// already holds a value.
    pub fn add_field<S: Into<String>, V: Into<FieldValue>>(&mut self, name: S, value: V) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, FieldValue::Multi(values))) => values.push(value),
            Some((_, existing)) => {
                let previous = std::mem::replace(existing, FieldValue::Null);
                *existing = FieldValue::Multi(vec![previous, value]);
            }
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(|v| v.as_str())
    }

    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(|v| v.as_i64())
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.as_f64())
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(|v| v.as_bool())
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == name)
    }

    /// Remove a field and its modifier.
    pub fn remove_field(&mut self, name: &str) -> Option<FieldValue> {
        self.modifiers.retain(|(k, _)| k != name);
        let index = self.fields.iter().position(|(k, _)| k == name)?;
        Some(self.fields.remove(index).1)
    }

    /// Remove all fields, modifiers, children and the version.
    pub fn clear(&mut self) {
        *self = Document::default();
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(k, _)| k.as_str()).collect()
    }

    /// Fields in insertion order.
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Turn the field into an atomic update of the given kind.
    pub fn set_field_modifier<S: Into<String>>(&mut self, name: S, modifier: Modifier) {
        let name = name.into();
        match self.modifiers.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => *existing = modifier,
            None => self.modifiers.push((name, modifier)),
        }
    }

    pub fn field_modifier(&self, name: &str) -> Option<Modifier> {
        self.modifiers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, m)| *m)
    }

    pub fn has_modifiers(&self) -> bool {
        !self.modifiers.is_empty()
    }

    /// Set `_version_` for optimistic concurrency, see the `VERSION_*`
    /// constants for the special values.
    pub fn set_version(&mut self, version: i64) {
        self.version = Some(version);
    }

    pub fn version(&self) -> Option<i64> {
        self.version
    }

    /// Add an anonymous child document.
    pub fn add_child(&mut self, child: Document) {
        self.children.push(child);
    }

    pub fn children(&self) -> &[Document] {
        &self.children
    }

    /// Build a document from a decoded response object.
    ///
    /// `_childDocuments_` entries become anonymous children; anything that
    /// is not an object yields an empty document.
    pub fn from_json(value: &Value) -> Document {
        let mut document = Document::new();
        if let Value::Object(map) = value {
            for (key, value) in map {
                if key == "_childDocuments_" {
                    if let Value::Array(children) = value {
                        document.children = children.iter().map(Document::from_json).collect();
                    }
                } else {
                    document.fields.push((key.clone(), FieldValue::from_json(value)));
                }
            }
        }
        document
    }

    /// JSON representation used by the JSON update format.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        for (name, value) in &self.fields {
            let value = match self.field_modifier(name) {
                Some(modifier) => {
                    let mut op = Map::new();
                    op.insert(modifier.as_str().to_string(), value.to_json());
                    Value::Object(op)
                }
                None => value.to_json(),
            };
            map.insert(name.clone(), value);
        }
        if let Some(version) = self.version {
            map.insert("_version_".to_string(), Value::from(version));
        }
        if !self.children.is_empty() {
            map.insert(
                "_childDocuments_".to_string(),
                Value::Array(self.children.iter().map(|c| c.to_json()).collect()),
            );
        }
        Value::Object(map)
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a (String, FieldValue);
    type IntoIter = std::slice::Iter<'a, (String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

/// A builder for constructing documents in a fluent manner.
#[derive(Debug, Default)]
pub struct DocumentBuilder {
    document: Document,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        DocumentBuilder::default()
    }

    /// Set a field.
    pub fn field<S: Into<String>, V: Into<FieldValue>>(mut self, name: S, value: V) -> Self {
        self.document.set_field(name, value);
        self
    }

    /// Add one more value to a (multi-valued) field.
    pub fn add<S: Into<String>, V: Into<FieldValue>>(mut self, name: S, value: V) -> Self {
        self.document.add_field(name, value);
        self
    }

    /// Set a field as an atomic update.
    pub fn update<S: Into<String>, V: Into<FieldValue>>(
        mut self,
        name: S,
        modifier: Modifier,
        value: V,
    ) -> Self {
        let name = name.into();
        self.document.set_field(name.clone(), value);
        self.document.set_field_modifier(name, modifier);
        self
    }

    pub fn version(mut self, version: i64) -> Self {
        self.document.set_version(version);
        self
    }

    pub fn child(mut self, child: Document) -> Self {
        self.document.add_child(child);
        self
    }

    pub fn build(self) -> Document {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_field_becomes_multi_valued() {
        let mut doc = Document::new();
        doc.add_field("cat", "a");
        doc.add_field("cat", "b");
        doc.set_field("id", "1");
        assert_eq!(doc.get("cat").map(|v| v.as_list().len()), Some(2));
        assert_eq!(doc.field_names(), vec!["cat", "id"]);
    }

    #[test]
    fn test_to_json_with_modifiers_and_children() {
        let doc = Document::builder()
            .field("id", "p1")
            .update("popularity", Modifier::Inc, 10)
            .version(VERSION_MUST_EXIST)
            .child(Document::builder().field("id", "c1").build())
            .build();
        assert_eq!(
            doc.to_json(),
            json!({
                "id": "p1",
                "popularity": {"inc": 10},
                "_version_": 1,
                "_childDocuments_": [{"id": "c1"}]
            })
        );
    }

    #[test]
    fn test_from_json_keeps_order_and_children() {
        let doc = Document::from_json(&json!({
            "id": "p1",
            "price": 1.5,
            "_childDocuments_": [{"id": "c1"}]
        }));
        assert_eq!(doc.field_names(), vec!["id", "price"]);
        assert_eq!(doc.get_f64("price"), Some(1.5));
        assert_eq!(doc.children()[0].get_str("id"), Some("c1"));
    }

    #[test]
    fn test_remove_field_drops_modifier() {
        let mut doc = Document::builder()
            .update("name", Modifier::Set, "x")
            .build();
        assert!(doc.has_modifiers());
        assert!(doc.remove_field("name").is_some());
        assert!(!doc.has_modifiers());
        assert!(doc.is_empty());
    }
}
