//! Decoding of Solr's XML response format (`wt=xml`).
//!
//! Solr writes named lists as typed elements carrying a `name` attribute:
//!
//! ```xml
//! <response>
//!   <lst name="responseHeader"><int name="status">0</int></lst>
//!   <result name="response" numFound="1" start="0">
//!     <doc><str name="id">1</str><arr name="cat"><str>a</str></arr></doc>
//!   </result>
//! </response>
//! ```
//!
//! `lst`/`response` become objects, or flat `[name, value, ...]` arrays when
//! a name repeats (as in spellcheck collations), `arr` arrays, `result` an object with
//! `numFound`/`start`/`maxScore`/`numFoundExact` and `docs`. Unnamed `doc`
//! elements nested in a `doc` are collected under `_childDocuments_`.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use serde_json::{Map, Value};

use crate::error::{Result, SolriumError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Object,
    Array,
    Doc,
    Result,
    Scalar(ScalarKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScalarKind {
    Str,
    Int,
    Float,
    Bool,
    Null,
}

#[derive(Debug)]
struct Frame {
    name: Option<String>,
    kind: Kind,
    map: Map<String, Value>,
    entries: Vec<(String, Value)>,
    items: Vec<Value>,
    children: Vec<Value>,
    text: String,
}

impl Frame {
    fn open(element: &BytesStart<'_>) -> Result<Self> {
        let tag = String::from_utf8_lossy(element.name().as_ref()).to_string();
        let kind = match tag.as_str() {
            "response" | "lst" => Kind::Object,
            "arr" => Kind::Array,
            "doc" => Kind::Doc,
            "result" => Kind::Result,
            "int" | "long" | "short" | "byte" => Kind::Scalar(ScalarKind::Int),
            "float" | "double" => Kind::Scalar(ScalarKind::Float),
            "bool" => Kind::Scalar(ScalarKind::Bool),
            "null" => Kind::Scalar(ScalarKind::Null),
            _ => Kind::Scalar(ScalarKind::Str),
        };

        let mut frame = Frame {
            name: None,
            kind,
            map: Map::new(),
            entries: Vec::new(),
            items: Vec::new(),
            children: Vec::new(),
            text: String::new(),
        };

        for attr in element.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| SolriumError::parse(format!("Invalid XML attribute: {e}")))?
                .to_string();
            match (kind, key.as_str()) {
                (_, "name") => frame.name = Some(value),
                (Kind::Result, "numFound" | "start") => {
                    frame.map.insert(key, parse_int(&value));
                }
                (Kind::Result, "maxScore") => {
                    frame.map.insert(key, parse_float(&value));
                }
                (Kind::Result, "numFoundExact") => {
                    frame.map.insert(key, Value::Bool(value == "true"));
                }
                _ => {}
            }
        }
        Ok(frame)
    }

    fn close(self) -> (Option<String>, Value, bool) {
        let is_doc = self.kind == Kind::Doc;
        let value = match self.kind {
            Kind::Object => named_list_value(self.entries),
            Kind::Array => Value::Array(self.items),
            Kind::Doc => {
                let mut map = self.map;
                if !self.children.is_empty() {
                    map.insert("_childDocuments_".to_string(), Value::Array(self.children));
                }
                Value::Object(map)
            }
            Kind::Result => {
                let mut map = self.map;
                map.insert("docs".to_string(), Value::Array(self.items));
                Value::Object(map)
            }
            Kind::Scalar(ScalarKind::Str) => Value::String(self.text),
            Kind::Scalar(ScalarKind::Int) => parse_int(&self.text),
            Kind::Scalar(ScalarKind::Float) => parse_float(&self.text),
            Kind::Scalar(ScalarKind::Bool) => Value::Bool(self.text.trim() == "true"),
            Kind::Scalar(ScalarKind::Null) => Value::Null,
        };
        (self.name, value, is_doc)
    }

    fn attach(&mut self, name: Option<String>, value: Value, is_doc: bool) {
        match self.kind {
            Kind::Array | Kind::Result => self.items.push(value),
            Kind::Doc if is_doc && name.is_none() => self.children.push(value),
            Kind::Object => self.entries.push((name.unwrap_or_default(), value)),
            Kind::Doc => {
                self.map.insert(name.unwrap_or_default(), value);
            }
            // scalars carry no children
            Kind::Scalar(_) => {}
        }
    }
}

fn named_list_value(entries: Vec<(String, Value)>) -> Value {
    let mut map = Map::with_capacity(entries.len());
    let mut flat = Vec::with_capacity(entries.len() * 2);
    for (name, value) in entries {
        if map.contains_key(&name) || !flat.is_empty() {
            if flat.is_empty() {
                flat = map
                    .into_iter()
                    .flat_map(|(k, v)| [Value::String(k), v])
                    .collect();
                map = Map::new();
            }
            flat.push(Value::String(name));
            flat.push(value);
        } else {
            map.insert(name, value);
        }
    }
    if flat.is_empty() { Value::Object(map) } else { Value::Array(flat) }
}

fn parse_int(text: &str) -> Value {
    match text.trim().parse::<i64>() {
        Ok(i) => Value::from(i),
        Err(_) => Value::String(text.to_string()),
    }
}

fn parse_float(text: &str) -> Value {
    match text.trim().parse::<f64>() {
        Ok(f) => Value::from(f),
        Err(_) => Value::String(text.to_string()),
    }
}

/// Decode a `wt=xml` body.
pub fn decode(body: &[u8]) -> Result<Value> {
    let text = std::str::from_utf8(body)
        .map_err(|e| SolriumError::parse(format!("XML response is not UTF-8: {e}")))?;
    let mut reader = Reader::from_str(text);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| SolriumError::parse(format!("Invalid XML response body: {e}")))?;
        match event {
            Event::Start(ref e) => stack.push(Frame::open(e)?),
            Event::Empty(ref e) => {
                let (name, value, is_doc) = Frame::open(e)?.close();
                match stack.last_mut() {
                    Some(parent) => parent.attach(name, value, is_doc),
                    None => root = Some(value),
                }
            }
            Event::End(_) => {
                let frame = stack
                    .pop()
                    .ok_or_else(|| SolriumError::parse("Unbalanced XML response body"))?;
                let (name, value, is_doc) = frame.close();
                match stack.last_mut() {
                    Some(parent) => parent.attach(name, value, is_doc),
                    None => root = Some(value),
                }
            }
            Event::Text(ref e) => {
                if let Some(frame) = stack.last_mut() {
                    if matches!(frame.kind, Kind::Scalar(_)) {
                        let text = e
                            .unescape()
                            .map_err(|e| SolriumError::parse(format!("Invalid XML text: {e}")))?;
                        frame.text.push_str(&text);
                    }
                }
            }
            Event::CData(ref e) => {
                if let Some(frame) = stack.last_mut() {
                    if matches!(frame.kind, Kind::Scalar(_)) {
                        frame.text.push_str(&String::from_utf8_lossy(e.as_ref()));
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(SolriumError::parse("Truncated XML response body"));
    }
    root.ok_or_else(|| SolriumError::parse("Empty XML response body"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::spellcheck::SpellcheckResult;
    use serde_json::json;

    #[test]
    fn test_decode_select_response() {
        let body = br#"<?xml version="1.0" encoding="UTF-8"?>
<response>
<lst name="responseHeader"><int name="status">0</int><int name="QTime">1</int></lst>
<result name="response" numFound="2" start="0" maxScore="1.5" numFoundExact="true">
  <doc><str name="id">1</str><arr name="cat"><str>a &amp; b</str><str>c</str></arr><float name="score">1.5</float></doc>
  <doc><str name="id">2</str><bool name="inStock">false</bool><null name="price"/></doc>
</result>
</response>"#;
        let value = decode(body).unwrap();
        assert_eq!(value["responseHeader"]["QTime"], json!(1));
        assert_eq!(value["response"]["numFound"], json!(2));
        assert_eq!(value["response"]["maxScore"], json!(1.5));
        assert_eq!(value["response"]["numFoundExact"], json!(true));
        assert_eq!(value["response"]["docs"][0]["cat"], json!(["a & b", "c"]));
        assert_eq!(value["response"]["docs"][1]["inStock"], json!(false));
        assert_eq!(value["response"]["docs"][1]["price"], Value::Null);
    }

    #[test]
    fn test_anonymous_child_documents() {
        let body = br#"<response><result name="response" numFound="1" start="0">
<doc><str name="id">p1</str><doc><str name="id">c1</str></doc><doc><str name="id">c2</str></doc></doc>
</result></response>"#;
        let value = decode(body).unwrap();
        let parent = &value["response"]["docs"][0];
        assert_eq!(parent["_childDocuments_"][1]["id"], json!("c2"));
    }

    #[test]
    fn test_repeated_names_keep_every_entry() {
        let body = br#"<response><lst name="spellcheck">
<lst name="suggestions"/>
<lst name="collations">
  <lst name="collation"><str name="collationQuery">gamma</str><int name="hits">3</int></lst>
  <lst name="collation"><str name="collationQuery">delta</str><int name="hits">1</int></lst>
</lst>
</lst></response>"#;
        let value = decode(body).unwrap();
        let collations = &value["spellcheck"]["collations"];
        assert_eq!(collations[0], json!("collation"));
        assert_eq!(collations[3]["collationQuery"], json!("delta"));
        // unique names still decode to an object
        assert!(value["spellcheck"].is_object());

        let spellcheck = SpellcheckResult::parse(&value);
        let queries: Vec<&str> = spellcheck.collations.iter().map(|c| c.query.as_str()).collect();
        assert_eq!(queries, vec!["gamma", "delta"]);
    }

    #[test]
    fn test_malformed_is_parse_error() {
        assert!(matches!(
            decode(b"<response><lst name=\"a\">"),
            Err(SolriumError::Parse(_))
        ));
        assert!(matches!(decode(b""), Err(SolriumError::Parse(_))));
    }
}
