//! Highlighting component (`hl=true`).
//!
//! Options set on [`Highlighting`] are global (`hl.*`); options set on a
//! [`HighlightField`] are sent per field (`f.<field>.hl.*`) and override
//! the global ones for that field.

use serde_json::Value;

use crate::component::{Component, ComponentType, add_field_param};
use crate::error::Result;
use crate::request::Request;
use crate::util::named_list;

/// Highlighting options shared by the component and its fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightOptions {
    pub snippets: Option<u32>,
    pub fragsize: Option<u32>,
    pub merge_contiguous: Option<bool>,
    pub alternate_field: Option<String>,
    pub max_alternate_field_length: Option<u32>,
    pub preserve_multi: Option<bool>,
    pub formatter: Option<String>,
    pub simple_prefix: Option<String>,
    pub simple_postfix: Option<String>,
    pub fragmenter: Option<String>,
    pub use_fast_vector_highlighter: Option<bool>,
    pub method: Option<String>,
    pub tag_prefix: Option<String>,
    pub tag_postfix: Option<String>,
}

impl HighlightOptions {
    fn build(&self, request: &mut Request, field: Option<&str>) {
        let mut add = |name: &str, value: Option<String>| match field {
            Some(field) => add_field_param(request, field, name, value),
            None => request.add_param(name, value),
        };
        add("hl.snippets", self.snippets.map(|v| v.to_string()));
        add("hl.fragsize", self.fragsize.map(|v| v.to_string()));
        add("hl.mergeContiguous", self.merge_contiguous.map(|v| v.to_string()));
        add("hl.alternateField", self.alternate_field.clone());
        add(
            "hl.maxAlternateFieldLength",
            self.max_alternate_field_length.map(|v| v.to_string()),
        );
        add("hl.preserveMulti", self.preserve_multi.map(|v| v.to_string()));
        add("hl.formatter", self.formatter.clone());
        add("hl.simple.pre", self.simple_prefix.clone());
        add("hl.simple.post", self.simple_postfix.clone());
        add("hl.fragmenter", self.fragmenter.clone());
        add(
            "hl.useFastVectorHighlighter",
            self.use_fast_vector_highlighter.map(|v| v.to_string()),
        );
        add("hl.method", self.method.clone());
        add("hl.tag.pre", self.tag_prefix.clone());
        add("hl.tag.post", self.tag_postfix.clone());
    }
}

/// Per-field highlighting options.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightField {
    name: String,
    pub options: HighlightOptions,
}

impl HighlightField {
    pub fn new<S: Into<String>>(name: S) -> Self {
        HighlightField {
            name: name.into(),
            options: HighlightOptions::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_snippets(&mut self, snippets: u32) -> &mut Self {
        self.options.snippets = Some(snippets);
        self
    }

    pub fn set_fragsize(&mut self, fragsize: u32) -> &mut Self {
        self.options.fragsize = Some(fragsize);
        self
    }

    pub fn set_simple_prefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.options.simple_prefix = Some(prefix.into());
        self
    }

    pub fn set_simple_postfix<S: Into<String>>(&mut self, postfix: S) -> &mut Self {
        self.options.simple_postfix = Some(postfix.into());
        self
    }

    pub fn set_alternate_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.options.alternate_field = Some(field.into());
        self
    }
}

/// Highlighting component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Highlighting {
    fields: Vec<HighlightField>,
    pub options: HighlightOptions,
    pub query: Option<String>,
    pub query_parser: Option<String>,
    pub require_field_match: Option<bool>,
    pub use_phrase_highlighter: Option<bool>,
    pub highlight_multi_term: Option<bool>,
    pub max_analyzed_chars: Option<u32>,
    pub encoder: Option<String>,
}

impl Highlighting {
    pub fn new() -> Self {
        Highlighting::default()
    }

    /// Get the options of a field, adding the field when it is new.
    pub fn field<S: Into<String>>(&mut self, name: S) -> &mut HighlightField {
        let name = name.into();
        let index = match self.fields.iter().position(|f| f.name == name) {
            Some(index) => index,
            None => {
                self.fields.push(HighlightField::new(name));
                self.fields.len() - 1
            }
        };
        &mut self.fields[index]
    }

    /// Add fields from a comma separated list.
    pub fn add_fields(&mut self, fields: &str) -> &mut Self {
        for name in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            self.field(name);
        }
        self
    }

    pub fn fields(&self) -> &[HighlightField] {
        &self.fields
    }

    pub fn remove_field(&mut self, name: &str) -> &mut Self {
        self.fields.retain(|f| f.name != name);
        self
    }

    pub fn set_snippets(&mut self, snippets: u32) -> &mut Self {
        self.options.snippets = Some(snippets);
        self
    }

    pub fn set_fragsize(&mut self, fragsize: u32) -> &mut Self {
        self.options.fragsize = Some(fragsize);
        self
    }

    pub fn set_simple_prefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.options.simple_prefix = Some(prefix.into());
        self
    }

    pub fn set_simple_postfix<S: Into<String>>(&mut self, postfix: S) -> &mut Self {
        self.options.simple_postfix = Some(postfix.into());
        self
    }

    pub fn set_method<S: Into<String>>(&mut self, method: S) -> &mut Self {
        self.options.method = Some(method.into());
        self
    }

    /// Highlight against a different query than `q` (`hl.q`).
    pub fn set_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query = Some(query.into());
        self
    }

    pub fn set_require_field_match(&mut self, require: bool) -> &mut Self {
        self.require_field_match = Some(require);
        self
    }

    pub fn set_use_phrase_highlighter(&mut self, use_phrase: bool) -> &mut Self {
        self.use_phrase_highlighter = Some(use_phrase);
        self
    }
}

impl Component for Highlighting {
    fn component_type(&self) -> ComponentType {
        ComponentType::Highlighting
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("hl", true);
        let field_list = self
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(",");
        request.set_param("hl.fl", field_list);
        request.set_param("hl.q", self.query.as_deref());
        request.set_param("hl.qparser", self.query_parser.as_deref());
        request.set_param("hl.requireFieldMatch", self.require_field_match);
        request.set_param("hl.usePhraseHighlighter", self.use_phrase_highlighter);
        request.set_param("hl.highlightMultiTerm", self.highlight_multi_term);
        request.set_param("hl.maxAnalyzedChars", self.max_analyzed_chars);
        request.set_param("hl.encoder", self.encoder.as_deref());
        self.options.build(request, None);
        for field in &self.fields {
            field.options.build(request, Some(field.name.as_str()));
        }
        Ok(())
    }
}

/// Snippets of one document, per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightedDocument {
    fields: Vec<(String, Vec<String>)>,
}

impl HighlightedDocument {
    pub fn field(&self, name: &str) -> Option<&[String]> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_slice())
    }

    pub fn fields(&self) -> &[(String, Vec<String>)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parsed `highlighting` section, keyed by document unique key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightingResult {
    documents: Vec<(String, HighlightedDocument)>,
}

impl HighlightingResult {
    pub fn parse(data: &Value) -> HighlightingResult {
        let Some(section) = named_list::get(data, "highlighting") else {
            return HighlightingResult::default();
        };
        let documents = named_list::entries(section)
            .into_iter()
            .map(|(key, fields)| {
                let fields = named_list::entries(fields)
                    .into_iter()
                    .map(|(name, snippets)| (name, named_list::as_string_list(snippets)))
                    .collect();
                (key, HighlightedDocument { fields })
            })
            .collect();
        HighlightingResult { documents }
    }

    /// Snippets of a document; documents without highlights give an empty
    /// result.
    pub fn document(&self, key: &str) -> Option<&HighlightedDocument> {
        self.documents.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn documents(&self) -> &[(String, HighlightedDocument)] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    #[test]
    fn test_global_and_field_options() {
        let mut hl = Highlighting::new();
        hl.set_snippets(3).set_simple_prefix("<b>").set_simple_postfix("</b>");
        hl.add_fields("name, features");
        hl.field("features").set_snippets(5).set_fragsize(50);

        let mut request = Request::new(Method::Get, "select");
        hl.build(&mut request).unwrap();
        assert_eq!(request.param("hl"), Some("true"));
        assert_eq!(request.param("hl.fl"), Some("name,features"));
        assert_eq!(request.param("hl.snippets"), Some("3"));
        assert_eq!(request.param("hl.simple.pre"), Some("<b>"));
        assert_eq!(request.param("f.features.hl.snippets"), Some("5"));
        assert_eq!(request.param("f.features.hl.fragsize"), Some("50"));
        assert!(request.param("f.name.hl.snippets").is_none());
    }

    #[test]
    fn test_parse() {
        let data = json!({"highlighting": {
            "SP2514N": {"features": ["<em>Samsung</em> drive", "fast"]},
            "6H500F0": {}
        }});
        let result = HighlightingResult::parse(&data);
        assert_eq!(result.len(), 2);
        assert_eq!(result.document("SP2514N").unwrap().field("features").unwrap().len(), 2);
        assert!(result.document("6H500F0").unwrap().is_empty());
        assert!(result.document("missing").is_none());
    }
}
