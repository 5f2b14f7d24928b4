//! Term vector component (`tv=true`).

use serde_json::Value;

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::request::Request;
use crate::util::named_list;

/// Term vector component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVector {
    pub fields: Vec<String>,
    pub all: Option<bool>,
    pub document_frequency: Option<bool>,
    pub offsets: Option<bool>,
    pub positions: Option<bool>,
    pub payloads: Option<bool>,
    pub term_frequency: Option<bool>,
    pub term_freq_inverse_doc_freq: Option<bool>,
    pub document_ids: Vec<String>,
}

impl TermVector {
    pub fn new() -> Self {
        TermVector::default()
    }

    pub fn add_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    /// Request every statistic (`tv.all`).
    pub fn set_all(&mut self, all: bool) -> &mut Self {
        self.all = Some(all);
        self
    }

    pub fn set_document_frequency(&mut self, df: bool) -> &mut Self {
        self.document_frequency = Some(df);
        self
    }

    pub fn set_offsets(&mut self, offsets: bool) -> &mut Self {
        self.offsets = Some(offsets);
        self
    }

    pub fn set_positions(&mut self, positions: bool) -> &mut Self {
        self.positions = Some(positions);
        self
    }

    pub fn set_payloads(&mut self, payloads: bool) -> &mut Self {
        self.payloads = Some(payloads);
        self
    }

    pub fn set_term_frequency(&mut self, tf: bool) -> &mut Self {
        self.term_frequency = Some(tf);
        self
    }

    pub fn set_term_freq_inverse_doc_freq(&mut self, tf_idf: bool) -> &mut Self {
        self.term_freq_inverse_doc_freq = Some(tf_idf);
        self
    }

    /// Restrict to these internal Lucene document ids (`tv.docIds`).
    pub fn add_document_id<S: Into<String>>(&mut self, id: S) -> &mut Self {
        self.document_ids.push(id.into());
        self
    }
}

impl Component for TermVector {
    fn component_type(&self) -> ComponentType {
        ComponentType::TermVector
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("tv", true);
        request.set_param("tv.fl", self.fields.join(","));
        request.set_param("tv.all", self.all);
        request.set_param("tv.df", self.document_frequency);
        request.set_param("tv.offsets", self.offsets);
        request.set_param("tv.positions", self.positions);
        request.set_param("tv.payloads", self.payloads);
        request.set_param("tv.tf", self.term_frequency);
        request.set_param("tv.tf_idf", self.term_freq_inverse_doc_freq);
        request.set_param("tv.docIds", self.document_ids.join(","));
        Ok(())
    }
}

/// Character offsets of one occurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TermOffset {
    pub start: u64,
    pub end: u64,
}

/// Statistics of one term in one field of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermInfo {
    pub term_frequency: Option<u64>,
    pub document_frequency: Option<u64>,
    pub tf_idf: Option<f64>,
    pub positions: Vec<u64>,
    pub offsets: Vec<TermOffset>,
    pub payloads: Vec<String>,
}

impl TermInfo {
    fn parse(value: &Value) -> TermInfo {
        let positions = named_list::get(value, "positions")
            .map(|p| {
                named_list::entries(p)
                    .into_iter()
                    .filter_map(|(_, v)| named_list::as_u64(v))
                    .collect()
            })
            .unwrap_or_default();
        // Offsets come as a flat run of start/end entries.
        let offsets = named_list::get(value, "offsets")
            .map(|o| {
                let mut offsets = Vec::new();
                let mut start = None;
                for (key, v) in named_list::entries(o) {
                    match key.as_str() {
                        "start" => start = named_list::as_u64(v),
                        "end" => {
                            if let (Some(start), Some(end)) = (start.take(), named_list::as_u64(v)) {
                                offsets.push(TermOffset { start, end });
                            }
                        }
                        _ => {}
                    }
                }
                offsets
            })
            .unwrap_or_default();
        TermInfo {
            term_frequency: named_list::get_u64(value, "tf"),
            document_frequency: named_list::get_u64(value, "df"),
            tf_idf: named_list::get_f64(value, "tf-idf"),
            positions,
            offsets,
            payloads: named_list::get(value, "payloads")
                .map(|p| {
                    named_list::entries(p)
                        .into_iter()
                        .map(|(_, v)| named_list::value_to_string(v))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Term vectors of one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTermVectors {
    pub unique_key: Option<String>,
    /// Field → term → statistics.
    pub fields: Vec<(String, Vec<(String, TermInfo)>)>,
}

impl DocumentTermVectors {
    pub fn field(&self, name: &str) -> Option<&[(String, TermInfo)]> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, terms)| terms.as_slice())
    }

    pub fn term(&self, field: &str, term: &str) -> Option<&TermInfo> {
        self.field(field)?
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, info)| info)
    }
}

/// Parsed `termVectors` section, keyed by document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermVectorResult {
    pub unique_key_field_name: Option<String>,
    documents: Vec<(String, DocumentTermVectors)>,
}

impl TermVectorResult {
    pub fn parse(data: &Value) -> TermVectorResult {
        let Some(section) = named_list::get(data, "termVectors") else {
            return TermVectorResult::default();
        };
        let mut result = TermVectorResult::default();
        for (key, value) in named_list::entries(section) {
            match key.as_str() {
                "uniqueKeyFieldName" => result.unique_key_field_name = Some(named_list::value_to_string(value)),
                "warnings" => {}
                _ => {
                    let mut document = DocumentTermVectors::default();
                    for (field, terms) in named_list::entries(value) {
                        if field == "uniqueKey" {
                            document.unique_key = Some(named_list::value_to_string(terms));
                            continue;
                        }
                        let terms = named_list::entries(terms)
                            .into_iter()
                            .map(|(term, info)| (term, TermInfo::parse(info)))
                            .collect();
                        document.fields.push((field, terms));
                    }
                    result.documents.push((key, document));
                }
            }
        }
        result
    }

    pub fn document(&self, key: &str) -> Option<&DocumentTermVectors> {
        self.documents.iter().find(|(k, _)| k == key).map(|(_, d)| d)
    }

    pub fn documents(&self) -> &[(String, DocumentTermVectors)] {
        &self.documents
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
    fn test_build() {
        let mut tv = TermVector::new();
        tv.add_field("includes").add_field("name").set_term_frequency(true).set_offsets(true);

        let mut request = Request::new(Method::Get, "tvrh");
        tv.build(&mut request).unwrap();
        assert_eq!(request.param("tv"), Some("true"));
        assert_eq!(request.param("tv.fl"), Some("includes,name"));
        assert_eq!(request.param("tv.tf"), Some("true"));
        assert!(request.param("tv.docIds").is_none());
    }

    #[test]
    fn test_parse() {
        let data = json!({"termVectors": [
            "uniqueKeyFieldName", "id",
            "MA147LL/A", [
                "uniqueKey", "MA147LL/A",
                "includes", [
                    "cable", ["tf", 1, "df", 3, "tf-idf", 0.33,
                              "positions", ["position", 2],
                              "offsets", ["start", 10, "end", 15]]
                ]
            ]
        ]});
        let result = TermVectorResult::parse(&data);
        assert_eq!(result.unique_key_field_name.as_deref(), Some("id"));
        let document = result.document("MA147LL/A").unwrap();
        assert_eq!(document.unique_key.as_deref(), Some("MA147LL/A"));
        let info = document.term("includes", "cable").unwrap();
        assert_eq!(info.document_frequency, Some(3));
        assert_eq!(info.positions, vec![2]);
        assert_eq!(info.offsets, vec![TermOffset { start: 10, end: 15 }]);
    }
}
