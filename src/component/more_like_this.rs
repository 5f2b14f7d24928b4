//! MoreLikeThis component (`mlt=true`).
//!
//! The `mlt.*` tuning options are shared with the standalone
//! [`crate::query::MoreLikeThisQuery`] through [`MoreLikeThisOptions`].

use serde_json::Value;

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::query::select::DocumentList;
use crate::request::Request;
use crate::util::named_list;

/// `mlt.*` tuning options.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoreLikeThisOptions {
    /// Comma separated similarity fields (`mlt.fl`).
    pub fields: Option<String>,
    pub min_term_frequency: Option<u32>,
    pub min_document_frequency: Option<u32>,
    pub max_document_frequency: Option<u32>,
    pub max_document_frequency_percentage: Option<u32>,
    pub min_word_length: Option<u32>,
    pub max_word_length: Option<u32>,
    pub max_query_terms: Option<u32>,
    pub max_number_of_tokens: Option<u32>,
    pub boost: Option<bool>,
    /// Field boosts, e.g. `"title^2 text"` (`mlt.qf`).
    pub query_fields: Option<String>,
}

impl MoreLikeThisOptions {
    pub fn with_fields<S: Into<String>>(mut self, fields: S) -> Self {
        self.fields = Some(fields.into());
        self
    }

    pub fn with_min_term_frequency(mut self, mintf: u32) -> Self {
        self.min_term_frequency = Some(mintf);
        self
    }

    pub fn with_min_document_frequency(mut self, mindf: u32) -> Self {
        self.min_document_frequency = Some(mindf);
        self
    }

    pub fn with_max_query_terms(mut self, maxqt: u32) -> Self {
        self.max_query_terms = Some(maxqt);
        self
    }

    pub fn with_boost(mut self, boost: bool) -> Self {
        self.boost = Some(boost);
        self
    }

    pub fn with_query_fields<S: Into<String>>(mut self, fields: S) -> Self {
        self.query_fields = Some(fields.into());
        self
    }

    /// Add the set options to a request.
    pub fn apply(&self, request: &mut Request) {
        request.set_param("mlt.fl", self.fields.as_deref());
        request.set_param("mlt.mintf", self.min_term_frequency);
        request.set_param("mlt.mindf", self.min_document_frequency);
        request.set_param("mlt.maxdf", self.max_document_frequency);
        request.set_param("mlt.maxdfpct", self.max_document_frequency_percentage);
        request.set_param("mlt.minwl", self.min_word_length);
        request.set_param("mlt.maxwl", self.max_word_length);
        request.set_param("mlt.maxqt", self.max_query_terms);
        request.set_param("mlt.maxntp", self.max_number_of_tokens);
        request.set_param("mlt.boost", self.boost);
        request.set_param("mlt.qf", self.query_fields.as_deref());
    }
}

/// MoreLikeThis component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoreLikeThis {
    pub options: MoreLikeThisOptions,
    /// Similar documents returned per result document.
    pub count: Option<u32>,
}

impl MoreLikeThis {
    pub fn new() -> Self {
        MoreLikeThis::default()
    }

    pub fn set_fields<S: Into<String>>(&mut self, fields: S) -> &mut Self {
        self.options.fields = Some(fields.into());
        self
    }

    pub fn set_min_term_frequency(&mut self, mintf: u32) -> &mut Self {
        self.options.min_term_frequency = Some(mintf);
        self
    }

    pub fn set_min_document_frequency(&mut self, mindf: u32) -> &mut Self {
        self.options.min_document_frequency = Some(mindf);
        self
    }

    pub fn set_count(&mut self, count: u32) -> &mut Self {
        self.count = Some(count);
        self
    }
}

impl Component for MoreLikeThis {
    fn component_type(&self) -> ComponentType {
        ComponentType::MoreLikeThis
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("mlt", true);
        self.options.apply(request);
        request.set_param("mlt.count", self.count);
        Ok(())
    }
}

/// Parsed `moreLikeThis` section: document key → similar documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoreLikeThisResult {
    results: Vec<(String, DocumentList)>,
}

impl MoreLikeThisResult {
    pub fn parse(data: &Value) -> MoreLikeThisResult {
        let results = named_list::get(data, "moreLikeThis")
            .map(|section| {
                named_list::entries(section)
                    .into_iter()
                    .map(|(key, list)| (key, DocumentList::parse(list)))
                    .collect()
            })
            .unwrap_or_default();
        MoreLikeThisResult { results }
    }

    pub fn result(&self, key: &str) -> Option<&DocumentList> {
        self.results.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn results(&self) -> &[(String, DocumentList)] {
        &self.results
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    #[test]
    fn test_build() {
        let mut mlt = MoreLikeThis::new();
        mlt.set_fields("manu,cat").set_min_document_frequency(1).set_count(3);

        let mut request = Request::new(Method::Get, "select");
        mlt.build(&mut request).unwrap();
        assert_eq!(request.param("mlt"), Some("true"));
        assert_eq!(request.param("mlt.fl"), Some("manu,cat"));
        assert_eq!(request.param("mlt.mindf"), Some("1"));
        assert_eq!(request.param("mlt.count"), Some("3"));
        assert!(request.param("mlt.mintf").is_none());
    }

    #[test]
    fn test_parse() {
        let data = json!({"moreLikeThis": {
            "SP2514N": {"numFound": 3, "start": 0, "maxScore": 1.5, "docs": [{"id": "6H500F0"}]}
        }});
        let result = MoreLikeThisResult::parse(&data);
        let list = result.result("SP2514N").unwrap();
        assert_eq!(list.num_found, 3);
        assert_eq!(list.max_score, Some(1.5));
        assert_eq!(list.documents[0].get_str("id"), Some("6H500F0"));
    }
}
