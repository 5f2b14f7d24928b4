//! Select results.

use serde_json::Value;

use crate::component::{
    ComponentResults, DebugResult, FacetSetResult, GroupingResult, HighlightingResult,
    MoreLikeThisResult, SpellcheckResult, StatsResult, TermVectorResult,
};
use crate::document::Document;
use crate::query::{ResponseHeader, impl_query_result};
use crate::util::named_list;

/// A Solr document list: the `response` section of a select, a group's
/// `doclist`, or a more-like-this list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentList {
    pub num_found: u64,
    pub start: u64,
    pub max_score: Option<f64>,
    /// `false` when `numFound` is a lower bound.
    pub num_found_exact: Option<bool>,
    pub documents: Vec<Document>,
}

impl DocumentList {
    pub fn parse(value: &Value) -> DocumentList {
        DocumentList {
            num_found: named_list::get_u64(value, "numFound").unwrap_or(0),
            start: named_list::get_u64(value, "start").unwrap_or(0),
            max_score: named_list::get_f64(value, "maxScore"),
            num_found_exact: named_list::get_bool(value, "numFoundExact"),
            documents: named_list::get(value, "docs")
                .map(|docs| named_list::items(docs).into_iter().map(Document::from_json).collect())
                .unwrap_or_default(),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.documents.iter()
    }
}

impl<'a> IntoIterator for &'a DocumentList {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.documents.iter()
    }
}

/// Result of a select query.
///
/// A response without a `response` section (for example a grouped
/// response) has zero counts and no documents, and still iterates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub list: DocumentList,
    pub next_cursor_mark: Option<String>,
    pub components: ComponentResults,
}

impl_query_result!(SelectResult);

impl SelectResult {
    pub fn num_found(&self) -> u64 {
        self.list.num_found
    }

    pub fn num_found_exact(&self) -> Option<bool> {
        self.list.num_found_exact
    }

    pub fn start(&self) -> u64 {
        self.list.start
    }

    pub fn max_score(&self) -> Option<f64> {
        self.list.max_score
    }

    pub fn next_cursor_mark(&self) -> Option<&str> {
        self.next_cursor_mark.as_deref()
    }

    pub fn documents(&self) -> &[Document] {
        &self.list.documents
    }

    /// Mutable access for plugins that filter documents.
    pub fn documents_mut(&mut self) -> &mut Vec<Document> {
        &mut self.list.documents
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.list.iter()
    }

    pub fn facet_set(&self) -> &FacetSetResult {
        &self.components.facet_set
    }

    pub fn highlighting(&self) -> &HighlightingResult {
        &self.components.highlighting
    }

    pub fn grouping(&self) -> &GroupingResult {
        &self.components.grouping
    }

    pub fn spellcheck(&self) -> &SpellcheckResult {
        &self.components.spellcheck
    }

    pub fn stats(&self) -> &StatsResult {
        &self.components.stats
    }

    pub fn more_like_this(&self) -> &MoreLikeThisResult {
        &self.components.more_like_this
    }

    pub fn debug(&self) -> &DebugResult {
        &self.components.debug
    }

    pub fn term_vector(&self) -> &TermVectorResult {
        &self.components.term_vector
    }
}

impl<'a> IntoIterator for &'a SelectResult {
    type Item = &'a Document;
    type IntoIter = std::slice::Iter<'a, Document>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}
