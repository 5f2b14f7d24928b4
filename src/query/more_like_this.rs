//! MoreLikeThis query against the dedicated `mlt` handler.
//!
//! The query matches one or more documents with its select part and
//! returns documents similar to the first match. With a query stream the
//! query text is posted as the body and used as the source document
//! instead.
//!
//! ```
//! use solrium::query::MoreLikeThisQuery;
//! use solrium::query::more_like_this::InterestingTerms;
//!
//! let mut query = MoreLikeThisQuery::new();
//! query.select_mut().set_query("id:SP2514N");
//! query
//!     .set_fields("manu,cat")
//!     .set_match_include(true)
//!     .set_interesting_terms(InterestingTerms::Details);
//! ```

use serde_json::Value;
use tracing::trace;

use crate::component::MoreLikeThisOptions;
use crate::document::Document;
use crate::error::Result;
use crate::query::select::builder::add_search_params;
use crate::query::select::parser::parse_select;
use crate::query::select::{SelectQuery, SelectResult};
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::util::named_list;

/// `mlt.interestingTerms` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterestingTerms {
    None,
    List,
    /// Terms with their boost values.
    Details,
}

impl InterestingTerms {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterestingTerms::None => "none",
            InterestingTerms::List => "list",
            InterestingTerms::Details => "details",
        }
    }
}

/// A more-like-this query.
#[derive(Debug, Clone, PartialEq)]
pub struct MoreLikeThisQuery {
    options: QueryOptions,
    select: SelectQuery,
    pub mlt: MoreLikeThisOptions,
    match_include: Option<bool>,
    match_offset: Option<u64>,
    interesting_terms: Option<InterestingTerms>,
    query_stream: bool,
}

impl_query!(MoreLikeThisQuery, QueryType::MoreLikeThis);

impl Default for MoreLikeThisQuery {
    fn default() -> Self {
        MoreLikeThisQuery {
            options: QueryOptions::new("mlt").with_omit_header(true),
            select: SelectQuery::new(),
            mlt: MoreLikeThisOptions::default(),
            match_include: None,
            match_offset: None,
            interesting_terms: None,
            query_stream: false,
        }
    }
}

impl MoreLikeThisQuery {
    pub fn new() -> Self {
        MoreLikeThisQuery::default()
    }

    /// Search part of the query (q, rows, fl, filter queries, components).
    /// Handler and writer options of the inner query are not used.
    pub fn select(&self) -> &SelectQuery {
        &self.select
    }

    pub fn select_mut(&mut self) -> &mut SelectQuery {
        &mut self.select
    }

    pub fn set_fields<S: Into<String>>(&mut self, fields: S) -> &mut Self {
        self.mlt.fields = Some(fields.into());
        self
    }

    pub fn set_min_term_frequency(&mut self, mintf: u32) -> &mut Self {
        self.mlt.min_term_frequency = Some(mintf);
        self
    }

    pub fn set_min_document_frequency(&mut self, mindf: u32) -> &mut Self {
        self.mlt.min_document_frequency = Some(mindf);
        self
    }

    pub fn match_include(&self) -> Option<bool> {
        self.match_include
    }

    /// Return the matched source document in the result.
    pub fn set_match_include(&mut self, include: bool) -> &mut Self {
        self.match_include = Some(include);
        self
    }

    pub fn match_offset(&self) -> Option<u64> {
        self.match_offset
    }

    /// Which matched document is used as the source.
    pub fn set_match_offset(&mut self, offset: u64) -> &mut Self {
        self.match_offset = Some(offset);
        self
    }

    pub fn interesting_terms(&self) -> Option<InterestingTerms> {
        self.interesting_terms
    }

    pub fn set_interesting_terms(&mut self, mode: InterestingTerms) -> &mut Self {
        self.interesting_terms = Some(mode);
        self
    }

    pub fn query_stream(&self) -> bool {
        self.query_stream
    }

    /// Post the query text as a content stream instead of matching it.
    pub fn set_query_stream(&mut self, stream: bool) -> &mut Self {
        self.query_stream = stream;
        self
    }
}

/// Result of a more-like-this query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoreLikeThisResult {
    pub header: ResponseHeader,
    pub data: Value,
    /// The similar documents and any component results.
    pub select: SelectResult,
    /// Source document, when `mlt.match.include` is set.
    pub match_document: Option<Document>,
    /// Interesting terms; boosts are present in details mode.
    pub interesting_terms: Vec<(String, Option<f64>)>,
}

impl_query_result!(MoreLikeThisResult);

impl MoreLikeThisResult {
    pub fn documents(&self) -> &[Document] {
        self.select.documents()
    }

    pub fn num_found(&self) -> u64 {
        self.select.num_found()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Document> {
        self.select.iter()
    }
}

/// Builds `mlt` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct MoreLikeThisRequestBuilder;

impl RequestBuilder for MoreLikeThisRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<MoreLikeThisQuery>(query, QueryType::MoreLikeThis)?;
        let mut request = create_request(query, Method::Get);
        add_search_params(&query.select, &mut request)?;
        query.mlt.apply(&mut request);
        request.add_param("mlt.match.include", query.match_include);
        request.add_param("mlt.match.offset", query.match_offset);
        request.add_param("mlt.interestingTerms", query.interesting_terms.map(|m| m.as_str()));

        if query.query_stream {
            request.params_mut().remove("q");
            request.set_method(Method::Post);
            request.set_raw_data(query.select.query());
            request.set_content_type("text/plain; charset=utf-8");
        }
        trace!(stream = query.query_stream, "built more-like-this request");
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MoreLikeThisResponseParser;

impl ResponseParser for MoreLikeThisResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        let query = downcast_query::<MoreLikeThisQuery>(query, QueryType::MoreLikeThis)?;
        let match_document = named_list::get(&data, "match")
            .and_then(|list| named_list::get(list, "docs"))
            .and_then(|docs| named_list::items(docs).first().map(|d| Document::from_json(d)));
        let interesting_terms = named_list::get(&data, "interestingTerms")
            .map(parse_interesting_terms)
            .unwrap_or_default();
        Ok(SolrResult::MoreLikeThis(MoreLikeThisResult {
            header: ResponseHeader::from_data(&data),
            select: parse_select(&query.select, data.clone()),
            match_document,
            interesting_terms,
            data,
        }))
    }
}

/// A plain list in list mode, a term → boost named list in details mode.
fn parse_interesting_terms(value: &Value) -> Vec<(String, Option<f64>)> {
    let is_plain_list = value
        .as_array()
        .is_some_and(|items| items.iter().all(Value::is_string) && !looks_like_details(items));
    if is_plain_list {
        return named_list::as_string_list(value).into_iter().map(|t| (t, None)).collect();
    }
    named_list::entries(value)
        .into_iter()
        .map(|(term, boost)| (term, named_list::as_f64(boost)))
        .collect()
}

/// Flat details lists alternate `"field:term"` and a numeric boost.
fn looks_like_details(items: &[Value]) -> bool {
    items.len() % 2 == 0 && items.iter().skip(1).step_by(2).all(|v| named_list::as_f64(v).is_some())
}
