//! Realtime get: fetch the latest version of documents by id, including
//! uncommitted ones.

use serde_json::Value;

use crate::document::Document;
use crate::error::{Result, SolriumError};
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::util::named_list;

#[derive(Debug, Clone, PartialEq)]
pub struct RealtimeGetQuery {
    options: QueryOptions,
    ids: Vec<String>,
    fields: Vec<String>,
}

impl_query!(RealtimeGetQuery, QueryType::RealtimeGet);

impl Default for RealtimeGetQuery {
    fn default() -> Self {
        RealtimeGetQuery {
            options: QueryOptions::new("get").with_omit_header(true),
            ids: Vec::new(),
            fields: Vec::new(),
        }
    }
}

impl RealtimeGetQuery {
    pub fn new() -> Self {
        RealtimeGetQuery::default()
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn add_id<S: Into<String>>(&mut self, id: S) -> &mut Self {
        self.ids.push(id.into());
        self
    }

    pub fn add_ids<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(ids.into_iter().map(Into::into));
        self
    }

    pub fn remove_id(&mut self, id: &str) -> &mut Self {
        self.ids.retain(|i| i != id);
        self
    }

    pub fn clear_ids(&mut self) -> &mut Self {
        self.ids.clear();
        self
    }

    pub fn set_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields = fields.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RealtimeGetResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub documents: Vec<Document>,
}

impl_query_result!(RealtimeGetResult);

impl RealtimeGetResult {
    /// The first document, for single-id lookups.
    pub fn document(&self) -> Option<&Document> {
        self.documents.first()
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

#[derive(Debug, Clone, Copy, Default)]
pub struct RealtimeGetRequestBuilder;

impl RequestBuilder for RealtimeGetRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<RealtimeGetQuery>(query, QueryType::RealtimeGet)?;
        if query.ids.is_empty() {
            return Err(SolriumError::invalid_argument("A realtime get query needs at least one id"));
        }
        let mut request = create_request(query, Method::Get);
        request.add_param("ids", query.ids.join(","));
        request.add_param("fl", query.fields.join(","));
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RealtimeGetResponseParser;

impl ResponseParser for RealtimeGetResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<RealtimeGetQuery>(query, QueryType::RealtimeGet)?;
        // `ids` answers with a document list, `id` with a single `doc`
        let documents = match named_list::path(&data, &["response", "docs"]) {
            Some(docs) => named_list::items(docs).into_iter().map(Document::from_json).collect(),
            None => named_list::get(&data, "doc")
                .filter(|doc| !doc.is_null())
                .map(|doc| vec![Document::from_json(doc)])
                .unwrap_or_default(),
        };
        Ok(SolrResult::RealtimeGet(RealtimeGetResult {
            header: ResponseHeader::from_data(&data),
            documents,
            data,
        }))
    }
}
