//! Query model.
//!
//! Every Solr feature the client talks to is a query type: a typed,
//! reusable configuration object implementing [`Query`]. The client turns
//! a query into a [`Request`] with the request builder registered for its
//! [`QueryType`] and parses the response with the matching response
//! parser (see [`crate::registry`]).
//!
//! Options shared by all query types (handler, response writer,
//! `omitHeader`, `timeAllowed`, free-form params) live in [`QueryOptions`].

pub mod extract;
pub mod helper;
pub mod local_parameters;
pub mod luke;
pub mod more_like_this;
pub mod ping;
pub mod realtime_get;
pub mod select;
pub mod server;
pub mod suggester;
pub mod terms;
pub mod update;

use std::any::Any;
use std::fmt;

use serde_json::Value;

use crate::error::{Result, SolriumError};
use crate::request::{Method, Params, Request};
use crate::util::named_list;
use crate::writer::ResponseWriter;

pub use extract::{ExtractQuery, ExtractResult};
pub use luke::{LukeQuery, LukeResult};
pub use more_like_this::{MoreLikeThisQuery, MoreLikeThisResult};
pub use ping::{PingQuery, PingResult};
pub use realtime_get::{RealtimeGetQuery, RealtimeGetResult};
pub use select::{SelectQuery, SelectResult};
pub use server::api::{ApiQuery, ApiResult};
pub use server::collections::{CollectionsQuery, CollectionsResult};
pub use server::core_admin::{CoreAdminQuery, CoreAdminResult};
pub use server::managed_resources::{
    ManagedResourcesQuery, ManagedResourcesResult, ManagedStopwordsQuery, ManagedStopwordsResult,
    ManagedSynonymsQuery, ManagedSynonymsResult,
};
pub use suggester::{SuggesterQuery, SuggesterResult};
pub use terms::{TermsQuery, TermsResult};
pub use update::{UpdateQuery, UpdateResult};

/// Tag identifying a query type in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueryType {
    Select,
    Update,
    Ping,
    MoreLikeThis,
    Suggester,
    Terms,
    RealtimeGet,
    Extract,
    Luke,
    CoreAdmin,
    Collections,
    ManagedResources,
    ManagedStopwords,
    ManagedSynonyms,
    Api,
    /// Application-defined query type.
    Custom(&'static str),
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Select => "select",
            QueryType::Update => "update",
            QueryType::Ping => "ping",
            QueryType::MoreLikeThis => "mlt",
            QueryType::Suggester => "suggester",
            QueryType::Terms => "terms",
            QueryType::RealtimeGet => "get",
            QueryType::Extract => "extract",
            QueryType::Luke => "luke",
            QueryType::CoreAdmin => "cores",
            QueryType::Collections => "collections",
            QueryType::ManagedResources => "resources",
            QueryType::ManagedStopwords => "stopwords",
            QueryType::ManagedSynonyms => "synonyms",
            QueryType::Api => "api",
            QueryType::Custom(name) => name,
        }
    }

    /// All built-in query types.
    pub fn builtin() -> &'static [QueryType] {
        &[
            QueryType::Select,
            QueryType::Update,
            QueryType::Ping,
            QueryType::MoreLikeThis,
            QueryType::Suggester,
            QueryType::Terms,
            QueryType::RealtimeGet,
            QueryType::Extract,
            QueryType::Luke,
            QueryType::CoreAdmin,
            QueryType::Collections,
            QueryType::ManagedResources,
            QueryType::ManagedStopwords,
            QueryType::ManagedSynonyms,
            QueryType::Api,
        ]
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options shared by every query type.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOptions {
    /// Request handler path relative to the core, e.g. `select`.
    pub handler: String,
    pub response_writer: ResponseWriter,
    pub omit_header: Option<bool>,
    /// `timeAllowed` in milliseconds.
    pub time_allowed: Option<u64>,
    /// `NOW` override in epoch milliseconds.
    pub now: Option<i64>,
    /// `TZ` used for date math.
    pub time_zone: Option<String>,
    /// `distrib`.
    pub distrib: Option<bool>,
    /// Free-form parameters appended to every request.
    pub params: Params,
}

impl QueryOptions {
    pub fn new<S: Into<String>>(handler: S) -> Self {
        QueryOptions {
            handler: handler.into(),
            response_writer: ResponseWriter::Json,
            omit_header: None,
            time_allowed: None,
            now: None,
            time_zone: None,
            distrib: None,
            params: Params::new(),
        }
    }

    pub fn with_omit_header(mut self, omit_header: bool) -> Self {
        self.omit_header = Some(omit_header);
        self
    }

    pub fn with_response_writer(mut self, writer: ResponseWriter) -> Self {
        self.response_writer = writer;
        self
    }
}

/// A typed query configuration.
///
/// Queries are plain data; building the request and parsing the response
/// is done by the builder/parser registered for [`Query::query_type`].
pub trait Query: Send + Sync + fmt::Debug + Any {
    fn query_type(&self) -> QueryType;

    fn options(&self) -> &QueryOptions;

    fn options_mut(&mut self) -> &mut QueryOptions;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    /// Whether a response status should be handed to the parser instead of
    /// being raised as an HTTP error.
    fn accepts_status(&self, status: u16) -> bool {
        (200..300).contains(&status)
    }

    /// Whether an empty response body is a valid answer (HEAD requests).
    fn accepts_empty_body(&self) -> bool {
        false
    }

    fn handler(&self) -> &str {
        &self.options().handler
    }

    fn set_handler(&mut self, handler: &str) {
        self.options_mut().handler = handler.to_string();
    }

    fn response_writer(&self) -> ResponseWriter {
        self.options().response_writer
    }

    fn set_response_writer(&mut self, writer: ResponseWriter) {
        self.options_mut().response_writer = writer;
    }

    fn set_omit_header(&mut self, omit_header: bool) {
        self.options_mut().omit_header = Some(omit_header);
    }

    fn set_time_allowed(&mut self, millis: u64) {
        self.options_mut().time_allowed = Some(millis);
    }

    /// Add a free-form request parameter.
    fn add_param(&mut self, key: &str, value: &str) {
        self.options_mut().params.add(key, value);
    }
}

/// Implement the boilerplate part of [`Query`] for a struct with an
/// `options: QueryOptions` field.
macro_rules! impl_query {
    ($ty:ty, $query_type:expr) => {
        impl $crate::query::Query for $ty {
            fn query_type(&self) -> $crate::query::QueryType {
                $query_type
            }

            fn options(&self) -> &$crate::query::QueryOptions {
                &self.options
            }

            fn options_mut(&mut self) -> &mut $crate::query::QueryOptions {
                &mut self.options
            }

            fn as_any(&self) -> &dyn std::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
                self
            }

            fn into_any(self: Box<Self>) -> Box<dyn std::any::Any> {
                self
            }
        }
    };
}

pub(crate) use impl_query;

/// Downcast a query to its concrete type.
pub fn downcast_query<T: Query>(query: &dyn Query, expected: QueryType) -> Result<&T> {
    query.as_any().downcast_ref::<T>().ok_or_else(|| {
        SolriumError::query_type_mismatch(expected.to_string(), query.query_type().to_string())
    })
}

/// Start a request with the options every query type shares.
pub(crate) fn create_request(query: &dyn Query, method: Method) -> Request {
    let options = query.options();
    let mut request = Request::new(method, options.handler.clone());
    request.add_param("omitHeader", options.omit_header);
    request.add_param("timeAllowed", options.time_allowed);
    request.add_param("NOW", options.now);
    request.add_param("TZ", options.time_zone.as_deref());
    request.add_param("distrib", options.distrib);
    for (key, value) in options.params.iter() {
        request.add_param(key, value);
    }
    options.response_writer.apply(&mut request);
    request
}

/// The `responseHeader` section of a response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseHeader {
    pub status: i64,
    /// Query time in milliseconds.
    pub q_time: i64,
    /// Echoed request parameters, when `echoParams` is enabled.
    pub params: Vec<(String, String)>,
    /// Set when `timeAllowed` cut the search short.
    pub partial_results: bool,
}

impl ResponseHeader {
    /// Read the header from decoded response data; all zero when absent.
    pub fn from_data(data: &Value) -> ResponseHeader {
        let Some(header) = named_list::get(data, "responseHeader") else {
            return ResponseHeader::default();
        };
        let params = named_list::get(header, "params")
            .map(|p| {
                named_list::entries(p)
                    .into_iter()
                    .flat_map(|(k, v)| {
                        named_list::as_string_list(v)
                            .into_iter()
                            .map(move |v| (k.clone(), v))
                    })
                    .collect()
            })
            .unwrap_or_default();
        ResponseHeader {
            status: named_list::get_i64(header, "status").unwrap_or(0),
            q_time: named_list::get_i64(header, "QTime").unwrap_or(0),
            params,
            partial_results: named_list::get_bool(header, "partialResults").unwrap_or(false),
        }
    }
}

/// Common accessors of typed results.
pub trait QueryResult {
    /// Parsed response header.
    fn header(&self) -> &ResponseHeader;

    /// Decoded response data.
    fn data(&self) -> &Value;

    fn status(&self) -> i64 {
        self.header().status
    }

    fn query_time(&self) -> i64 {
        self.header().q_time
    }
}

/// Implement [`QueryResult`] for a struct with `header` and `data` fields.
macro_rules! impl_query_result {
    ($($ty:ty),* $(,)?) => {
        $(impl $crate::query::QueryResult for $ty {
            fn header(&self) -> &$crate::query::ResponseHeader {
                &self.header
            }

            fn data(&self) -> &serde_json::Value {
                &self.data
            }
        })*
    };
}

pub(crate) use impl_query_result;
