//! Query type registry.
//!
//! Each [`Client`](crate::client::Client) owns a [`QueryTypeRegistry`] that
//! maps a [`QueryType`] to the [`RequestBuilder`] turning queries of that
//! type into requests, the [`ResponseParser`] turning decoded responses into
//! results, and optionally a factory creating fresh query objects.
//!
//! Registering a type again replaces its entry, which is how applications
//! override a built-in builder or parser.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::{Result, SolriumError};
use crate::query::extract::{ExtractRequestBuilder, ExtractResponseParser};
use crate::query::luke::{LukeRequestBuilder, LukeResponseParser};
use crate::query::more_like_this::{MoreLikeThisRequestBuilder, MoreLikeThisResponseParser};
use crate::query::ping::{PingRequestBuilder, PingResponseParser};
use crate::query::realtime_get::{RealtimeGetRequestBuilder, RealtimeGetResponseParser};
use crate::query::select::{SelectRequestBuilder, SelectResponseParser};
use crate::query::server::api::{ApiRequestBuilder, ApiResponseParser};
use crate::query::server::collections::{CollectionsRequestBuilder, CollectionsResponseParser};
use crate::query::server::core_admin::{CoreAdminRequestBuilder, CoreAdminResponseParser};
use crate::query::server::managed_resources::{
    ManagedResourcesRequestBuilder, ManagedResourcesResponseParser, ManagedStopwordsRequestBuilder,
    ManagedStopwordsResponseParser, ManagedSynonymsRequestBuilder, ManagedSynonymsResponseParser,
};
use crate::query::suggester::{SuggesterRequestBuilder, SuggesterResponseParser};
use crate::query::terms::{TermsRequestBuilder, TermsResponseParser};
use crate::query::update::{UpdateRequestBuilder, UpdateResponseParser};
use crate::query::{
    ApiQuery, ApiResult, CollectionsQuery, CollectionsResult, CoreAdminQuery, CoreAdminResult,
    ExtractQuery, ExtractResult, LukeQuery, LukeResult, ManagedResourcesQuery,
    ManagedResourcesResult, ManagedStopwordsQuery, ManagedStopwordsResult, ManagedSynonymsQuery,
    ManagedSynonymsResult, MoreLikeThisQuery, MoreLikeThisResult, PingQuery, PingResult, Query,
    QueryType, RealtimeGetQuery, RealtimeGetResult, SelectQuery, SelectResult, SuggesterQuery,
    SuggesterResult, TermsQuery, TermsResult, UpdateQuery, UpdateResult,
};
use crate::request::Request;
use crate::response::Response;

/// Turns a query into a transport-agnostic request.
pub trait RequestBuilder: Send + Sync {
    fn build(&self, query: &dyn Query) -> Result<Request>;
}

/// Turns decoded response data into a typed result.
///
/// `data` is the body decoded with the query's response writer (or
/// `Value::Null` for an accepted empty body).
pub trait ResponseParser: Send + Sync {
    fn parse(&self, query: &dyn Query, response: &Response, data: Value) -> Result<SolrResult>;
}

/// Creates a fresh query object of a type.
pub type QueryFactory = Arc<dyn Fn() -> Box<dyn Query> + Send + Sync>;

/// Result of any query type.
pub enum SolrResult {
    Select(SelectResult),
    Update(UpdateResult),
    Ping(PingResult),
    MoreLikeThis(MoreLikeThisResult),
    Suggester(SuggesterResult),
    Terms(TermsResult),
    RealtimeGet(RealtimeGetResult),
    Extract(ExtractResult),
    Luke(LukeResult),
    CoreAdmin(CoreAdminResult),
    Collections(CollectionsResult),
    ManagedResources(ManagedResourcesResult),
    ManagedStopwords(ManagedStopwordsResult),
    ManagedSynonyms(ManagedSynonymsResult),
    Api(ApiResult),
    /// Result of an application-defined query type.
    Custom(Box<dyn Any + Send + Sync>),
}

impl SolrResult {
    /// Name of the variant, used in mismatch errors.
    pub fn kind(&self) -> &'static str {
        match self {
            SolrResult::Select(_) => "select",
            SolrResult::Update(_) => "update",
            SolrResult::Ping(_) => "ping",
            SolrResult::MoreLikeThis(_) => "mlt",
            SolrResult::Suggester(_) => "suggester",
            SolrResult::Terms(_) => "terms",
            SolrResult::RealtimeGet(_) => "get",
            SolrResult::Extract(_) => "extract",
            SolrResult::Luke(_) => "luke",
            SolrResult::CoreAdmin(_) => "cores",
            SolrResult::Collections(_) => "collections",
            SolrResult::ManagedResources(_) => "resources",
            SolrResult::ManagedStopwords(_) => "stopwords",
            SolrResult::ManagedSynonyms(_) => "synonyms",
            SolrResult::Api(_) => "api",
            SolrResult::Custom(_) => "custom",
        }
    }

    /// Downcast a custom result.
    pub fn into_custom<T: Any>(self) -> Result<T> {
        match self {
            SolrResult::Custom(boxed) => {
                let boxed: Box<dyn Any> = boxed;
                boxed
                    .downcast::<T>()
                    .map(|b| *b)
                    .map_err(|_| SolriumError::query_type_mismatch(std::any::type_name::<T>(), "custom"))
            }
            other => Err(SolriumError::query_type_mismatch("custom", other.kind())),
        }
    }
}

impl fmt::Debug for SolrResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolrResult::Select(r) => f.debug_tuple("Select").field(r).finish(),
            SolrResult::Update(r) => f.debug_tuple("Update").field(r).finish(),
            SolrResult::Ping(r) => f.debug_tuple("Ping").field(r).finish(),
            SolrResult::MoreLikeThis(r) => f.debug_tuple("MoreLikeThis").field(r).finish(),
            SolrResult::Suggester(r) => f.debug_tuple("Suggester").field(r).finish(),
            SolrResult::Terms(r) => f.debug_tuple("Terms").field(r).finish(),
            SolrResult::RealtimeGet(r) => f.debug_tuple("RealtimeGet").field(r).finish(),
            SolrResult::Extract(r) => f.debug_tuple("Extract").field(r).finish(),
            SolrResult::Luke(r) => f.debug_tuple("Luke").field(r).finish(),
            SolrResult::CoreAdmin(r) => f.debug_tuple("CoreAdmin").field(r).finish(),
            SolrResult::Collections(r) => f.debug_tuple("Collections").field(r).finish(),
            SolrResult::ManagedResources(r) => f.debug_tuple("ManagedResources").field(r).finish(),
            SolrResult::ManagedStopwords(r) => f.debug_tuple("ManagedStopwords").field(r).finish(),
            SolrResult::ManagedSynonyms(r) => f.debug_tuple("ManagedSynonyms").field(r).finish(),
            SolrResult::Api(r) => f.debug_tuple("Api").field(r).finish(),
            SolrResult::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

macro_rules! impl_try_from_result {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for SolrResult {
                fn from(result: $ty) -> Self {
                    SolrResult::$variant(result)
                }
            }

            impl TryFrom<SolrResult> for $ty {
                type Error = SolriumError;

                fn try_from(result: SolrResult) -> Result<Self> {
                    match result {
                        SolrResult::$variant(result) => Ok(result),
                        other => Err(SolriumError::query_type_mismatch(
                            stringify!($variant),
                            other.kind(),
                        )),
                    }
                }
            }
        )*
    };
}

impl_try_from_result!(
    Select => SelectResult,
    Update => UpdateResult,
    Ping => PingResult,
    MoreLikeThis => MoreLikeThisResult,
    Suggester => SuggesterResult,
    Terms => TermsResult,
    RealtimeGet => RealtimeGetResult,
    Extract => ExtractResult,
    Luke => LukeResult,
    CoreAdmin => CoreAdminResult,
    Collections => CollectionsResult,
    ManagedResources => ManagedResourcesResult,
    ManagedStopwords => ManagedStopwordsResult,
    ManagedSynonyms => ManagedSynonymsResult,
    Api => ApiResult,
);

/// Registry entry of one query type.
#[derive(Clone)]
pub struct QueryTypeEntry {
    pub builder: Arc<dyn RequestBuilder>,
    pub parser: Arc<dyn ResponseParser>,
    pub factory: Option<QueryFactory>,
}

/// Maps query types to their builder, parser and factory.
#[derive(Clone, Default)]
pub struct QueryTypeRegistry {
    entries: HashMap<QueryType, QueryTypeEntry>,
}

impl fmt::Debug for QueryTypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.entries.keys().collect();
        types.sort();
        f.debug_struct("QueryTypeRegistry").field("types", &types).finish()
    }
}

macro_rules! register_builtin {
    ($registry:ident, $($query_type:expr => ($builder:expr, $parser:expr, $query:ty)),* $(,)?) => {
        $(
            $registry.register(
                $query_type,
                Arc::new($builder),
                Arc::new($parser),
                Some(Arc::new(|| Box::new(<$query>::default()) as Box<dyn Query>)),
            );
        )*
    };
}

impl QueryTypeRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        QueryTypeRegistry::default()
    }

    /// A registry with every built-in query type.
    pub fn with_defaults() -> Self {
        let mut registry = QueryTypeRegistry::new();
        register_builtin!(registry,
            QueryType::Select => (SelectRequestBuilder, SelectResponseParser, SelectQuery),
            QueryType::Update => (UpdateRequestBuilder, UpdateResponseParser, UpdateQuery),
            QueryType::Ping => (PingRequestBuilder, PingResponseParser, PingQuery),
            QueryType::MoreLikeThis => (MoreLikeThisRequestBuilder, MoreLikeThisResponseParser, MoreLikeThisQuery),
            QueryType::Suggester => (SuggesterRequestBuilder, SuggesterResponseParser, SuggesterQuery),
            QueryType::Terms => (TermsRequestBuilder, TermsResponseParser, TermsQuery),
            QueryType::RealtimeGet => (RealtimeGetRequestBuilder, RealtimeGetResponseParser, RealtimeGetQuery),
            QueryType::Extract => (ExtractRequestBuilder, ExtractResponseParser, ExtractQuery),
            QueryType::Luke => (LukeRequestBuilder, LukeResponseParser, LukeQuery),
            QueryType::CoreAdmin => (CoreAdminRequestBuilder, CoreAdminResponseParser, CoreAdminQuery),
            QueryType::Collections => (CollectionsRequestBuilder, CollectionsResponseParser, CollectionsQuery),
            QueryType::ManagedResources => (ManagedResourcesRequestBuilder, ManagedResourcesResponseParser, ManagedResourcesQuery),
            QueryType::ManagedStopwords => (ManagedStopwordsRequestBuilder, ManagedStopwordsResponseParser, ManagedStopwordsQuery),
            QueryType::ManagedSynonyms => (ManagedSynonymsRequestBuilder, ManagedSynonymsResponseParser, ManagedSynonymsQuery),
            QueryType::Api => (ApiRequestBuilder, ApiResponseParser, ApiQuery),
        );
        registry
    }

    /// Register (or replace) a query type.
    pub fn register(
        &mut self,
        query_type: QueryType,
        builder: Arc<dyn RequestBuilder>,
        parser: Arc<dyn ResponseParser>,
        factory: Option<QueryFactory>,
    ) {
        self.entries.insert(
            query_type,
            QueryTypeEntry {
                builder,
                parser,
                factory,
            },
        );
    }

    pub fn remove(&mut self, query_type: QueryType) -> Option<QueryTypeEntry> {
        self.entries.remove(&query_type)
    }

    pub fn contains(&self, query_type: QueryType) -> bool {
        self.entries.contains_key(&query_type)
    }

    pub fn get(&self, query_type: QueryType) -> Result<&QueryTypeEntry> {
        self.entries
            .get(&query_type)
            .ok_or_else(|| SolriumError::unsupported_query_type(query_type.to_string()))
    }

    pub fn builder(&self, query_type: QueryType) -> Result<Arc<dyn RequestBuilder>> {
        self.get(query_type).map(|e| Arc::clone(&e.builder))
    }

    pub fn parser(&self, query_type: QueryType) -> Result<Arc<dyn ResponseParser>> {
        self.get(query_type).map(|e| Arc::clone(&e.parser))
    }

    /// Create a fresh query of a type through its factory.
    pub fn create_query(&self, query_type: QueryType) -> Result<Box<dyn Query>> {
        match &self.get(query_type)?.factory {
            Some(factory) => Ok(factory()),
            None => Err(SolriumError::unsupported_query_type(format!(
                "{query_type} (no query factory registered)"
            ))),
        }
    }

    /// Registered query types, sorted.
    pub fn query_types(&self) -> Vec<QueryType> {
        let mut types: Vec<_> = self.entries.keys().copied().collect();
        types.sort();
        types
    }
}
