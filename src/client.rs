//! The Solr client and its execution pipeline.
//!
//! Executing a query runs four stages, each with plugin hooks around it:
//!
//! 1. create request: the registered builder turns the query into a
//!    [`Request`];
//! 2. execute request: the adapter sends it to an [`Endpoint`];
//! 3. create result: the status is checked, the body decoded with the
//!    query's response writer, Solr's own status checked and the registered
//!    parser produces a [`SolrResult`].
//!
//! Query objects can be created through the client too, in which case the
//! create-query hooks run first. Any stage a plugin short-circuits skips
//! its default behaviour entirely, checks included.
//!
//! ```no_run
//! use solrium::client::Client;
//! use solrium::endpoint::Endpoint;
//! use solrium::query::SelectQuery;
//!
//! let client = Client::http().unwrap();
//! client.add_endpoint(Endpoint::builder("local").core("techproducts").build()).unwrap();
//!
//! let mut query = SelectQuery::new();
//! query.set_query("cat:electronics").set_rows(5);
//! let result = client.select(&query).unwrap();
//! for document in result.iter() {
//!     println!("{:?}", document.get_str("id"));
//! }
//! ```

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tracing::{debug, trace};

use crate::adapter::{Adapter, HttpAdapter};
use crate::config::ClientConfig;
use crate::endpoint::Endpoint;
use crate::error::{Result, SolriumError};
use crate::event::EventDispatcher;
use crate::plugin::{LoadBalancer, MinimumScoreFilter, Plugin, PostBigRequest};
use crate::query::{
    ApiQuery, ApiResult, CollectionsQuery, CollectionsResult, CoreAdminQuery, CoreAdminResult,
    ExtractQuery, ExtractResult, LukeQuery, LukeResult, ManagedResourcesQuery,
    ManagedResourcesResult, ManagedStopwordsQuery, ManagedStopwordsResult, ManagedSynonymsQuery,
    ManagedSynonymsResult, MoreLikeThisQuery, MoreLikeThisResult, PingQuery, PingResult, Query,
    QueryType, RealtimeGetQuery, RealtimeGetResult, ResponseHeader, SelectQuery, SelectResult,
    SuggesterQuery, SuggesterResult, TermsQuery, TermsResult, UpdateQuery, UpdateResult,
};
use crate::registry::{QueryFactory, QueryTypeRegistry, RequestBuilder, ResponseParser, SolrResult};
use crate::request::Request;
use crate::response::Response;
use crate::util::named_list;

/// Plugin keys used by [`Client::from_config`].
pub const LOAD_BALANCER_PLUGIN: &str = "loadbalancer";
pub const POST_BIG_REQUEST_PLUGIN: &str = "postbigrequest";
pub const MINIMUM_SCORE_FILTER_PLUGIN: &str = "minimumscorefilter";

struct PluginEntry {
    key: String,
    plugin: Arc<dyn Plugin>,
    any: Arc<dyn Any + Send + Sync>,
}

/// A Solr client.
///
/// All methods take `&self`; a client can be shared behind an [`Arc`]
/// between threads and helpers.
pub struct Client {
    adapter: Arc<dyn Adapter>,
    endpoints: RwLock<Vec<Endpoint>>,
    default_endpoint: RwLock<Option<String>>,
    registry: RwLock<QueryTypeRegistry>,
    plugins: RwLock<Vec<PluginEntry>>,
    events: EventDispatcher,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plugins: Vec<String> = self.plugins.read().iter().map(|p| p.key.clone()).collect();
        f.debug_struct("Client")
            .field("adapter", &self.adapter)
            .field("endpoints", &*self.endpoints.read())
            .field("default_endpoint", &*self.default_endpoint.read())
            .field("plugins", &plugins)
            .finish()
    }
}

impl Client {
    /// A client with the built-in query types and no endpoints.
    pub fn new<A: Adapter + 'static>(adapter: A) -> Self {
        Client::with_registry(Arc::new(adapter), QueryTypeRegistry::with_defaults())
    }

    /// A client with the default HTTP adapter.
    pub fn http() -> Result<Self> {
        Ok(Client::new(HttpAdapter::new()?))
    }

    /// A client with an explicit adapter and registry.
    pub fn with_registry(adapter: Arc<dyn Adapter>, registry: QueryTypeRegistry) -> Self {
        Client {
            adapter,
            endpoints: RwLock::new(Vec::new()),
            default_endpoint: RwLock::new(None),
            registry: RwLock::new(registry),
            plugins: RwLock::new(Vec::new()),
            events: EventDispatcher::new(),
        }
    }

    /// Build a client from its configuration: an [`HttpAdapter`], the
    /// configured endpoints and plugins.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let adapter = HttpAdapter::from_config(config.adapter.clone())?;
        Client::from_config_with_adapter(config, Arc::new(adapter))
    }

    /// Like [`Client::from_config`] with a caller supplied adapter.
    pub fn from_config_with_adapter(config: &ClientConfig, adapter: Arc<dyn Adapter>) -> Result<Self> {
        config.validate()?;
        let client = Client::with_registry(adapter, QueryTypeRegistry::with_defaults());
        for (key, endpoint) in &config.endpoints {
            client.add_endpoint(Endpoint::from_config(key.as_str(), endpoint))?;
        }
        if let Some(key) = &config.default_endpoint {
            client.set_default_endpoint(key)?;
        }

        let plugins = &config.plugins;
        if let Some(balancer) = &plugins.load_balancer {
            client.register_plugin(LOAD_BALANCER_PLUGIN, LoadBalancer::from_config(balancer.clone()))?;
        }
        if let Some(filter) = &plugins.minimum_score_filter {
            client.register_plugin(MINIMUM_SCORE_FILTER_PLUGIN, MinimumScoreFilter::from_config(filter.clone()))?;
        }
        // Last, so it sees every parameter other plugins add.
        if let Some(post) = &plugins.post_big_request {
            client.register_plugin(POST_BIG_REQUEST_PLUGIN, PostBigRequest::from_config(post.clone()))?;
        }
        debug!(
            endpoints = config.endpoints.len(),
            plugins = client.plugin_keys().len(),
            "Client created from configuration"
        );
        Ok(client)
    }

    pub fn adapter(&self) -> Arc<dyn Adapter> {
        Arc::clone(&self.adapter)
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    // Endpoints

    /// Add an endpoint. The first endpoint added becomes the default.
    pub fn add_endpoint(&self, endpoint: Endpoint) -> Result<()> {
        if endpoint.key().is_empty() {
            return Err(SolriumError::invalid_argument("An endpoint must have a key"));
        }
        let mut endpoints = self.endpoints.write();
        if endpoints.iter().any(|e| e.key() == endpoint.key()) {
            return Err(SolriumError::invalid_argument(format!(
                "An endpoint with key '{}' already exists",
                endpoint.key()
            )));
        }
        let mut default = self.default_endpoint.write();
        if default.is_none() {
            *default = Some(endpoint.key().to_string());
        }
        endpoints.push(endpoint);
        Ok(())
    }

    pub fn endpoint(&self, key: &str) -> Result<Endpoint> {
        self.endpoints
            .read()
            .iter()
            .find(|e| e.key() == key)
            .cloned()
            .ok_or_else(|| SolriumError::invalid_argument(format!("Unknown endpoint '{key}'")))
    }

    pub fn endpoints(&self) -> Vec<Endpoint> {
        self.endpoints.read().clone()
    }

    /// Remove an endpoint; the default moves to the first remaining one.
    pub fn remove_endpoint(&self, key: &str) -> Option<Endpoint> {
        let mut endpoints = self.endpoints.write();
        let index = endpoints.iter().position(|e| e.key() == key)?;
        let removed = endpoints.remove(index);
        let mut default = self.default_endpoint.write();
        if default.as_deref() == Some(key) {
            *default = endpoints.first().map(|e| e.key().to_string());
        }
        Some(removed)
    }

    pub fn set_default_endpoint(&self, key: &str) -> Result<()> {
        self.endpoint(key)?;
        *self.default_endpoint.write() = Some(key.to_string());
        Ok(())
    }

    pub fn default_endpoint(&self) -> Result<Endpoint> {
        let key = self
            .default_endpoint
            .read()
            .clone()
            .ok_or_else(|| SolriumError::invalid_operation("No endpoint configured"))?;
        self.endpoint(&key)
    }

    fn resolve_endpoint(&self, key: Option<&str>) -> Result<Endpoint> {
        match key {
            Some(key) => self.endpoint(key),
            None => self.default_endpoint(),
        }
    }

    // Registry

    /// Register (or replace) the builder and parser of a query type.
    pub fn register_query_type(
        &self,
        query_type: QueryType,
        builder: Arc<dyn RequestBuilder>,
        parser: Arc<dyn ResponseParser>,
        factory: Option<QueryFactory>,
    ) {
        self.registry.write().register(query_type, builder, parser, factory);
    }

    pub fn remove_query_type(&self, query_type: QueryType) -> bool {
        self.registry.write().remove(query_type).is_some()
    }

    pub fn query_types(&self) -> Vec<QueryType> {
        self.registry.read().query_types()
    }

    // Plugins

    /// Register a plugin under a unique key and return a handle to it.
    pub fn register_plugin<P>(&self, key: &str, plugin: P) -> Result<Arc<P>>
    where
        P: Plugin + 'static,
    {
        let mut plugins = self.plugins.write();
        if plugins.iter().any(|p| p.key == key) {
            return Err(SolriumError::invalid_argument(format!(
                "A plugin with key '{key}' is already registered"
            )));
        }
        let plugin = Arc::new(plugin);
        plugins.push(PluginEntry {
            key: key.to_string(),
            plugin: Arc::clone(&plugin) as Arc<dyn Plugin>,
            any: Arc::clone(&plugin) as Arc<dyn Any + Send + Sync>,
        });
        debug!(plugin = key, "Plugin registered");
        Ok(plugin)
    }

    /// The plugin registered under `key`, if it is a `P`.
    pub fn plugin<P>(&self, key: &str) -> Option<Arc<P>>
    where
        P: Plugin + 'static,
    {
        let plugins = self.plugins.read();
        let entry = plugins.iter().find(|p| p.key == key)?;
        Arc::clone(&entry.any).downcast::<P>().ok()
    }

    pub fn remove_plugin(&self, key: &str) -> bool {
        let mut plugins = self.plugins.write();
        let before = plugins.len();
        plugins.retain(|p| p.key != key);
        plugins.len() != before
    }

    pub fn plugin_keys(&self) -> Vec<String> {
        self.plugins.read().iter().map(|p| p.key.clone()).collect()
    }

    fn active_plugins(&self) -> Vec<Arc<dyn Plugin>> {
        self.plugins.read().iter().map(|p| Arc::clone(&p.plugin)).collect()
    }

    // Pipeline

    /// Create a query through the create-query hooks and the registered
    /// factory.
    pub fn create_query(&self, query_type: QueryType) -> Result<Box<dyn Query>> {
        let plugins = self.active_plugins();
        let mut supplied = None;
        for plugin in &plugins {
            if let Some(query) = plugin.pre_create_query(query_type)? {
                supplied = Some(query);
                break;
            }
        }
        let mut query = match supplied {
            Some(query) => query,
            None => self.registry.read().create_query(query_type)?,
        };
        for plugin in &plugins {
            plugin.post_create_query(query.as_mut())?;
        }
        Ok(query)
    }

    /// Create a query and downcast it to its concrete type.
    pub fn create<T: Query>(&self, query_type: QueryType) -> Result<T> {
        let query = self.create_query(query_type)?;
        let actual = query.query_type();
        query
            .into_any()
            .downcast::<T>()
            .map(|query| *query)
            .map_err(|_| SolriumError::query_type_mismatch(query_type.to_string(), actual.to_string()))
    }

    /// Build the request for a query.
    pub fn create_request(&self, query: &dyn Query) -> Result<Request> {
        self.create_request_with(&self.active_plugins(), query)
    }

    fn create_request_with(&self, plugins: &[Arc<dyn Plugin>], query: &dyn Query) -> Result<Request> {
        let mut supplied = None;
        for plugin in plugins {
            if let Some(request) = plugin.pre_create_request(query)? {
                supplied = Some(request);
                break;
            }
        }
        let mut request = match supplied {
            Some(request) => request,
            None => {
                let builder = self.registry.read().builder(query.query_type())?;
                builder.build(query)?
            }
        };
        for plugin in plugins {
            plugin.post_create_request(query, &mut request)?;
        }
        trace!(query_type = %query.query_type(), request = %request, "Request created");
        Ok(request)
    }

    /// Send a request to an endpoint.
    pub fn execute_request(&self, query: &dyn Query, request: &Request, endpoint: &Endpoint) -> Result<Response> {
        self.execute_request_with(&self.active_plugins(), query, request, endpoint)
    }

    fn execute_request_with(
        &self,
        plugins: &[Arc<dyn Plugin>],
        query: &dyn Query,
        request: &Request,
        endpoint: &Endpoint,
    ) -> Result<Response> {
        let mut supplied = None;
        for plugin in plugins {
            if let Some(response) = plugin.pre_execute_request(self, query, request, endpoint)? {
                supplied = Some(response);
                break;
            }
        }
        let mut response = match supplied {
            Some(response) => response,
            None => {
                debug!(endpoint = endpoint.key(), method = %request.method(), handler = request.handler(), "Sending request");
                self.adapter.execute(request, endpoint)?
            }
        };
        for plugin in plugins {
            plugin.post_execute_request(query, request, &mut response)?;
        }
        debug!(status = response.status_code(), "Response received");
        Ok(response)
    }

    /// Turn a response into a typed result.
    pub fn create_result(&self, query: &dyn Query, response: &Response) -> Result<SolrResult> {
        self.create_result_with(&self.active_plugins(), query, response)
    }

    fn create_result_with(
        &self,
        plugins: &[Arc<dyn Plugin>],
        query: &dyn Query,
        response: &Response,
    ) -> Result<SolrResult> {
        let mut supplied = None;
        for plugin in plugins {
            if let Some(result) = plugin.pre_create_result(query, response)? {
                supplied = Some(result);
                break;
            }
        }
        let mut result = match supplied {
            Some(result) => result,
            None => self.parse_response(query, response)?,
        };
        for plugin in plugins {
            plugin.post_create_result(query, response, &mut result)?;
        }
        Ok(result)
    }

    fn parse_response(&self, query: &dyn Query, response: &Response) -> Result<SolrResult> {
        let status = response.status_code();
        if !query.accepts_status(status) {
            return Err(http_error(query, response));
        }

        let writer = query.response_writer();
        let body = response.body();
        let data = if body.iter().all(u8::is_ascii_whitespace) && query.accepts_empty_body() {
            Value::Null
        } else if response.is_success() {
            writer.decode(body)?
        } else {
            // An accepted error status, e.g. 404 for a missing managed list.
            writer.decode(body).unwrap_or(Value::Null)
        };

        if response.is_success() {
            let header = ResponseHeader::from_data(&data);
            if header.status != 0 {
                return Err(SolriumError::Solr {
                    status: header.status,
                    message: error_message(&data)
                        .unwrap_or_else(|| format!("Solr reported status {}", header.status)),
                });
            }
        }

        let parser = self.registry.read().parser(query.query_type())?;
        parser.parse(query, response, data)
    }

    /// Run the whole pipeline against the default endpoint.
    pub fn execute(&self, query: &dyn Query) -> Result<SolrResult> {
        self.execute_on(query, None)
    }

    /// Run the whole pipeline against an endpoint, or the default one.
    pub fn execute_on(&self, query: &dyn Query, endpoint: Option<&str>) -> Result<SolrResult> {
        let plugins = self.active_plugins();
        let endpoint = self.resolve_endpoint(endpoint)?;
        let request = self.create_request_with(&plugins, query)?;
        let response = self.execute_request_with(&plugins, query, &request, &endpoint)?;
        self.create_result_with(&plugins, query, &response)
    }
}

/// HTTP error for a rejected status, with Solr's `error.msg` when the body
/// carries one.
fn http_error(query: &dyn Query, response: &Response) -> SolriumError {
    let message = query
        .response_writer()
        .decode(response.body())
        .ok()
        .and_then(|data| error_message(&data))
        .unwrap_or_else(|| response.status_message().to_string());
    SolriumError::http(response.status_code(), message, response.body_str().into_owned())
}

fn error_message(data: &Value) -> Option<String> {
    named_list::get(data, "error").and_then(|error| named_list::get_string(error, "msg"))
}

macro_rules! typed_queries {
    ($($query_type:ident => $query:ty, $result:ty, $execute:ident, $execute_on:ident, $create:ident;)*) => {
        impl Client {
            $(
                #[doc = concat!("Execute a [`", stringify!($query), "`] against the default endpoint.")]
                pub fn $execute(&self, query: &$query) -> Result<$result> {
                    self.execute(query)?.try_into()
                }

                #[doc = concat!("Execute a [`", stringify!($query), "`] against the endpoint `key`.")]
                pub fn $execute_on(&self, query: &$query, key: &str) -> Result<$result> {
                    self.execute_on(query, Some(key))?.try_into()
                }

                #[doc = concat!("Create a [`", stringify!($query), "`] through the create-query hooks.")]
                pub fn $create(&self) -> Result<$query> {
                    self.create(QueryType::$query_type)
                }
            )*
        }
    };
}

typed_queries! {
    Select => SelectQuery, SelectResult, select, select_on, create_select;
    Update => UpdateQuery, UpdateResult, update, update_on, create_update;
    Ping => PingQuery, PingResult, ping, ping_on, create_ping;
    MoreLikeThis => MoreLikeThisQuery, MoreLikeThisResult, more_like_this, more_like_this_on, create_more_like_this;
    Suggester => SuggesterQuery, SuggesterResult, suggester, suggester_on, create_suggester;
    Terms => TermsQuery, TermsResult, terms, terms_on, create_terms;
    RealtimeGet => RealtimeGetQuery, RealtimeGetResult, realtime_get, realtime_get_on, create_realtime_get;
    Extract => ExtractQuery, ExtractResult, extract, extract_on, create_extract;
    Luke => LukeQuery, LukeResult, luke, luke_on, create_luke;
    CoreAdmin => CoreAdminQuery, CoreAdminResult, core_admin, core_admin_on, create_core_admin;
    Collections => CollectionsQuery, CollectionsResult, collections, collections_on, create_collections;
    ManagedResources => ManagedResourcesQuery, ManagedResourcesResult, managed_resources, managed_resources_on, create_managed_resources;
    ManagedStopwords => ManagedStopwordsQuery, ManagedStopwordsResult, managed_stopwords, managed_stopwords_on, create_managed_stopwords;
    ManagedSynonyms => ManagedSynonymsQuery, ManagedSynonymsResult, managed_synonyms, managed_synonyms_on, create_managed_synonyms;
    Api => ApiQuery, ApiResult, api, api_on, create_api;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;
    use parking_lot::Mutex;

    /// Answers every request with the next scripted response and records
    /// what was sent.
    #[derive(Debug, Default)]
    struct ScriptedAdapter {
        responses: Mutex<Vec<Response>>,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedAdapter {
        fn new(responses: Vec<Response>) -> Self {
            ScriptedAdapter {
                responses: Mutex::new(responses.into_iter().rev().collect()),
                sent: Mutex::new(Vec::new()),
            }
        }
    }

    impl Adapter for ScriptedAdapter {
        fn execute(&self, request: &Request, endpoint: &Endpoint) -> Result<Response> {
            self.sent
                .lock()
                .push((endpoint.key().to_string(), request.uri(endpoint)?));
            self.responses
                .lock()
                .pop()
                .ok_or_else(|| SolriumError::transport("no scripted response left"))
        }
    }

    fn client(responses: Vec<Response>) -> (Client, Arc<ScriptedAdapter>) {
        let adapter = Arc::new(ScriptedAdapter::new(responses));
        let client = Client::with_registry(adapter.clone(), QueryTypeRegistry::with_defaults());
        client
            .add_endpoint(Endpoint::builder("local").core("books").build())
            .unwrap();
        (client, adapter)
    }

    #[test]
    fn test_select_through_pipeline() {
        let body = r#"{"responseHeader":{"status":0,"QTime":3},
            "response":{"numFound":1,"start":0,"docs":[{"id":"1"}]}}"#;
        let (client, adapter) = client(vec![Response::ok(body)]);
        let mut query = SelectQuery::new();
        query.set_query("*:*");

        let result = client.select(&query).unwrap();
        assert_eq!(result.num_found(), 1);
        assert_eq!(result.header.q_time, 3);

        let sent = adapter.sent.lock();
        assert_eq!(sent[0].0, "local");
        assert!(sent[0].1.starts_with("http://127.0.0.1:8983/solr/books/select?"));
    }

    #[test]
    fn test_http_error_uses_solr_message() {
        let body = r#"{"responseHeader":{"status":400},"error":{"msg":"undefined field foo","code":400}}"#;
        let (client, _) = client(vec![Response::new(400, "Bad Request", Vec::new(), body)]);
        let error = client.select(&SelectQuery::new()).unwrap_err();
        match error {
            SolriumError::Http { status, message, body: raw } => {
                assert_eq!(status, 400);
                assert_eq!(message, "undefined field foo");
                assert!(raw.contains("undefined field"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_solr_status_error() {
        let body = r#"{"responseHeader":{"status":500},"error":{"msg":"boom"}}"#;
        let (client, _) = client(vec![Response::ok(body)]);
        let error = client.ping(&PingQuery::new()).unwrap_err();
        assert!(matches!(error, SolriumError::Solr { status: 500, .. }));
    }

    #[test]
    fn test_malformed_body_is_parse_error() {
        let (client, _) = client(vec![Response::ok("<html>proxy error</html>")]);
        let error = client.select(&SelectQuery::new()).unwrap_err();
        assert!(matches!(error, SolriumError::Parse(_)), "{error:?}");
    }

    #[test]
    fn test_unregistered_query_type() {
        let (client, adapter) = client(vec![Response::ok("{}")]);
        assert!(client.remove_query_type(QueryType::Terms));
        let error = client.terms(&TermsQuery::new()).unwrap_err();
        assert!(matches!(error, SolriumError::UnsupportedQueryType(_)));
        assert!(adapter.sent.lock().is_empty());
    }

    #[test]
    fn test_endpoints() {
        let (client, _) = client(Vec::new());
        client
            .add_endpoint(Endpoint::builder("replica").host("solr-2").build())
            .unwrap();
        assert_eq!(client.default_endpoint().unwrap().key(), "local");
        assert!(client.add_endpoint(Endpoint::builder("local").build()).is_err());

        client.set_default_endpoint("replica").unwrap();
        assert_eq!(client.default_endpoint().unwrap().host(), "solr-2");
        assert!(client.set_default_endpoint("missing").is_err());

        client.remove_endpoint("replica");
        assert_eq!(client.default_endpoint().unwrap().key(), "local");
    }

    struct Stub;

    impl Plugin for Stub {
        fn pre_execute_request(
            &self,
            _client: &Client,
            _query: &dyn Query,
            _request: &Request,
            _endpoint: &Endpoint,
        ) -> Result<Option<Response>> {
            Ok(Some(Response::ok(r#"{"responseHeader":{"status":0},"status":"OK"}"#)))
        }
    }

    #[test]
    fn test_plugin_registry() {
        let (client, adapter) = client(Vec::new());
        client.register_plugin("stub", Stub).unwrap();
        assert!(client.register_plugin("stub", Stub).is_err());
        assert!(client.plugin::<Stub>("stub").is_some());
        assert!(client.plugin::<LoadBalancer>("stub").is_none());

        let result = client.ping(&PingQuery::new()).unwrap();
        assert!(result.is_ok());
        assert!(adapter.sent.lock().is_empty());

        assert!(client.remove_plugin("stub"));
        assert_eq!(client.plugin_keys(), Vec::<String>::new());
    }

    #[test]
    fn test_create_typed_query() {
        let (client, _) = client(Vec::new());
        let query = client.create_select().unwrap();
        assert_eq!(query.handler(), "select");
        let query = client.create_update().unwrap();
        assert_eq!(query.query_type(), QueryType::Update);
    }
}
