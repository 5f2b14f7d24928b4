//! Generic API query for endpoints without a dedicated query type, on the
//! V1 (`/solr/...`) or V2 (`/api/...`) API.
//!
//! ```
//! use solrium::query::ApiQuery;
//! use solrium::request::{ApiVersion, Method};
//!
//! let mut query = ApiQuery::new("schema/fields");
//! query.set_version(ApiVersion::V2).set_method(Method::Get);
//! ```

use serde_json::Value;

use crate::error::Result;
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{ApiVersion, Method, Request};
use crate::response::Response;

#[derive(Debug, Clone, PartialEq)]
pub struct ApiQuery {
    options: QueryOptions,
    method: Method,
    version: ApiVersion,
    is_server_request: bool,
    raw_data: Option<Vec<u8>>,
    content_type: Option<String>,
}

impl_query!(ApiQuery, QueryType::Api);

impl Default for ApiQuery {
    fn default() -> Self {
        ApiQuery {
            options: QueryOptions::new(""),
            method: Method::Get,
            version: ApiVersion::V1,
            is_server_request: false,
            raw_data: None,
            content_type: None,
        }
    }
}

impl ApiQuery {
    pub fn new<S: Into<String>>(handler: S) -> Self {
        ApiQuery {
            options: QueryOptions::new(handler),
            ..Default::default()
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) -> &mut Self {
        self.method = method;
        self
    }

    pub fn version(&self) -> ApiVersion {
        self.version
    }

    pub fn set_version(&mut self, version: ApiVersion) -> &mut Self {
        self.version = version;
        self
    }

    /// Address the handler relative to the server instead of a core.
    pub fn set_is_server_request(&mut self, server: bool) -> &mut Self {
        self.is_server_request = server;
        self
    }

    pub fn set_raw_data<B: Into<Vec<u8>>>(&mut self, data: B) -> &mut Self {
        self.raw_data = Some(data.into());
        self
    }

    pub fn set_content_type<S: Into<String>>(&mut self, content_type: S) -> &mut Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResult {
    pub header: ResponseHeader,
    pub data: Value,
}

impl_query_result!(ApiResult);

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiRequestBuilder;

impl RequestBuilder for ApiRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<ApiQuery>(query, QueryType::Api)?;
        let mut request = create_request(query, query.method);
        request.set_api(query.version);
        request.set_is_server_request(query.is_server_request);
        if let Some(data) = &query.raw_data {
            request.set_raw_data(data.clone());
            request.set_content_type(query.content_type.as_deref().unwrap_or("application/json"));
        }
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ApiResponseParser;

impl ResponseParser for ApiResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<ApiQuery>(query, QueryType::Api)?;
        Ok(SolrResult::Api(ApiResult {
            header: ResponseHeader::from_data(&data),
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Endpoint;

    #[test]
    fn test_v2_server_request_with_body() {
        let mut query = ApiQuery::new("c/books/config");
        query
            .set_version(ApiVersion::V2)
            .set_is_server_request(true)
            .set_method(Method::Post)
            .set_raw_data(r#"{"set-property":{"updateHandler.autoCommit.maxTime":15000}}"#);
        let request = ApiRequestBuilder.build(&query).unwrap();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.content_type(), Some("application/json"));
        let endpoint = Endpoint::builder("local").build();
        assert!(
            request
                .uri(&endpoint)
                .unwrap()
                .starts_with("http://127.0.0.1:8983/api/c/books/config?")
        );
    }
}
