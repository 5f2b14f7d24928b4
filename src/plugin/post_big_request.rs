//! Turns GET requests with a long query string into POST requests.
//!
//! Servlet containers limit the size of the request line, so a GET whose
//! query string is longer than [`PostBigRequestConfig::max_query_string_length`]
//! is sent as a POST with the parameters as an
//! `application/x-www-form-urlencoded` body.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;
use crate::plugin::Plugin;
use crate::query::Query;
use crate::request::{Method, Request};

pub const DEFAULT_MAX_QUERY_STRING_LENGTH: usize = 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostBigRequestConfig {
    pub max_query_string_length: usize,
}

impl Default for PostBigRequestConfig {
    fn default() -> Self {
        PostBigRequestConfig {
            max_query_string_length: DEFAULT_MAX_QUERY_STRING_LENGTH,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostBigRequest {
    config: PostBigRequestConfig,
}

impl PostBigRequest {
    pub fn new() -> Self {
        PostBigRequest::default()
    }

    pub fn from_config(config: PostBigRequestConfig) -> Self {
        PostBigRequest { config }
    }

    pub fn with_max_query_string_length(mut self, length: usize) -> Self {
        self.config.max_query_string_length = length;
        self
    }

    pub fn max_query_string_length(&self) -> usize {
        self.config.max_query_string_length
    }
}

impl Plugin for PostBigRequest {
    fn post_create_request(&self, _query: &dyn Query, request: &mut Request) -> Result<()> {
        if request.method() != Method::Get {
            return Ok(());
        }
        let query_string = request.query_string();
        if query_string.len() <= self.config.max_query_string_length {
            return Ok(());
        }
        debug!(
            length = query_string.len(),
            max = self.config.max_query_string_length,
            "Query string too long, switching to POST"
        );
        request.set_method(Method::Post);
        request.set_raw_data(query_string.into_bytes());
        request.set_content_type("application/x-www-form-urlencoded");
        request.params_mut().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SelectQuery;
    use crate::query::select::SelectRequestBuilder;
    use crate::registry::RequestBuilder;

    fn request_for(query: &SelectQuery, plugin: &PostBigRequest) -> Request {
        let mut request = SelectRequestBuilder.build(query).unwrap();
        plugin.post_create_request(query, &mut request).unwrap();
        request
    }

    #[test]
    fn test_long_query_becomes_post() {
        let plugin = PostBigRequest::new();
        let mut query = SelectQuery::new();
        query.set_query(format!("text:{}", "x".repeat(2000)));

        let request = request_for(&query, &plugin);
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.content_type(), Some("application/x-www-form-urlencoded"));
        assert!(request.params().is_empty());
        let body = std::str::from_utf8(request.raw_data().unwrap()).unwrap();
        assert!(body.contains("q=text%3Axxxx"));
    }

    #[test]
    fn test_short_query_untouched() {
        let plugin = PostBigRequest::new().with_max_query_string_length(4096);
        let mut query = SelectQuery::new();
        query.set_query(format!("text:{}", "x".repeat(2000)));

        let request = request_for(&query, &plugin);
        assert_eq!(request.method(), Method::Get);
        assert!(request.raw_data().is_none());
    }
}
