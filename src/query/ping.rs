//! Ping query: checks that a core (or collection) is up.

use serde_json::Value;

use crate::error::Result;
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::util::named_list;

#[derive(Debug, Clone, PartialEq)]
pub struct PingQuery {
    options: QueryOptions,
}

impl_query!(PingQuery, QueryType::Ping);

impl Default for PingQuery {
    fn default() -> Self {
        PingQuery {
            options: QueryOptions::new("admin/ping"),
        }
    }
}

impl PingQuery {
    pub fn new() -> Self {
        PingQuery::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingResult {
    pub header: ResponseHeader,
    pub data: Value,
    /// `OK` when the core is healthy.
    pub status: Option<String>,
}

impl_query_result!(PingResult);

impl PingResult {
    pub fn is_ok(&self) -> bool {
        self.status.as_deref() == Some("OK")
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PingRequestBuilder;

impl RequestBuilder for PingRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<PingQuery>(query, QueryType::Ping)?;
        Ok(create_request(query, Method::Get))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PingResponseParser;

impl ResponseParser for PingResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<PingQuery>(query, QueryType::Ping)?;
        Ok(SolrResult::Ping(PingResult {
            header: ResponseHeader::from_data(&data),
            status: named_list::get_string(&data, "status"),
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ping() {
        let request = PingRequestBuilder.build(&PingQuery::new()).unwrap();
        assert_eq!(request.handler(), "admin/ping");
        assert_eq!(request.method(), Method::Get);

        let data = json!({"responseHeader": {"status": 0, "QTime": 1}, "status": "OK"});
        let result = PingResponseParser
            .parse(&PingQuery::new(), &Response::ok(""), data)
            .unwrap();
        let result = PingResult::try_from(result).unwrap();
        assert!(result.is_ok());
    }
}
