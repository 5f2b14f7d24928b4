//! Managed stopword lists (`schema/analysis/stopwords/{name}`).
//!
//! ```
//! use solrium::query::ManagedStopwordsQuery;
//! use solrium::query::server::ManagedCommand;
//!
//! let mut query = ManagedStopwordsQuery::new("english");
//! query.set_command(ManagedCommand::Add(vec!["foo".to_string(), "bar".to_string()]));
//! ```

use serde_json::{Value, json};

use crate::error::Result;
use crate::query::server::managed_resources::{
    ListRequest, ManagedCommand, ManagedListInfo, accepts_list_status,
};
use crate::query::{Query, QueryOptions, QueryType, ResponseHeader, downcast_query, impl_query_result};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::Request;
use crate::response::Response;
use crate::util::named_list;

const STOPWORDS_CLASS: &str = "org.apache.solr.rest.schema.analysis.ManagedWordSetResource";

#[derive(Debug, Clone, PartialEq)]
pub struct ManagedStopwordsQuery {
    options: QueryOptions,
    name: String,
    term: Option<String>,
    command: Option<ManagedCommand<Vec<String>>>,
    use_double_encoding: bool,
}

impl Query for ManagedStopwordsQuery {
    fn query_type(&self) -> QueryType {
        QueryType::ManagedStopwords
    }

    fn options(&self) -> &QueryOptions {
        &self.options
    }

    fn options_mut(&mut self) -> &mut QueryOptions {
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

    fn accepts_status(&self, status: u16) -> bool {
        accepts_list_status(status)
    }

    fn accepts_empty_body(&self) -> bool {
        self.command.as_ref().is_some_and(ManagedCommand::is_exists)
    }
}

impl Default for ManagedStopwordsQuery {
    fn default() -> Self {
        ManagedStopwordsQuery {
            options: QueryOptions::new("schema/analysis/stopwords"),
            name: String::new(),
            term: None,
            command: None,
            use_double_encoding: true,
        }
    }
}

impl ManagedStopwordsQuery {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ManagedStopwordsQuery {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name<S: Into<String>>(&mut self, name: S) -> &mut Self {
        self.name = name.into();
        self
    }

    /// Look up a single term instead of the whole list.
    pub fn set_term<S: Into<String>>(&mut self, term: S) -> &mut Self {
        self.term = Some(term.into());
        self
    }

    pub fn command(&self) -> Option<&ManagedCommand<Vec<String>>> {
        self.command.as_ref()
    }

    pub fn set_command(&mut self, command: ManagedCommand<Vec<String>>) -> &mut Self {
        self.command = Some(command);
        self
    }

    pub fn clear_command(&mut self) -> &mut Self {
        self.command = None;
        self
    }

    pub fn set_use_double_encoding(&mut self, double: bool) -> &mut Self {
        self.use_double_encoding = double;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedStopwordsResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub info: ManagedListInfo,
    pub items: Vec<String>,
}

impl_query_result!(ManagedStopwordsResult);

impl ManagedStopwordsResult {
    /// Whether the list (or the looked up term) exists.
    pub fn exists(&self) -> bool {
        self.info.exists
    }

    pub fn contains(&self, word: &str) -> bool {
        self.items.iter().any(|w| w == word)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedStopwordsRequestBuilder;

impl RequestBuilder for ManagedStopwordsRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let stopwords = downcast_query::<ManagedStopwordsQuery>(query, QueryType::ManagedStopwords)?;
        let list = ListRequest {
            name: &stopwords.name,
            term: stopwords.term.as_deref(),
            command: stopwords.command.as_ref(),
            use_double_encoding: stopwords.use_double_encoding,
            class_name: STOPWORDS_CLASS,
        };
        list.build(query, |words| json!(words))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedStopwordsResponseParser;

impl ResponseParser for ManagedStopwordsResponseParser {
    fn parse(&self, query: &dyn Query, response: &Response, data: Value) -> Result<SolrResult> {
        let query = downcast_query::<ManagedStopwordsQuery>(query, QueryType::ManagedStopwords)?;
        let word_set = named_list::get(&data, "wordSet");
        let info = ManagedListInfo::parse(response, word_set);
        let items = if !info.exists {
            Vec::new()
        } else if let Some(list) = word_set.and_then(|w| named_list::get(w, "managedList")) {
            named_list::as_string_list(list)
        } else if let Some(term) = query.term.as_deref().filter(|_| query.command.is_none()) {
            named_list::get(&data, term)
                .map(named_list::as_string_list)
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(SolrResult::ManagedStopwords(ManagedStopwordsResult {
            header: ResponseHeader::from_data(&data),
            info,
            items,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    fn build(query: &ManagedStopwordsQuery) -> Request {
        ManagedStopwordsRequestBuilder.build(query).unwrap()
    }

    #[test]
    fn test_list_and_term_requests() {
        let mut query = ManagedStopwordsQuery::new("english");
        let request = build(&query);
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.handler(), "schema/analysis/stopwords/english");

        query.set_term("a b");
        assert_eq!(build(&query).handler(), "schema/analysis/stopwords/english/a%2520b");

        query.set_use_double_encoding(false);
        assert_eq!(build(&query).handler(), "schema/analysis/stopwords/english/a%20b");
    }

    #[test]
    fn test_commands() {
        let mut query = ManagedStopwordsQuery::new("english");
        query.set_command(ManagedCommand::Add(vec!["foo".into(), "bar".into()]));
        let request = build(&query);
        assert_eq!(request.method(), Method::Put);
        assert_eq!(request.raw_data(), Some(br#"["foo","bar"]"#.as_slice()));
        assert_eq!(request.content_type(), Some("application/json"));

        query.set_command(ManagedCommand::Create);
        let body: Value = serde_json::from_slice(build(&query).raw_data().unwrap()).unwrap();
        assert_eq!(body["class"], STOPWORDS_CLASS);

        query.set_command(ManagedCommand::Remove { term: "foo".into() });
        let request = build(&query);
        assert_eq!(request.method(), Method::Delete);
        assert_eq!(request.handler(), "schema/analysis/stopwords/english/foo");

        query.set_command(ManagedCommand::Exists { term: None });
        assert_eq!(build(&query).method(), Method::Head);
        assert!(query.accepts_empty_body());
        assert!(query.accepts_status(404));
    }

    #[test]
    fn test_parse_list_and_missing() {
        let query = ManagedStopwordsQuery::new("english");
        let data = json!({"wordSet": {
            "initArgs": {"ignoreCase": true},
            "initializedOn": "2024-03-01T10:00:00.000Z",
            "managedList": ["a", "an", "the"]
        }});
        let result = ManagedStopwordsResponseParser.parse(&query, &Response::ok(""), data).unwrap();
        let result = ManagedStopwordsResult::try_from(result).unwrap();
        assert!(result.exists());
        assert_eq!(result.info.init_args.ignore_case, Some(true));
        assert!(result.contains("an"));

        let missing = Response::new(404, "Not Found", Vec::new(), "");
        let result = ManagedStopwordsResponseParser.parse(&query, &missing, Value::Null).unwrap();
        let result = ManagedStopwordsResult::try_from(result).unwrap();
        assert!(!result.exists());
        assert!(result.items.is_empty());
    }
}
