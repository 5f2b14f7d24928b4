//! Suggester query (`suggest` handler).

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
pub struct SuggesterQuery {
    options: QueryOptions,
    query: Option<String>,
    dictionaries: Vec<String>,
    count: Option<u32>,
    context_filter_query: Option<String>,
    build: Option<bool>,
    reload: Option<bool>,
}

impl_query!(SuggesterQuery, QueryType::Suggester);

impl Default for SuggesterQuery {
    fn default() -> Self {
        SuggesterQuery {
            options: QueryOptions::new("suggest").with_omit_header(true),
            query: None,
            dictionaries: Vec::new(),
            count: None,
            context_filter_query: None,
            build: None,
            reload: None,
        }
    }
}

impl SuggesterQuery {
    pub fn new() -> Self {
        SuggesterQuery::default()
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn set_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query = Some(query.into());
        self
    }

    pub fn dictionaries(&self) -> &[String] {
        &self.dictionaries
    }

    pub fn add_dictionary<S: Into<String>>(&mut self, dictionary: S) -> &mut Self {
        self.dictionaries.push(dictionary.into());
        self
    }

    pub fn set_dictionaries<I, S>(&mut self, dictionaries: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dictionaries = dictionaries.into_iter().map(Into::into).collect();
        self
    }

    pub fn set_count(&mut self, count: u32) -> &mut Self {
        self.count = Some(count);
        self
    }

    /// Context filter query (`suggest.cfq`).
    pub fn set_context_filter_query<S: Into<String>>(&mut self, cfq: S) -> &mut Self {
        self.context_filter_query = Some(cfq.into());
        self
    }

    pub fn set_build(&mut self, build: bool) -> &mut Self {
        self.build = Some(build);
        self
    }

    pub fn set_reload(&mut self, reload: bool) -> &mut Self {
        self.reload = Some(reload);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub term: String,
    pub weight: i64,
    pub payload: Option<String>,
}

/// Suggestions of one dictionary for one input term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermSuggestions {
    pub num_found: u64,
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggesterResult {
    pub header: ResponseHeader,
    pub data: Value,
    /// dictionary → input term → suggestions.
    pub dictionaries: Vec<(String, Vec<(String, TermSuggestions)>)>,
}

impl_query_result!(SuggesterResult);

impl SuggesterResult {
    pub fn dictionary(&self, name: &str) -> Option<&[(String, TermSuggestions)]> {
        self.dictionaries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, terms)| terms.as_slice())
    }

    /// Suggestions for a term, from the first dictionary that has it.
    pub fn term(&self, term: &str) -> Option<&TermSuggestions> {
        self.dictionaries
            .iter()
            .flat_map(|(_, terms)| terms)
            .find(|(t, _)| t == term)
            .map(|(_, s)| s)
    }

    /// All suggested terms, in response order.
    pub fn all_terms(&self) -> Vec<&str> {
        self.dictionaries
            .iter()
            .flat_map(|(_, terms)| terms)
            .flat_map(|(_, s)| &s.suggestions)
            .map(|s| s.term.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuggesterRequestBuilder;

impl RequestBuilder for SuggesterRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<SuggesterQuery>(query, QueryType::Suggester)?;
        let mut request = create_request(query, Method::Get);
        request.add_param("suggest", true);
        request.params_mut().add_all("suggest.dictionary", &query.dictionaries);
        request.add_param("suggest.q", query.query.as_deref());
        request.add_param("suggest.count", query.count);
        request.add_param("suggest.cfq", query.context_filter_query.as_deref());
        request.add_param("suggest.build", query.build);
        request.add_param("suggest.reload", query.reload);
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SuggesterResponseParser;

impl ResponseParser for SuggesterResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<SuggesterQuery>(query, QueryType::Suggester)?;
        let dictionaries = named_list::get(&data, "suggest")
            .map(|suggest| {
                named_list::entries(suggest)
                    .into_iter()
                    .map(|(name, terms)| (name, parse_terms(terms)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(SolrResult::Suggester(SuggesterResult {
            header: ResponseHeader::from_data(&data),
            dictionaries,
            data,
        }))
    }
}

fn parse_terms(value: &Value) -> Vec<(String, TermSuggestions)> {
    named_list::entries(value)
        .into_iter()
        .map(|(term, entry)| {
            let suggestions = named_list::get(entry, "suggestions")
                .map(|items| {
                    named_list::items(items)
                        .into_iter()
                        .map(|s| Suggestion {
                            term: named_list::get_string(s, "term").unwrap_or_default(),
                            weight: named_list::get_i64(s, "weight").unwrap_or(0),
                            payload: named_list::get_string(s, "payload").filter(|p| !p.is_empty()),
                        })
                        .collect()
                })
                .unwrap_or_default();
            let num_found = named_list::get_u64(entry, "numFound").unwrap_or(0);
            (term, TermSuggestions { num_found, suggestions })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request() {
        let mut query = SuggesterQuery::new();
        query
            .set_query("ap")
            .add_dictionary("mySuggester")
            .add_dictionary("altSuggester")
            .set_count(5)
            .set_context_filter_query("cat:memory")
            .set_build(true);
        let request = SuggesterRequestBuilder.build(&query).unwrap();
        assert_eq!(request.handler(), "suggest");
        assert_eq!(
            request.params().get("suggest.dictionary").unwrap(),
            &["mySuggester".to_string(), "altSuggester".to_string()]
        );
        assert_eq!(request.param("suggest.q"), Some("ap"));
        assert_eq!(request.param("suggest.count"), Some("5"));
        assert_eq!(request.param("suggest.cfq"), Some("cat:memory"));
        assert_eq!(request.param("suggest.build"), Some("true"));
        assert!(request.param("suggest.reload").is_none());
    }

    #[test]
    fn test_parse() {
        let data = json!({
            "suggest": {"mySuggester": {"ap": {"numFound": 2, "suggestions": [
                {"term": "apple", "weight": 10, "payload": ""},
                {"term": "apache", "weight": 4, "payload": "asf"}
            ]}}}
        });
        let result = SuggesterResponseParser
            .parse(&SuggesterQuery::new(), &Response::ok(""), data)
            .unwrap();
        let result = SuggesterResult::try_from(result).unwrap();
        let ap = result.term("ap").unwrap();
        assert_eq!(ap.num_found, 2);
        assert_eq!(ap.suggestions[0].payload, None);
        assert_eq!(ap.suggestions[1].payload.as_deref(), Some("asf"));
        assert_eq!(result.all_terms(), vec!["apple", "apache"]);
        assert!(result.dictionary("other").is_none());
    }
}
