//! Managed synonym maps (`schema/analysis/synonyms/{name}`).

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

const SYNONYMS_CLASS: &str =
    "org.apache.solr.rest.schema.analysis.ManagedSynonymGraphFilterFactory$SynonymManager";

/// Synonyms to add: a mapping `term → synonyms`, or a symmetric group
/// of equivalent words when `term` is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynonymMapping {
    pub term: Option<String>,
    pub synonyms: Vec<String>,
}

impl SynonymMapping {
    pub fn mapping<T, I, S>(term: T, synonyms: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SynonymMapping {
            term: Some(term.into()),
            synonyms: synonyms.into_iter().map(Into::into).collect(),
        }
    }

    pub fn symmetric<I, S>(synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SynonymMapping {
            term: None,
            synonyms: synonyms.into_iter().map(Into::into).collect(),
        }
    }

    fn to_json(&self) -> Value {
        match &self.term {
            Some(term) => {
                let mut map = serde_json::Map::new();
                map.insert(term.clone(), json!(self.synonyms));
                Value::Object(map)
            }
            None => json!([self.synonyms]),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ManagedSynonymsQuery {
    options: QueryOptions,
    name: String,
    term: Option<String>,
    command: Option<ManagedCommand<SynonymMapping>>,
    use_double_encoding: bool,
}

impl Query for ManagedSynonymsQuery {
    fn query_type(&self) -> QueryType {
        QueryType::ManagedSynonyms
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

impl Default for ManagedSynonymsQuery {
    fn default() -> Self {
        ManagedSynonymsQuery {
            options: QueryOptions::new("schema/analysis/synonyms"),
            name: String::new(),
            term: None,
            command: None,
            use_double_encoding: true,
        }
    }
}

impl ManagedSynonymsQuery {
    pub fn new<S: Into<String>>(name: S) -> Self {
        ManagedSynonymsQuery {
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

    /// Look up the synonyms of a single term.
    pub fn set_term<S: Into<String>>(&mut self, term: S) -> &mut Self {
        self.term = Some(term.into());
        self
    }

    pub fn command(&self) -> Option<&ManagedCommand<SynonymMapping>> {
        self.command.as_ref()
    }

    pub fn set_command(&mut self, command: ManagedCommand<SynonymMapping>) -> &mut Self {
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
pub struct ManagedSynonymsResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub info: ManagedListInfo,
    /// term → synonyms.
    pub items: Vec<(String, Vec<String>)>,
}

impl_query_result!(ManagedSynonymsResult);

impl ManagedSynonymsResult {
    pub fn exists(&self) -> bool {
        self.info.exists
    }

    pub fn synonyms(&self, term: &str) -> Option<&[String]> {
        self.items
            .iter()
            .find(|(t, _)| t == term)
            .map(|(_, s)| s.as_slice())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedSynonymsRequestBuilder;

impl RequestBuilder for ManagedSynonymsRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let synonyms = downcast_query::<ManagedSynonymsQuery>(query, QueryType::ManagedSynonyms)?;
        let list = ListRequest {
            name: &synonyms.name,
            term: synonyms.term.as_deref(),
            command: synonyms.command.as_ref(),
            use_double_encoding: synonyms.use_double_encoding,
            class_name: SYNONYMS_CLASS,
        };
        list.build(query, SynonymMapping::to_json)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedSynonymsResponseParser;

impl ResponseParser for ManagedSynonymsResponseParser {
    fn parse(&self, query: &dyn Query, response: &Response, data: Value) -> Result<SolrResult> {
        let query = downcast_query::<ManagedSynonymsQuery>(query, QueryType::ManagedSynonyms)?;
        let mappings = named_list::get(&data, "synonymMappings");
        let info = ManagedListInfo::parse(response, mappings);
        let items = if !info.exists {
            Vec::new()
        } else if let Some(map) = mappings.and_then(|m| named_list::get(m, "managedMap")) {
            named_list::entries(map)
                .into_iter()
                .map(|(term, synonyms)| (term, named_list::as_string_list(synonyms)))
                .collect()
        } else if let Some(term) = query.term.as_deref().filter(|_| query.command.is_none()) {
            named_list::get(&data, term)
                .map(|synonyms| vec![(term.to_string(), named_list::as_string_list(synonyms))])
                .unwrap_or_default()
        } else {
            Vec::new()
        };
        Ok(SolrResult::ManagedSynonyms(ManagedSynonymsResult {
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
    use crate::query::server::managed_resources::InitArgs;
    use crate::request::Method;

    fn body(query: &ManagedSynonymsQuery) -> Value {
        let request = ManagedSynonymsRequestBuilder.build(query).unwrap();
        serde_json::from_slice(request.raw_data().unwrap()).unwrap()
    }

    #[test]
    fn test_add_bodies() {
        let mut query = ManagedSynonymsQuery::new("english");
        query.set_command(ManagedCommand::Add(SynonymMapping::mapping("mad", ["angry", "upset"])));
        assert_eq!(body(&query), json!({"mad": ["angry", "upset"]}));

        query.set_command(ManagedCommand::Add(SynonymMapping::symmetric(["funny", "hilarious"])));
        assert_eq!(body(&query), json!([["funny", "hilarious"]]));
    }

    #[test]
    fn test_config_command() {
        let mut query = ManagedSynonymsQuery::new("english");
        query.set_command(ManagedCommand::Config(InitArgs {
            ignore_case: Some(false),
            format: Some("solr".into()),
        }));
        assert_eq!(body(&query), json!({"initArgs": {"ignoreCase": false, "format": "solr"}}));

        query.set_command(ManagedCommand::Delete);
        let request = ManagedSynonymsRequestBuilder.build(&query).unwrap();
        assert_eq!(request.method(), Method::Delete);
        assert_eq!(request.handler(), "schema/analysis/synonyms/english");
    }

    #[test]
    fn test_parse_map_and_term() {
        let query = ManagedSynonymsQuery::new("english");
        let data = json!({"synonymMappings": {
            "initArgs": {"ignoreCase": true, "format": "solr"},
            "managedMap": {"GB": ["GiB", "Gigabyte"], "TV": ["Television"]}
        }});
        let result = ManagedSynonymsResponseParser.parse(&query, &Response::ok(""), data).unwrap();
        let result = ManagedSynonymsResult::try_from(result).unwrap();
        assert_eq!(result.info.init_args.format.as_deref(), Some("solr"));
        assert_eq!(result.synonyms("GB").unwrap().len(), 2);

        let mut query = ManagedSynonymsQuery::new("english");
        query.set_term("mad");
        let data = json!({"mad": ["angry", "upset"]});
        let result = ManagedSynonymsResponseParser.parse(&query, &Response::ok(""), data).unwrap();
        let result = ManagedSynonymsResult::try_from(result).unwrap();
        assert_eq!(result.synonyms("mad").unwrap(), &["angry".to_string(), "upset".to_string()]);
    }
}
