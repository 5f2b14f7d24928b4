//! Managed resources REST API: the resource listing (`schema/managed`)
//! and the managed stopword and synonym lists.
//!
//! List names and terms travel as path segments. Solr decodes them one
//! time too many (SOLR-6853), so they are percent-encoded twice unless
//! double encoding is switched off on the query. A 404 answer is not an
//! error for list queries: it means the list or term does not exist.

pub mod stopwords;
pub mod synonyms;

use serde_json::{Value, json};

use crate::error::{Result, SolriumError};
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::util::{encoding, named_list};

pub use stopwords::{
    ManagedStopwordsQuery, ManagedStopwordsRequestBuilder, ManagedStopwordsResponseParser,
    ManagedStopwordsResult,
};
pub use synonyms::{
    ManagedSynonymsQuery, ManagedSynonymsRequestBuilder, ManagedSynonymsResponseParser,
    ManagedSynonymsResult, SynonymMapping,
};

/// `initArgs` of a managed list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InitArgs {
    pub ignore_case: Option<bool>,
    /// Synonym list format, e.g. `solr`.
    pub format: Option<String>,
}

impl InitArgs {
    fn to_json(&self) -> Value {
        let mut args = serde_json::Map::new();
        if let Some(ignore_case) = self.ignore_case {
            args.insert("ignoreCase".to_string(), Value::Bool(ignore_case));
        }
        if let Some(format) = &self.format {
            args.insert("format".to_string(), Value::String(format.clone()));
        }
        json!({ "initArgs": args })
    }

    fn parse(value: &Value) -> InitArgs {
        InitArgs {
            ignore_case: named_list::get_bool(value, "ignoreCase"),
            format: named_list::get_string(value, "format"),
        }
    }
}

/// A command on a managed list; `T` is what `Add` adds.
#[derive(Debug, Clone, PartialEq)]
pub enum ManagedCommand<T> {
    /// `PUT` items into the list.
    Add(T),
    /// `PUT` new init args.
    Config(InitArgs),
    /// `PUT` a new, empty list.
    Create,
    /// `DELETE` the whole list.
    Delete,
    /// `HEAD` the list, or one term of it.
    Exists { term: Option<String> },
    /// `DELETE` one term.
    Remove { term: String },
}

impl<T> ManagedCommand<T> {
    pub fn is_exists(&self) -> bool {
        matches!(self, ManagedCommand::Exists { .. })
    }
}

/// What a list query asks for; shared by stopwords and synonyms.
pub(crate) struct ListRequest<'a, T> {
    pub name: &'a str,
    pub term: Option<&'a str>,
    pub command: Option<&'a ManagedCommand<T>>,
    pub use_double_encoding: bool,
    /// Resource class for `Create`.
    pub class_name: &'a str,
}

impl<T> ListRequest<'_, T> {
    pub(crate) fn build(&self, query: &dyn Query, add_body: impl Fn(&T) -> Value) -> Result<Request> {
        if self.name.is_empty() {
            return Err(SolriumError::invalid_argument("A managed list query needs a list name"));
        }
        let (method, term, body) = match self.command {
            None => (Method::Get, self.term, None),
            Some(ManagedCommand::Add(items)) => (Method::Put, None, Some(add_body(items))),
            Some(ManagedCommand::Config(args)) => (Method::Put, None, Some(args.to_json())),
            Some(ManagedCommand::Create) => (Method::Put, None, Some(json!({ "class": self.class_name }))),
            Some(ManagedCommand::Delete) => (Method::Delete, None, None),
            Some(ManagedCommand::Exists { term }) => (Method::Head, term.as_deref(), None),
            Some(ManagedCommand::Remove { term }) => {
                if term.is_empty() {
                    return Err(SolriumError::invalid_argument("Removing a term needs the term"));
                }
                (Method::Delete, Some(term.as_str()), None)
            }
        };

        let mut request = create_request(query, method);
        let mut handler = format!("{}/{}", query.handler().trim_end_matches('/'), self.encode(self.name));
        if let Some(term) = term {
            handler.push('/');
            handler.push_str(&self.encode(term));
        }
        request.set_handler(handler);
        if let Some(body) = body {
            request.set_raw_data(serde_json::to_vec(&body)?);
            request.set_content_type("application/json");
        }
        Ok(request)
    }

    fn encode(&self, segment: &str) -> String {
        if self.use_double_encoding {
            encoding::double_encode(segment)
        } else {
            encoding::encode(segment)
        }
    }
}

/// Status codes accepted by list queries.
pub(crate) fn accepts_list_status(status: u16) -> bool {
    (200..300).contains(&status) || status == 404
}

/// Fields shared by stopword and synonym list results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedListInfo {
    /// `false` when Solr answered 404.
    pub exists: bool,
    pub init_args: InitArgs,
    pub initialized_on: Option<String>,
    pub updated_since_init: Option<String>,
}

impl ManagedListInfo {
    pub(crate) fn parse(response: &Response, section: Option<&Value>) -> ManagedListInfo {
        let exists = response.status_code() != 404;
        match section {
            Some(section) => ManagedListInfo {
                exists,
                init_args: named_list::get(section, "initArgs")
                    .map(InitArgs::parse)
                    .unwrap_or_default(),
                initialized_on: named_list::get_string(section, "initializedOn"),
                updated_since_init: named_list::get_string(section, "updatedSinceInit"),
            },
            None => ManagedListInfo {
                exists,
                ..Default::default()
            },
        }
    }
}

/// Lists all managed resources.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagedResourcesQuery {
    options: QueryOptions,
}

impl_query!(ManagedResourcesQuery, QueryType::ManagedResources);

impl Default for ManagedResourcesQuery {
    fn default() -> Self {
        ManagedResourcesQuery {
            options: QueryOptions::new("schema/managed"),
        }
    }
}

impl ManagedResourcesQuery {
    pub fn new() -> Self {
        ManagedResourcesQuery::default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedResource {
    /// e.g. `/schema/analysis/stopwords/english`.
    pub resource_id: String,
    pub class_name: Option<String>,
    pub num_observers: Option<u64>,
}

impl ManagedResource {
    /// `stopwords` or `synonyms`, from the resource id.
    pub fn kind(&self) -> Option<&str> {
        let mut segments = self.resource_id.trim_start_matches('/').split('/');
        match (segments.next(), segments.next(), segments.next()) {
            (Some("schema"), Some("analysis"), Some(kind)) => Some(kind),
            _ => None,
        }
    }

    /// List name, the last segment of the resource id.
    pub fn name(&self) -> &str {
        self.resource_id.rsplit('/').next().unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ManagedResourcesResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub resources: Vec<ManagedResource>,
}

impl_query_result!(ManagedResourcesResult);

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedResourcesRequestBuilder;

impl RequestBuilder for ManagedResourcesRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<ManagedResourcesQuery>(query, QueryType::ManagedResources)?;
        Ok(create_request(query, Method::Get))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ManagedResourcesResponseParser;

impl ResponseParser for ManagedResourcesResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<ManagedResourcesQuery>(query, QueryType::ManagedResources)?;
        let resources = named_list::get(&data, "managedResources")
            .map(|items| {
                named_list::items(items)
                    .into_iter()
                    .map(|item| ManagedResource {
                        resource_id: named_list::get_string(item, "resourceId").unwrap_or_default(),
                        class_name: named_list::get_string(item, "class"),
                        num_observers: named_list::get_u64(item, "numObservers"),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(SolrResult::ManagedResources(ManagedResourcesResult {
            header: ResponseHeader::from_data(&data),
            resources,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_resources() {
        let data = json!({"managedResources": [
            {"resourceId": "/schema/analysis/stopwords/english",
             "class": "org.apache.solr.rest.schema.analysis.ManagedWordSetResource", "numObservers": "1"},
            {"resourceId": "/schema/analysis/synonyms/english",
             "class": "org.apache.solr.rest.schema.analysis.ManagedSynonymGraphFilterFactory$SynonymManager"}
        ]});
        let result = ManagedResourcesResponseParser
            .parse(&ManagedResourcesQuery::new(), &Response::ok(""), data)
            .unwrap();
        let result = ManagedResourcesResult::try_from(result).unwrap();
        assert_eq!(result.resources.len(), 2);
        assert_eq!(result.resources[0].kind(), Some("stopwords"));
        assert_eq!(result.resources[0].name(), "english");
        assert_eq!(result.resources[0].num_observers, Some(1));
    }

    #[test]
    fn test_list_status() {
        assert!(accepts_list_status(200));
        assert!(accepts_list_status(404));
        assert!(!accepts_list_status(500));
    }
}
