//! Update query: an ordered list of add, delete, commit, optimize,
//! rollback and raw XML commands sent in one request.
//!
//! ```
//! use solrium::document::Document;
//! use solrium::query::UpdateQuery;
//!
//! let mut doc = Document::new();
//! doc.set_field("id", "book-1");
//! doc.set_field("title", "The Rust Programming Language");
//!
//! let mut update = UpdateQuery::new();
//! update.add_document(doc).add_delete_by_id("book-0").add_commit();
//! assert_eq!(update.commands().len(), 3);
//! ```

pub mod cbor;
pub mod json;
pub mod xml;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::document::Document;
use crate::error::Result;
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;

/// Body format of update requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestFormat {
    #[default]
    Xml,
    Json,
    /// Adds only.
    Cbor,
}

/// Add documents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AddCommand {
    pub documents: Vec<Document>,
    pub overwrite: Option<bool>,
    /// Commit within this many milliseconds.
    pub commit_within: Option<u32>,
}

/// Delete documents by id and/or query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteCommand {
    pub ids: Vec<String>,
    pub queries: Vec<String>,
}

impl DeleteCommand {
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty() && self.queries.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommitCommand {
    pub soft_commit: Option<bool>,
    pub wait_searcher: Option<bool>,
    pub expunge_deletes: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimizeCommand {
    pub soft_commit: Option<bool>,
    pub wait_searcher: Option<bool>,
    pub max_segments: Option<u32>,
}

/// One update command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(AddCommand),
    Delete(DeleteCommand),
    Commit(CommitCommand),
    Optimize(OptimizeCommand),
    Rollback,
    /// Pre-built XML, inserted as-is into the `<update>` element. An outer
    /// `<update>` wrapper is stripped.
    RawXml(String),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Add(_) => "add",
            Command::Delete(_) => "delete",
            Command::Commit(_) => "commit",
            Command::Optimize(_) => "optimize",
            Command::Rollback => "rollback",
            Command::RawXml(_) => "rawxml",
        }
    }
}

/// An update query.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateQuery {
    options: QueryOptions,
    commands: Vec<(Option<String>, Command)>,
    request_format: RequestFormat,
}

impl_query!(UpdateQuery, QueryType::Update);

impl Default for UpdateQuery {
    fn default() -> Self {
        UpdateQuery {
            options: QueryOptions::new("update"),
            commands: Vec::new(),
            request_format: RequestFormat::default(),
        }
    }
}

impl UpdateQuery {
    pub fn new() -> Self {
        UpdateQuery::default()
    }

    pub fn request_format(&self) -> RequestFormat {
        self.request_format
    }

    pub fn set_request_format(&mut self, format: RequestFormat) -> &mut Self {
        self.request_format = format;
        self
    }

    /// Add a command, optionally under a key so it can be removed later.
    pub fn add_command(&mut self, key: Option<&str>, command: Command) -> &mut Self {
        self.commands.push((key.map(str::to_string), command));
        self
    }

    pub fn remove_command(&mut self, key: &str) -> &mut Self {
        self.commands.retain(|(k, _)| k.as_deref() != Some(key));
        self
    }

    pub fn commands(&self) -> Vec<&Command> {
        self.commands.iter().map(|(_, c)| c).collect()
    }

    pub fn clear_commands(&mut self) -> &mut Self {
        self.commands.clear();
        self
    }

    pub fn add_document(&mut self, document: Document) -> &mut Self {
        self.add_documents(vec![document], None, None)
    }

    pub fn add_documents<I>(&mut self, documents: I, overwrite: Option<bool>, commit_within: Option<u32>) -> &mut Self
    where
        I: IntoIterator<Item = Document>,
    {
        let command = AddCommand {
            documents: documents.into_iter().collect(),
            overwrite,
            commit_within,
        };
        self.add_command(None, Command::Add(command))
    }

    pub fn add_delete_by_id<S: Into<String>>(&mut self, id: S) -> &mut Self {
        self.add_delete_by_ids([id])
    }

    pub fn add_delete_by_ids<I, S>(&mut self, ids: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let command = DeleteCommand {
            ids: ids.into_iter().map(Into::into).collect(),
            queries: Vec::new(),
        };
        self.add_command(None, Command::Delete(command))
    }

    pub fn add_delete_by_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        let command = DeleteCommand {
            ids: Vec::new(),
            queries: vec![query.into()],
        };
        self.add_command(None, Command::Delete(command))
    }

    pub fn add_commit(&mut self) -> &mut Self {
        self.add_command(None, Command::Commit(CommitCommand::default()))
    }

    pub fn add_commit_with(
        &mut self,
        soft_commit: Option<bool>,
        wait_searcher: Option<bool>,
        expunge_deletes: Option<bool>,
    ) -> &mut Self {
        let command = CommitCommand {
            soft_commit,
            wait_searcher,
            expunge_deletes,
        };
        self.add_command(None, Command::Commit(command))
    }

    pub fn add_optimize(
        &mut self,
        soft_commit: Option<bool>,
        wait_searcher: Option<bool>,
        max_segments: Option<u32>,
    ) -> &mut Self {
        let command = OptimizeCommand {
            soft_commit,
            wait_searcher,
            max_segments,
        };
        self.add_command(None, Command::Optimize(command))
    }

    pub fn add_rollback(&mut self) -> &mut Self {
        self.add_command(None, Command::Rollback)
    }

    pub fn add_raw_xml_command<S: Into<String>>(&mut self, xml: S) -> &mut Self {
        self.add_command(None, Command::RawXml(xml.into()))
    }
}

/// Result of an update query: only the response header.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateResult {
    pub header: ResponseHeader,
    pub data: Value,
}

impl_query_result!(UpdateResult);

/// Builds `POST update` requests in the query's request format.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateRequestBuilder;

impl RequestBuilder for UpdateRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<UpdateQuery>(query, QueryType::Update)?;
        let mut request = create_request(query, Method::Post);
        let commands = query.commands();
        match query.request_format() {
            RequestFormat::Xml => {
                request.set_raw_data(xml::build(&commands));
                request.set_content_type("text/xml; charset=utf-8");
            }
            RequestFormat::Json => {
                request.set_raw_data(json::build(&commands)?);
                request.set_content_type("application/json");
            }
            RequestFormat::Cbor => {
                let body = cbor::build(&commands, &mut request)?;
                request.set_raw_data(body);
                request.set_content_type("application/cbor");
            }
        }
        trace!(commands = commands.len(), format = ?query.request_format(), "built update request");
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateResponseParser;

impl ResponseParser for UpdateResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<UpdateQuery>(query, QueryType::Update)?;
        Ok(SolrResult::Update(UpdateResult {
            header: ResponseHeader::from_data(&data),
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commands_keep_order_and_keys() {
        let mut update = UpdateQuery::new();
        update
            .add_command(Some("first"), Command::Rollback)
            .add_delete_by_query("*:*")
            .add_commit();
        update.remove_command("first");
        let names: Vec<_> = update.commands().iter().map(|c| c.name()).collect();
        assert_eq!(names, vec!["delete", "commit"]);
    }

    #[test]
    fn test_xml_request() {
        let mut update = UpdateQuery::new();
        update.add_delete_by_id("1");
        let request = UpdateRequestBuilder.build(&update).unwrap();
        assert_eq!(request.method(), Method::Post);
        assert_eq!(request.handler(), "update");
        assert_eq!(request.content_type(), Some("text/xml; charset=utf-8"));
        assert_eq!(
            request.raw_data(),
            Some(b"<update><delete><id>1</id></delete></update>".as_slice())
        );
    }

    #[test]
    fn test_parse_header() {
        let data = json!({"responseHeader": {"status": 0, "QTime": 7}});
        let result = UpdateResponseParser
            .parse(&UpdateQuery::new(), &Response::ok(""), data)
            .unwrap();
        let result = UpdateResult::try_from(result).unwrap();
        assert_eq!(result.header.q_time, 7);
    }
}
