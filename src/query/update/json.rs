//! JSON update format.
//!
//! Solr's multi-command JSON repeats keys (`"add"` once per document,
//! `"delete"` once per query), which a JSON map cannot hold, so the outer
//! object is assembled by hand from serialized members.

use serde_json::{Map, Value, json};

use crate::error::{Result, SolriumError};
use crate::query::update::Command;

/// Render commands as a JSON update body.
pub fn build(commands: &[&Command]) -> Result<String> {
    let mut members = Vec::new();
    for command in commands {
        match command {
            Command::Add(add) => {
                for document in &add.documents {
                    let mut body = Map::new();
                    body.insert("doc".to_string(), document.to_json());
                    if let Some(overwrite) = add.overwrite {
                        body.insert("overwrite".to_string(), Value::Bool(overwrite));
                    }
                    if let Some(commit_within) = add.commit_within {
                        body.insert("commitWithin".to_string(), Value::from(commit_within));
                    }
                    members.push(member("add", &Value::Object(body))?);
                }
            }
            Command::Delete(delete) => {
                if !delete.ids.is_empty() {
                    members.push(member("delete", &json!(delete.ids))?);
                }
                for query in &delete.queries {
                    members.push(member("delete", &json!({ "query": query }))?);
                }
            }
            Command::Commit(commit) => {
                let mut body = Map::new();
                insert_flag(&mut body, "softCommit", commit.soft_commit);
                insert_flag(&mut body, "waitSearcher", commit.wait_searcher);
                insert_flag(&mut body, "expungeDeletes", commit.expunge_deletes);
                members.push(member("commit", &Value::Object(body))?);
            }
            Command::Optimize(optimize) => {
                let mut body = Map::new();
                insert_flag(&mut body, "softCommit", optimize.soft_commit);
                insert_flag(&mut body, "waitSearcher", optimize.wait_searcher);
                if let Some(max_segments) = optimize.max_segments {
                    body.insert("maxSegments".to_string(), Value::from(max_segments));
                }
                members.push(member("optimize", &Value::Object(body))?);
            }
            Command::Rollback => members.push(member("rollback", &json!({}))?),
            Command::RawXml(_) => {
                return Err(SolriumError::invalid_argument(
                    "Raw XML commands cannot be sent in the JSON request format",
                ));
            }
        }
    }
    Ok(format!("{{{}}}", members.join(",")))
}

fn member(key: &str, value: &Value) -> Result<String> {
    Ok(format!("\"{key}\":{}", serde_json::to_string(value)?))
}

fn insert_flag(body: &mut Map<String, Value>, key: &str, value: Option<bool>) {
    if let Some(value) = value {
        body.insert(key.to_string(), Value::Bool(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Document, Modifier};
    use crate::query::update::{AddCommand, CommitCommand, DeleteCommand};

    #[test]
    fn test_repeated_keys() {
        let add = Command::Add(AddCommand {
            documents: vec![
                Document::builder().field("id", "1").build(),
                Document::builder().field("id", "2").update("stock", Modifier::Inc, 5).build(),
            ],
            overwrite: Some(false),
            commit_within: None,
        });
        let delete = Command::Delete(DeleteCommand {
            ids: vec!["3".into(), "4".into()],
            queries: vec!["cat:old".into()],
        });
        let commit = Command::Commit(CommitCommand {
            soft_commit: Some(true),
            ..Default::default()
        });
        let body = build(&[&add, &delete, &commit]).unwrap();
        assert_eq!(
            body,
            r#"{"add":{"doc":{"id":"1"},"overwrite":false},"add":{"doc":{"id":"2","stock":{"inc":5}},"overwrite":false},"delete":["3","4"],"delete":{"query":"cat:old"},"commit":{"softCommit":true}}"#
        );
    }

    #[test]
    fn test_raw_xml_rejected() {
        let raw = Command::RawXml("<commit/>".into());
        assert!(matches!(build(&[&raw]), Err(SolriumError::InvalidArgument(_))));
    }
}
