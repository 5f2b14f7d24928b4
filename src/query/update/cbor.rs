//! CBOR update format.
//!
//! The CBOR loader only indexes documents: the body is a plain array of
//! documents and `overwrite`/`commitWithin` travel as request parameters.

use serde_json::Value;

use crate::error::{Result, SolriumError};
use crate::query::update::Command;
use crate::request::Request;

/// Encode the documents of the add commands, setting their options as
/// request parameters.
pub fn build(commands: &[&Command], request: &mut Request) -> Result<Vec<u8>> {
    let mut documents = Vec::new();
    let mut overwrite = None;
    let mut commit_within = None;
    for command in commands {
        let Command::Add(add) = command else {
            return Err(SolriumError::invalid_argument(format!(
                "The CBOR request format only supports add commands, got '{}'",
                command.name()
            )));
        };
        overwrite = merge_option(overwrite, add.overwrite, "overwrite")?;
        commit_within = merge_option(commit_within, add.commit_within, "commitWithin")?;
        documents.extend(add.documents.iter().map(|d| d.to_json()));
    }
    request.set_param("overwrite", overwrite);
    request.set_param("commitWithin", commit_within);

    let mut body = Vec::new();
    ciborium::into_writer(&Value::Array(documents), &mut body)
        .map_err(|e| SolriumError::invalid_argument(format!("CBOR encoding failed: {e}")))?;
    Ok(body)
}

/// Options of several add commands must agree, since there is only one
/// set of request parameters.
fn merge_option<T: PartialEq + Copy>(current: Option<T>, next: Option<T>, name: &str) -> Result<Option<T>> {
    match (current, next) {
        (Some(a), Some(b)) if a != b => Err(SolriumError::invalid_argument(format!(
            "Conflicting '{name}' values in CBOR add commands"
        ))),
        (current, next) => Ok(next.or(current)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::query::update::AddCommand;
    use crate::request::Method;

    #[test]
    fn test_documents_and_params() {
        let add = Command::Add(AddCommand {
            documents: vec![Document::builder().field("id", "1").field("n", 3).build()],
            overwrite: Some(true),
            commit_within: Some(500),
        });
        let mut request = Request::new(Method::Post, "update");
        let body = build(&[&add], &mut request).unwrap();
        let decoded: Value = ciborium::from_reader(body.as_slice()).unwrap();
        assert_eq!(decoded, serde_json::json!([{"id": "1", "n": 3}]));
        assert_eq!(request.param("overwrite"), Some("true"));
        assert_eq!(request.param("commitWithin"), Some("500"));
    }

    #[test]
    fn test_only_adds() {
        let mut request = Request::new(Method::Post, "update");
        assert!(matches!(
            build(&[&Command::Rollback], &mut request),
            Err(SolriumError::InvalidArgument(_))
        ));
    }
}
