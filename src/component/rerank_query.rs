//! Re-ranking of the top documents with a second query.

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::query::local_parameters::LocalParameters;
use crate::request::Request;

/// ReRank query component.
///
/// Sends `rq={!rerank reRankQuery=$rqq ...}` with the re-rank query itself
/// in `rqq`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReRankQuery {
    pub query: Option<String>,
    pub docs: Option<u32>,
    pub weight: Option<f64>,
}

impl ReRankQuery {
    pub fn new<S: Into<String>>(query: S) -> Self {
        ReRankQuery {
            query: Some(query.into()),
            ..Default::default()
        }
    }

    pub fn set_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query = Some(query.into());
        self
    }

    /// Number of top documents to re-rank.
    pub fn set_docs(&mut self, docs: u32) -> &mut Self {
        self.docs = Some(docs);
        self
    }

    pub fn set_weight(&mut self, weight: f64) -> &mut Self {
        self.weight = Some(weight);
        self
    }
}

impl Component for ReRankQuery {
    fn component_type(&self) -> ComponentType {
        ComponentType::ReRankQuery
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        let mut params = LocalParameters::new();
        params.set_type("rerank");
        params.set("reRankQuery", "$rqq");
        if let Some(docs) = self.docs {
            params.set("reRankDocs", docs.to_string());
        }
        if let Some(weight) = self.weight {
            params.set("reRankWeight", weight.to_string());
        }
        request.set_param("rq", params.render());
        request.set_param("rqq", self.query.as_deref());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_build() {
        let mut rerank = ReRankQuery::new("greetings");
        rerank.set_docs(1000).set_weight(3.0);

        let mut request = Request::new(Method::Get, "select");
        rerank.build(&mut request).unwrap();
        assert_eq!(
            request.param("rq"),
            Some("{!rerank reRankQuery=$rqq reRankDocs=1000 reRankWeight=3}")
        );
        assert_eq!(request.param("rqq"), Some("greetings"));
    }
}
