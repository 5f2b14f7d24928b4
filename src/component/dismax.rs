//! DisMax and extended DisMax query parser components.

use crate::component::{Component, ComponentType};
use crate::error::{Result, SolriumError};
use crate::query::local_parameters::LocalParameters;
use crate::request::Request;

/// A keyed boost query (`bq`).
#[derive(Debug, Clone, PartialEq)]
pub struct BoostQuery {
    key: String,
    query: String,
    pub local_parameters: LocalParameters,
}

impl BoostQuery {
    pub fn new<K: Into<String>, Q: Into<String>>(key: K, query: Q) -> Self {
        BoostQuery {
            key: key.into(),
            query: query.into(),
            local_parameters: LocalParameters::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query = query.into();
        self
    }

    fn render(&self) -> String {
        self.local_parameters.apply(&self.query)
    }
}

/// DisMax component (`defType=dismax`).
#[derive(Debug, Clone, PartialEq)]
pub struct DisMax {
    pub query_parser: String,
    pub query_alternative: Option<String>,
    pub query_fields: Option<String>,
    pub minimum_match: Option<String>,
    pub phrase_fields: Option<String>,
    pub phrase_slop: Option<u32>,
    pub query_phrase_slop: Option<u32>,
    pub tie: Option<f64>,
    pub boost_functions: Option<String>,
    boost_queries: Vec<BoostQuery>,
}

impl Default for DisMax {
    fn default() -> Self {
        DisMax {
            query_parser: "dismax".to_string(),
            query_alternative: None,
            query_fields: None,
            minimum_match: None,
            phrase_fields: None,
            phrase_slop: None,
            query_phrase_slop: None,
            tie: None,
            boost_functions: None,
            boost_queries: Vec::new(),
        }
    }
}

impl DisMax {
    pub fn new() -> Self {
        DisMax::default()
    }

    pub fn set_query_parser<S: Into<String>>(&mut self, parser: S) -> &mut Self {
        self.query_parser = parser.into();
        self
    }

    pub fn set_query_alternative<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query_alternative = Some(query.into());
        self
    }

    /// Fields with optional boosts, e.g. `"title^2 text"`.
    pub fn set_query_fields<S: Into<String>>(&mut self, fields: S) -> &mut Self {
        self.query_fields = Some(fields.into());
        self
    }

    pub fn set_minimum_match<S: Into<String>>(&mut self, mm: S) -> &mut Self {
        self.minimum_match = Some(mm.into());
        self
    }

    pub fn set_phrase_fields<S: Into<String>>(&mut self, fields: S) -> &mut Self {
        self.phrase_fields = Some(fields.into());
        self
    }

    pub fn set_phrase_slop(&mut self, slop: u32) -> &mut Self {
        self.phrase_slop = Some(slop);
        self
    }

    pub fn set_query_phrase_slop(&mut self, slop: u32) -> &mut Self {
        self.query_phrase_slop = Some(slop);
        self
    }

    pub fn set_tie(&mut self, tie: f64) -> &mut Self {
        self.tie = Some(tie);
        self
    }

    pub fn set_boost_functions<S: Into<String>>(&mut self, functions: S) -> &mut Self {
        self.boost_functions = Some(functions.into());
        self
    }

    /// Add a boost query; keys are unique.
    pub fn add_boost_query(&mut self, boost_query: BoostQuery) -> Result<&mut Self> {
        if boost_query.key.is_empty() {
            return Err(SolriumError::invalid_argument("A boostquery must have a key value"));
        }
        if self.boost_query(&boost_query.key).is_some() {
            return Err(SolriumError::invalid_argument(format!(
                "A boostquery must have a unique key value, '{}' is already in use",
                boost_query.key
            )));
        }
        self.boost_queries.push(boost_query);
        Ok(self)
    }

    pub fn create_boost_query<K: Into<String>, Q: Into<String>>(
        &mut self,
        key: K,
        query: Q,
    ) -> Result<&mut BoostQuery> {
        self.add_boost_query(BoostQuery::new(key, query))?;
        let index = self.boost_queries.len() - 1;
        Ok(&mut self.boost_queries[index])
    }

    pub fn boost_query(&self, key: &str) -> Option<&BoostQuery> {
        self.boost_queries.iter().find(|b| b.key == key)
    }

    pub fn boost_queries(&self) -> &[BoostQuery] {
        &self.boost_queries
    }

    pub fn remove_boost_query(&mut self, key: &str) {
        self.boost_queries.retain(|b| b.key != key);
    }

    fn build_params(&self, request: &mut Request) {
        request.set_param("defType", self.query_parser.as_str());
        request.set_param("q.alt", self.query_alternative.as_deref());
        request.set_param("qf", self.query_fields.as_deref());
        request.set_param("mm", self.minimum_match.as_deref());
        request.set_param("pf", self.phrase_fields.as_deref());
        request.set_param("ps", self.phrase_slop);
        request.set_param("qs", self.query_phrase_slop);
        request.set_param("tie", self.tie);
        request.set_param("bf", self.boost_functions.as_deref());
        for boost_query in &self.boost_queries {
            request.add_param("bq", boost_query.render());
        }
    }
}

impl Component for DisMax {
    fn component_type(&self) -> ComponentType {
        ComponentType::DisMax
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        self.build_params(request);
        Ok(())
    }
}

/// Extended DisMax component (`defType=edismax`).
#[derive(Debug, Clone, PartialEq)]
pub struct EDisMax {
    pub dismax: DisMax,
    pub phrase_bigram_fields: Option<String>,
    pub phrase_bigram_slop: Option<u32>,
    pub phrase_trigram_fields: Option<String>,
    pub phrase_trigram_slop: Option<u32>,
    pub boost_function_mult: Option<String>,
    pub stopwords: Option<bool>,
    pub lowercase_operators: Option<bool>,
    pub user_fields: Option<String>,
}

impl Default for EDisMax {
    fn default() -> Self {
        let mut dismax = DisMax::new();
        dismax.set_query_parser("edismax");
        EDisMax {
            dismax,
            phrase_bigram_fields: None,
            phrase_bigram_slop: None,
            phrase_trigram_fields: None,
            phrase_trigram_slop: None,
            boost_function_mult: None,
            stopwords: None,
            lowercase_operators: None,
            user_fields: None,
        }
    }
}

impl EDisMax {
    pub fn new() -> Self {
        EDisMax::default()
    }

    pub fn set_phrase_bigram_fields<S: Into<String>>(&mut self, fields: S) -> &mut Self {
        self.phrase_bigram_fields = Some(fields.into());
        self
    }

    pub fn set_phrase_bigram_slop(&mut self, slop: u32) -> &mut Self {
        self.phrase_bigram_slop = Some(slop);
        self
    }

    pub fn set_phrase_trigram_fields<S: Into<String>>(&mut self, fields: S) -> &mut Self {
        self.phrase_trigram_fields = Some(fields.into());
        self
    }

    pub fn set_phrase_trigram_slop(&mut self, slop: u32) -> &mut Self {
        self.phrase_trigram_slop = Some(slop);
        self
    }

    /// Multiplicative boost function (`boost`).
    pub fn set_boost_function_mult<S: Into<String>>(&mut self, function: S) -> &mut Self {
        self.boost_function_mult = Some(function.into());
        self
    }

    pub fn set_stopwords(&mut self, stopwords: bool) -> &mut Self {
        self.stopwords = Some(stopwords);
        self
    }

    pub fn set_lowercase_operators(&mut self, lowercase: bool) -> &mut Self {
        self.lowercase_operators = Some(lowercase);
        self
    }

    pub fn set_user_fields<S: Into<String>>(&mut self, fields: S) -> &mut Self {
        self.user_fields = Some(fields.into());
        self
    }
}

impl Component for EDisMax {
    fn component_type(&self) -> ComponentType {
        ComponentType::EDisMax
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        self.dismax.build_params(request);
        request.set_param("pf2", self.phrase_bigram_fields.as_deref());
        request.set_param("ps2", self.phrase_bigram_slop);
        request.set_param("pf3", self.phrase_trigram_fields.as_deref());
        request.set_param("ps3", self.phrase_trigram_slop);
        request.set_param("boost", self.boost_function_mult.as_deref());
        request.set_param("stopwords", self.stopwords);
        request.set_param("lowercaseOperators", self.lowercase_operators);
        request.set_param("uf", self.user_fields.as_deref());
        Ok(())
    }
}
