//! Select query.
//!
//! ```
//! use solrium::query::SelectQuery;
//! use solrium::query::select::SortOrder;
//!
//! let mut query = SelectQuery::new();
//! query
//!     .set_query("title:rust")
//!     .set_rows(20)
//!     .set_fields(["id", "title", "score"])
//!     .add_sort("price", SortOrder::Asc);
//! query.create_filter_query("stock", "inStock:true").unwrap().add_tag("stock");
//! query.facet_set().create_facet_field("category").unwrap().set_field("cat");
//! ```

pub mod builder;
pub mod filter_query;
pub mod parser;
pub mod result;

use crate::component::{
    Components, DisMax, DistributedSearch, EDisMax, FacetSet, Grouping, Highlighting, MoreLikeThis,
    QueryDebug, QueryElevation, ReRankQuery, Spatial, Spellcheck, Stats, TermVector,
};
use crate::error::{Result, SolriumError};
use crate::query::local_parameters::LocalParameters;
use crate::query::{QueryOptions, QueryType, helper, impl_query};

pub use builder::SelectRequestBuilder;
pub use filter_query::FilterQuery;
pub use parser::SelectResponseParser;
pub use result::{DocumentList, SelectResult};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

/// Default operator of the standard query parser (`q.op`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOperator {
    And,
    Or,
}

impl QueryOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOperator::And => "AND",
            QueryOperator::Or => "OR",
        }
    }
}

/// A select (search) query.
///
/// Defaults: `q=*:*`, `start=0`, `rows=10`, `fl=*,score`, header omitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    options: QueryOptions,
    query: String,
    pub local_parameters: LocalParameters,
    start: u64,
    rows: u64,
    fields: Vec<String>,
    sorts: Vec<(String, SortOrder)>,
    query_default_operator: Option<QueryOperator>,
    query_default_field: Option<String>,
    cursor_mark: Option<String>,
    split_on_whitespace: Option<bool>,
    filter_queries: Vec<FilterQuery>,
    components: Components,
}

impl_query!(SelectQuery, QueryType::Select);

impl Default for SelectQuery {
    fn default() -> Self {
        SelectQuery::with_handler("select")
    }
}

impl SelectQuery {
    pub fn new() -> Self {
        SelectQuery::default()
    }

    /// A select query against another search handler.
    pub fn with_handler<S: Into<String>>(handler: S) -> Self {
        SelectQuery {
            options: QueryOptions::new(handler).with_omit_header(true),
            query: "*:*".to_string(),
            local_parameters: LocalParameters::new(),
            start: 0,
            rows: 10,
            fields: vec!["*".to_string(), "score".to_string()],
            sorts: Vec::new(),
            query_default_operator: None,
            query_default_field: None,
            cursor_mark: None,
            split_on_whitespace: None,
            filter_queries: Vec::new(),
            components: Components::default(),
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn set_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.query = query.into();
        self
    }

    /// Set the query from a template with `%1%`, `%P1%` and `%T1%`
    /// placeholders; see [`helper::assemble`].
    pub fn set_query_with<S: AsRef<str>>(&mut self, template: &str, parts: &[S]) -> Result<&mut Self> {
        self.query = helper::assemble(template, parts)?;
        Ok(self)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn set_start(&mut self, start: u64) -> &mut Self {
        self.start = start;
        self
    }

    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn set_rows(&mut self, rows: u64) -> &mut Self {
        self.rows = rows;
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn add_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        let field = field.into();
        if !self.fields.contains(&field) {
            self.fields.push(field);
        }
        self
    }

    /// Replace the field list.
    pub fn set_fields<I, S>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fields.clear();
        for field in fields {
            self.add_field(field);
        }
        self
    }

    pub fn remove_field(&mut self, field: &str) -> &mut Self {
        self.fields.retain(|f| f != field);
        self
    }

    pub fn clear_fields(&mut self) -> &mut Self {
        self.fields.clear();
        self
    }

    pub fn sorts(&self) -> &[(String, SortOrder)] {
        &self.sorts
    }

    /// Add a sort; sorting again on a field replaces its direction.
    pub fn add_sort<S: Into<String>>(&mut self, field: S, order: SortOrder) -> &mut Self {
        let field = field.into();
        match self.sorts.iter_mut().find(|(f, _)| *f == field) {
            Some(entry) => entry.1 = order,
            None => self.sorts.push((field, order)),
        }
        self
    }

    pub fn remove_sort(&mut self, field: &str) -> &mut Self {
        self.sorts.retain(|(f, _)| f != field);
        self
    }

    pub fn clear_sorts(&mut self) -> &mut Self {
        self.sorts.clear();
        self
    }

    pub fn query_default_operator(&self) -> Option<QueryOperator> {
        self.query_default_operator
    }

    pub fn set_query_default_operator(&mut self, operator: QueryOperator) -> &mut Self {
        self.query_default_operator = Some(operator);
        self
    }

    pub fn query_default_field(&self) -> Option<&str> {
        self.query_default_field.as_deref()
    }

    pub fn set_query_default_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.query_default_field = Some(field.into());
        self
    }

    pub fn cursor_mark(&self) -> Option<&str> {
        self.cursor_mark.as_deref()
    }

    /// Use cursor based paging; start with `"*"`.
    pub fn set_cursor_mark<S: Into<String>>(&mut self, mark: S) -> &mut Self {
        self.cursor_mark = Some(mark.into());
        self
    }

    pub fn clear_cursor_mark(&mut self) -> &mut Self {
        self.cursor_mark = None;
        self
    }

    pub fn split_on_whitespace(&self) -> Option<bool> {
        self.split_on_whitespace
    }

    pub fn set_split_on_whitespace(&mut self, split: bool) -> &mut Self {
        self.split_on_whitespace = Some(split);
        self
    }

    /// Add a filter query; keys must be non-empty and unique.
    pub fn add_filter_query(&mut self, filter_query: FilterQuery) -> Result<&mut Self> {
        if filter_query.key().is_empty() {
            return Err(SolriumError::invalid_argument("A filterquery must have a key value"));
        }
        if self.filter_query(filter_query.key()).is_some() {
            return Err(SolriumError::invalid_argument(format!(
                "A filterquery must have a unique key value within a query, '{}' is already in use",
                filter_query.key()
            )));
        }
        self.filter_queries.push(filter_query);
        Ok(self)
    }

    pub fn create_filter_query<K: Into<String>, Q: Into<String>>(
        &mut self,
        key: K,
        query: Q,
    ) -> Result<&mut FilterQuery> {
        self.add_filter_query(FilterQuery::new(key, query))?;
        let index = self.filter_queries.len() - 1;
        Ok(&mut self.filter_queries[index])
    }

    pub fn filter_query(&self, key: &str) -> Option<&FilterQuery> {
        self.filter_queries.iter().find(|f| f.key() == key)
    }

    pub fn filter_query_mut(&mut self, key: &str) -> Option<&mut FilterQuery> {
        self.filter_queries.iter_mut().find(|f| f.key() == key)
    }

    pub fn filter_queries(&self) -> &[FilterQuery] {
        &self.filter_queries
    }

    pub fn remove_filter_query(&mut self, key: &str) -> &mut Self {
        self.filter_queries.retain(|f| f.key() != key);
        self
    }

    pub fn clear_filter_queries(&mut self) -> &mut Self {
        self.filter_queries.clear();
        self
    }

    pub fn components(&self) -> &Components {
        &self.components
    }

    pub fn components_mut(&mut self) -> &mut Components {
        &mut self.components
    }

    /// The facet set, created on first use.
    pub fn facet_set(&mut self) -> &mut FacetSet {
        self.components.facet_set.get_or_insert_with(FacetSet::new)
    }

    pub fn highlighting(&mut self) -> &mut Highlighting {
        self.components.highlighting.get_or_insert_with(Highlighting::new)
    }

    pub fn grouping(&mut self) -> &mut Grouping {
        self.components.grouping.get_or_insert_with(Grouping::new)
    }

    pub fn spellcheck(&mut self) -> &mut Spellcheck {
        self.components.spellcheck.get_or_insert_with(Spellcheck::new)
    }

    pub fn stats(&mut self) -> &mut Stats {
        self.components.stats.get_or_insert_with(Stats::new)
    }

    pub fn more_like_this(&mut self) -> &mut MoreLikeThis {
        self.components.more_like_this.get_or_insert_with(MoreLikeThis::new)
    }

    pub fn debug(&mut self) -> &mut QueryDebug {
        self.components.debug.get_or_insert_with(QueryDebug::new)
    }

    pub fn distributed_search(&mut self) -> &mut DistributedSearch {
        self.components
            .distributed_search
            .get_or_insert_with(DistributedSearch::new)
    }

    pub fn query_elevation(&mut self) -> &mut QueryElevation {
        self.components.query_elevation.get_or_insert_with(QueryElevation::new)
    }

    pub fn rerank_query(&mut self) -> &mut ReRankQuery {
        self.components.rerank_query.get_or_insert_with(ReRankQuery::default)
    }

    pub fn term_vector(&mut self) -> &mut TermVector {
        self.components.term_vector.get_or_insert_with(TermVector::new)
    }

    pub fn dismax(&mut self) -> &mut DisMax {
        self.components.dismax.get_or_insert_with(DisMax::new)
    }

    pub fn edismax(&mut self) -> &mut EDisMax {
        self.components.edismax.get_or_insert_with(EDisMax::new)
    }

    pub fn set_spatial(&mut self, spatial: Spatial) -> &mut Self {
        self.components.spatial = Some(spatial);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Query;

    #[test]
    fn test_defaults() {
        let query = SelectQuery::new();
        assert_eq!(query.query(), "*:*");
        assert_eq!(query.start(), 0);
        assert_eq!(query.rows(), 10);
        assert_eq!(query.fields(), &["*".to_string(), "score".to_string()]);
        assert_eq!(query.handler(), "select");
        assert_eq!(query.options().omit_header, Some(true));
    }

    #[test]
    fn test_filter_query_keys() {
        let mut query = SelectQuery::new();
        query.create_filter_query("a", "x:1").unwrap();
        assert!(matches!(
            query.create_filter_query("a", "x:2"),
            Err(SolriumError::InvalidArgument(_))
        ));
        assert!(query.create_filter_query("", "x:3").is_err());
        query.remove_filter_query("a");
        assert!(query.filter_queries().is_empty());
    }

    #[test]
    fn test_set_query_with_placeholders() {
        let mut query = SelectQuery::new();
        query.set_query_with("cat:%T1% AND name:%P2%", &["a\"b", "big box"]).unwrap();
        assert_eq!(query.query(), "cat:a\\\"b AND name:\"big box\"");
        assert!(query.set_query_with("id:%3%", &["x"]).is_err());
    }

    #[test]
    fn test_sort_replaces_direction() {
        let mut query = SelectQuery::new();
        query.add_sort("price", SortOrder::Asc).add_sort("price", SortOrder::Desc);
        assert_eq!(query.sorts(), &[("price".to_string(), SortOrder::Desc)]);
    }
}
