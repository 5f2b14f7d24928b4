//! Faceting component.
//!
//! A [`FacetSet`] holds global facet options and any number of uniquely
//! keyed facets. Global options are sent as `facet.*`, per-field options
//! as `f.<field>.facet.*`.
//!
//! ```
//! use solrium::component::FacetSet;
//!
//! let mut facets = FacetSet::new();
//! facets.set_mincount(1);
//! facets.create_facet_field("category").unwrap().set_field("cat").set_limit(5);
//! facets.create_facet_query("cheap", "price:[* TO 10]").unwrap();
//! assert!(facets.create_facet_query("cheap", "price:[* TO 5]").is_err());
//! ```

pub mod facet;
pub mod result;

use crate::component::{Component, ComponentType};
use crate::error::{Result, SolriumError};
use crate::request::Request;

pub use facet::{
    Facet, FacetField, FacetInterval, FacetMultiQuery, FacetPivot, FacetQuery, FacetRange, FacetType,
};
pub use result::{
    FacetResult, FacetSetResult, FieldFacetResult, PivotItem, RangeFacetResult,
};

/// Facet component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetSet {
    facets: Vec<Facet>,
    pub prefix: Option<String>,
    pub contains: Option<String>,
    pub contains_ignore_case: Option<bool>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub mincount: Option<u64>,
    pub missing: Option<bool>,
    pub method: Option<String>,
    pub offset: Option<u64>,
    pub pivot_mincount: Option<u64>,
}

macro_rules! create_facet {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub fn $name<S: Into<String>>(&mut self, key: S) -> Result<&mut $ty> {
            self.add_facet(Facet::$variant(<$ty>::new(key)))?;
            match self.facets.last_mut() {
                Some(Facet::$variant(facet)) => Ok(facet),
                _ => Err(SolriumError::invalid_operation("facet was not added")),
            }
        }
    };
}

impl FacetSet {
    pub fn new() -> Self {
        FacetSet::default()
    }

    /// Add a facet; its key must be non-empty and unique in the set.
    pub fn add_facet(&mut self, facet: Facet) -> Result<()> {
        let key = facet.key();
        if key.is_empty() {
            return Err(SolriumError::invalid_argument("A facet must have a key value"));
        }
        if self.facet(key).is_some() {
            return Err(SolriumError::invalid_argument(format!(
                "A facet must have a unique key value within a query, '{key}' is already in use"
            )));
        }
        self.facets.push(facet);
        Ok(())
    }

    create_facet!(create_facet_field, Field, FacetField);
    create_facet!(create_facet_multi_query, MultiQuery, FacetMultiQuery);
    create_facet!(create_facet_range, Range, FacetRange);
    create_facet!(create_facet_pivot, Pivot, FacetPivot);
    create_facet!(create_facet_interval, Interval, FacetInterval);

    pub fn create_facet_query<K: Into<String>, Q: Into<String>>(
        &mut self,
        key: K,
        query: Q,
    ) -> Result<&mut FacetQuery> {
        self.add_facet(Facet::Query(FacetQuery::new(key, query)))?;
        match self.facets.last_mut() {
            Some(Facet::Query(facet)) => Ok(facet),
            _ => Err(SolriumError::invalid_operation("facet was not added")),
        }
    }

    pub fn facet(&self, key: &str) -> Option<&Facet> {
        self.facets.iter().find(|f| f.key() == key)
    }

    pub fn facets(&self) -> &[Facet] {
        &self.facets
    }

    pub fn remove_facet(&mut self, key: &str) {
        self.facets.retain(|f| f.key() != key);
    }

    pub fn clear_facets(&mut self) {
        self.facets.clear();
    }

    pub fn set_prefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn set_contains<S: Into<String>>(&mut self, contains: S, ignore_case: bool) -> &mut Self {
        self.contains = Some(contains.into());
        self.contains_ignore_case = Some(ignore_case);
        self
    }

    pub fn set_sort<S: Into<String>>(&mut self, sort: S) -> &mut Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_mincount(&mut self, mincount: u64) -> &mut Self {
        self.mincount = Some(mincount);
        self
    }

    pub fn set_missing(&mut self, missing: bool) -> &mut Self {
        self.missing = Some(missing);
        self
    }

    pub fn set_method<S: Into<String>>(&mut self, method: S) -> &mut Self {
        self.method = Some(method.into());
        self
    }

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn set_pivot_mincount(&mut self, mincount: u64) -> &mut Self {
        self.pivot_mincount = Some(mincount);
        self
    }
}

impl Component for FacetSet {
    fn component_type(&self) -> ComponentType {
        ComponentType::FacetSet
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("facet", true);
        request.add_param("facet.prefix", self.prefix.as_deref());
        request.add_param("facet.contains", self.contains.as_deref());
        request.add_param("facet.contains.ignoreCase", self.contains_ignore_case);
        request.add_param("facet.sort", self.sort.as_deref());
        request.add_param("facet.limit", self.limit);
        request.add_param("facet.mincount", self.mincount);
        request.add_param("facet.missing", self.missing);
        request.add_param("facet.method", self.method.as_deref());
        request.add_param("facet.offset", self.offset);
        request.add_param("facet.pivot.mincount", self.pivot_mincount);
        for facet in &self.facets {
            facet.build(request)?;
        }
        Ok(())
    }
}
