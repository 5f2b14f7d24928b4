//! Select query components.
//!
//! A component is an optional part of a select-like query: faceting,
//! highlighting, grouping and so on. Each component type can be present at
//! most once per query; [`Components`] holds one typed slot per kind.
//! Components add their parameters to the request in a fixed order and, for
//! those that produce output, parse their own section of the response into
//! a result that defaults to empty when the section is absent.

pub mod debug;
pub mod dismax;
pub mod distributed_search;
pub mod facet_set;
pub mod grouping;
pub mod highlighting;
pub mod more_like_this;
pub mod query_elevation;
pub mod rerank_query;
pub mod spatial;
pub mod spellcheck;
pub mod stats;
pub mod term_vector;

use std::fmt;

use serde_json::Value;

use crate::error::Result;
use crate::request::Request;

pub use debug::{DebugResult, QueryDebug};
pub use dismax::{BoostQuery, DisMax, EDisMax};
pub use distributed_search::DistributedSearch;
pub use facet_set::{FacetSet, FacetSetResult};
pub use grouping::{Grouping, GroupingResult};
pub use highlighting::{Highlighting, HighlightingResult};
pub use more_like_this::{MoreLikeThis, MoreLikeThisOptions, MoreLikeThisResult};
pub use query_elevation::QueryElevation;
pub use rerank_query::ReRankQuery;
pub use spatial::Spatial;
pub use spellcheck::{Spellcheck, SpellcheckResult};
pub use stats::{Stats, StatsResult};
pub use term_vector::{TermVector, TermVectorResult};

/// Kinds of select components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    FacetSet,
    Highlighting,
    Grouping,
    Spellcheck,
    Stats,
    MoreLikeThis,
    Debug,
    DistributedSearch,
    QueryElevation,
    ReRankQuery,
    TermVector,
    DisMax,
    EDisMax,
    Spatial,
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ComponentType::FacetSet => "facetset",
            ComponentType::Highlighting => "highlighting",
            ComponentType::Grouping => "grouping",
            ComponentType::Spellcheck => "spellcheck",
            ComponentType::Stats => "stats",
            ComponentType::MoreLikeThis => "morelikethis",
            ComponentType::Debug => "debug",
            ComponentType::DistributedSearch => "distributedsearch",
            ComponentType::QueryElevation => "queryelevation",
            ComponentType::ReRankQuery => "rerankquery",
            ComponentType::TermVector => "termvector",
            ComponentType::DisMax => "dismax",
            ComponentType::EDisMax => "edismax",
            ComponentType::Spatial => "spatial",
        };
        f.write_str(name)
    }
}

/// A select component that contributes request parameters.
pub trait Component: fmt::Debug + Send + Sync {
    fn component_type(&self) -> ComponentType;

    /// Add the component's parameters to the request.
    fn build(&self, request: &mut Request) -> Result<()>;
}

/// The component slots of a select query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Components {
    pub facet_set: Option<FacetSet>,
    pub highlighting: Option<Highlighting>,
    pub grouping: Option<Grouping>,
    pub spellcheck: Option<Spellcheck>,
    pub stats: Option<Stats>,
    pub more_like_this: Option<MoreLikeThis>,
    pub debug: Option<QueryDebug>,
    pub distributed_search: Option<DistributedSearch>,
    pub query_elevation: Option<QueryElevation>,
    pub rerank_query: Option<ReRankQuery>,
    pub term_vector: Option<TermVector>,
    pub dismax: Option<DisMax>,
    pub edismax: Option<EDisMax>,
    pub spatial: Option<Spatial>,
}

impl Components {
    /// The components that are set, in build order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Component> {
        let slots: [Option<&dyn Component>; 14] = [
            self.facet_set.as_ref().map(|c| c as &dyn Component),
            self.highlighting.as_ref().map(|c| c as &dyn Component),
            self.grouping.as_ref().map(|c| c as &dyn Component),
            self.spellcheck.as_ref().map(|c| c as &dyn Component),
            self.stats.as_ref().map(|c| c as &dyn Component),
            self.more_like_this.as_ref().map(|c| c as &dyn Component),
            self.debug.as_ref().map(|c| c as &dyn Component),
            self.distributed_search.as_ref().map(|c| c as &dyn Component),
            self.query_elevation.as_ref().map(|c| c as &dyn Component),
            self.rerank_query.as_ref().map(|c| c as &dyn Component),
            self.term_vector.as_ref().map(|c| c as &dyn Component),
            self.dismax.as_ref().map(|c| c as &dyn Component),
            self.edismax.as_ref().map(|c| c as &dyn Component),
            self.spatial.as_ref().map(|c| c as &dyn Component),
        ];
        slots.into_iter().flatten()
    }

    pub fn has(&self, component_type: ComponentType) -> bool {
        self.iter().any(|c| c.component_type() == component_type)
    }

    pub fn remove(&mut self, component_type: ComponentType) {
        match component_type {
            ComponentType::FacetSet => self.facet_set = None,
            ComponentType::Highlighting => self.highlighting = None,
            ComponentType::Grouping => self.grouping = None,
            ComponentType::Spellcheck => self.spellcheck = None,
            ComponentType::Stats => self.stats = None,
            ComponentType::MoreLikeThis => self.more_like_this = None,
            ComponentType::Debug => self.debug = None,
            ComponentType::DistributedSearch => self.distributed_search = None,
            ComponentType::QueryElevation => self.query_elevation = None,
            ComponentType::ReRankQuery => self.rerank_query = None,
            ComponentType::TermVector => self.term_vector = None,
            ComponentType::DisMax => self.dismax = None,
            ComponentType::EDisMax => self.edismax = None,
            ComponentType::Spatial => self.spatial = None,
        }
    }

    /// Add the parameters of every set component.
    pub fn build(&self, request: &mut Request) -> Result<()> {
        for component in self.iter() {
            component.build(request)?;
        }
        Ok(())
    }
}

/// Parsed output of the components of a select response.
///
/// Every result is present; sections missing from the response parse as
/// empty results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComponentResults {
    pub facet_set: FacetSetResult,
    pub highlighting: HighlightingResult,
    pub grouping: GroupingResult,
    pub spellcheck: SpellcheckResult,
    pub stats: StatsResult,
    pub more_like_this: MoreLikeThisResult,
    pub debug: DebugResult,
    pub term_vector: TermVectorResult,
}

impl ComponentResults {
    /// Parse every component section of decoded response data.
    pub fn parse(data: &Value, components: &Components) -> ComponentResults {
        ComponentResults {
            facet_set: FacetSetResult::parse(data, components.facet_set.as_ref()),
            highlighting: HighlightingResult::parse(data),
            grouping: GroupingResult::parse(data),
            spellcheck: SpellcheckResult::parse(data),
            stats: StatsResult::parse(data),
            more_like_this: MoreLikeThisResult::parse(data),
            debug: DebugResult::parse(data),
            term_vector: TermVectorResult::parse(data),
        }
    }
}

/// Add `f.<field>.<name>` when the value is set.
pub(crate) fn add_field_param<V: crate::request::ParamValue>(
    request: &mut Request,
    field: &str,
    name: &str,
    value: V,
) {
    request.add_param(format!("f.{field}.{name}"), value);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_components_build_in_order() {
        let mut components = Components::default();
        components.debug = Some(QueryDebug::new());
        components.spatial = Some(Spatial::new("store", "45.15,-93.85", 5.0));
        assert!(components.has(ComponentType::Debug));
        assert!(!components.has(ComponentType::FacetSet));

        let mut request = Request::new(Method::Get, "select");
        components.build(&mut request).unwrap();
        assert_eq!(request.param("debugQuery"), Some("true"));
        assert_eq!(request.param("sfield"), Some("store"));

        components.remove(ComponentType::Debug);
        assert!(!components.has(ComponentType::Debug));
    }

    #[test]
    fn test_absent_sections_parse_empty() {
        let results = ComponentResults::parse(&serde_json::json!({}), &Components::default());
        assert!(results.facet_set.is_empty());
        assert!(results.highlighting.is_empty());
        assert!(results.grouping.is_empty());
        assert!(results.stats.is_empty());
    }
}
