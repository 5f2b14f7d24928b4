//! Facet results.

use serde_json::Value;

use crate::component::facet_set::{Facet, FacetSet};
use crate::component::stats::StatsResult;
use crate::document::FieldValue;
use crate::util::named_list;

/// Value counts of a field facet or an interval facet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldFacetResult {
    values: Vec<(String, u64)>,
}

impl FieldFacetResult {
    pub fn new(values: Vec<(String, u64)>) -> Self {
        FieldFacetResult { values }
    }

    /// `(value, count)` pairs in response order. The missing bucket has an
    /// empty value.
    pub fn values(&self) -> &[(String, u64)] {
        &self.values
    }

    pub fn count(&self, value: &str) -> Option<u64> {
        self.values.iter().find(|(v, _)| v == value).map(|(_, c)| *c)
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.values.iter().map(|(_, c)| c).sum()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.values.iter().map(|(v, c)| (v.as_str(), *c))
    }
}

/// Range facet counts plus the `before`/`after`/`between` totals.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeFacetResult {
    pub values: FieldFacetResult,
    pub before: Option<u64>,
    pub after: Option<u64>,
    pub between: Option<u64>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub gap: Option<String>,
}

impl RangeFacetResult {
    fn parse(value: &Value) -> Self {
        RangeFacetResult {
            values: FieldFacetResult::new(
                named_list::get(value, "counts")
                    .map(named_list::counts)
                    .unwrap_or_default(),
            ),
            before: named_list::get_u64(value, "before"),
            after: named_list::get_u64(value, "after"),
            between: named_list::get_u64(value, "between"),
            start: named_list::get_string(value, "start"),
            end: named_list::get_string(value, "end"),
            gap: named_list::get_string(value, "gap"),
        }
    }
}

/// One node of a pivot facet tree.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotItem {
    pub field: String,
    pub value: FieldValue,
    pub count: u64,
    pub pivot: Vec<PivotItem>,
    pub stats: StatsResult,
}

impl PivotItem {
    fn parse_list(value: &Value) -> Vec<PivotItem> {
        named_list::items(value)
            .into_iter()
            .map(|item| PivotItem {
                field: named_list::get_string(item, "field").unwrap_or_default(),
                value: named_list::get(item, "value")
                    .map(FieldValue::from_json)
                    .unwrap_or(FieldValue::Null),
                count: named_list::get_u64(item, "count").unwrap_or(0),
                pivot: named_list::get(item, "pivot")
                    .map(PivotItem::parse_list)
                    .unwrap_or_default(),
                stats: StatsResult::parse(item),
            })
            .collect()
    }
}

/// Result of a single facet.
#[derive(Debug, Clone, PartialEq)]
pub enum FacetResult {
    Field(FieldFacetResult),
    Query(u64),
    /// Counts of the sub-queries, keyed by sub-query key.
    MultiQuery(Vec<(String, u64)>),
    Range(RangeFacetResult),
    Pivot(Vec<PivotItem>),
    Interval(FieldFacetResult),
}

impl FacetResult {
    pub fn as_field(&self) -> Option<&FieldFacetResult> {
        match self {
            FacetResult::Field(result) | FacetResult::Interval(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_query(&self) -> Option<u64> {
        match self {
            FacetResult::Query(count) => Some(*count),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&RangeFacetResult> {
        match self {
            FacetResult::Range(result) => Some(result),
            _ => None,
        }
    }

    pub fn as_pivot(&self) -> Option<&[PivotItem]> {
        match self {
            FacetResult::Pivot(items) => Some(items),
            _ => None,
        }
    }
}

/// All facet results of a response, keyed by facet key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FacetSetResult {
    facets: Vec<(String, FacetResult)>,
}

impl FacetSetResult {
    /// Parse `facet_counts`.
    ///
    /// With the query's facet definitions, results are looked up per facet
    /// key (facets missing from the response are skipped). Without them
    /// every section of the response is read.
    pub fn parse(data: &Value, facet_set: Option<&FacetSet>) -> FacetSetResult {
        let Some(counts) = named_list::get(data, "facet_counts") else {
            return FacetSetResult::default();
        };
        let section = |name: &str| named_list::get(counts, name);
        let lookup = |name: &str, key: &str| section(name).and_then(|s| named_list::get(s, key));

        let mut facets = Vec::new();
        match facet_set {
            Some(facet_set) => {
                for facet in facet_set.facets() {
                    let key = facet.key();
                    let result = match facet {
                        Facet::Field(_) => lookup("facet_fields", key)
                            .map(|v| FacetResult::Field(FieldFacetResult::new(named_list::counts(v)))),
                        Facet::Query(q) => lookup("facet_queries", key)
                            .or_else(|| lookup("facet_queries", q.query()))
                            .map(|v| FacetResult::Query(named_list::as_u64(v).unwrap_or(0))),
                        Facet::MultiQuery(mq) => Some(FacetResult::MultiQuery(
                            mq.queries()
                                .iter()
                                .filter_map(|q| {
                                    lookup("facet_queries", q.key())
                                        .map(|v| (q.key().to_string(), named_list::as_u64(v).unwrap_or(0)))
                                })
                                .collect(),
                        )),
                        Facet::Range(_) => {
                            lookup("facet_ranges", key).map(|v| FacetResult::Range(RangeFacetResult::parse(v)))
                        }
                        Facet::Pivot(p) => lookup("facet_pivot", key)
                            .or_else(|| lookup("facet_pivot", &p.fields().join(",")))
                            .map(|v| FacetResult::Pivot(PivotItem::parse_list(v))),
                        Facet::Interval(_) => lookup("facet_intervals", key)
                            .map(|v| FacetResult::Interval(FieldFacetResult::new(named_list::counts(v)))),
                    };
                    if let Some(result) = result {
                        facets.push((key.to_string(), result));
                    }
                }
            }
            None => {
                let mut read = |name: &str, f: &dyn Fn(&Value) -> FacetResult| {
                    if let Some(section) = section(name) {
                        for (key, value) in named_list::entries(section) {
                            facets.push((key, f(value)));
                        }
                    }
                };
                read("facet_queries", &|v| FacetResult::Query(named_list::as_u64(v).unwrap_or(0)));
                read("facet_fields", &|v| FacetResult::Field(FieldFacetResult::new(named_list::counts(v))));
                read("facet_ranges", &|v| FacetResult::Range(RangeFacetResult::parse(v)));
                read("facet_pivot", &|v| FacetResult::Pivot(PivotItem::parse_list(v)));
                read("facet_intervals", &|v| {
                    FacetResult::Interval(FieldFacetResult::new(named_list::counts(v)))
                });
            }
        }
        FacetSetResult { facets }
    }

    pub fn facet(&self, key: &str) -> Option<&FacetResult> {
        self.facets.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn facets(&self) -> &[(String, FacetResult)] {
        &self.facets
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}
