//! Stats component (`stats=true`).

use serde_json::Value;

use crate::component::{Component, ComponentType, add_field_param};
use crate::document::FieldValue;
use crate::error::{Result, SolriumError};
use crate::query::local_parameters::LocalParameters;
use crate::request::Request;
use crate::util::named_list;

/// A field to compute statistics for.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsField {
    key: String,
    field: String,
    pub local_parameters: LocalParameters,
    facets: Vec<String>,
}

impl StatsField {
    pub fn new<S: Into<String>>(key: S) -> Self {
        let key = key.into();
        StatsField {
            field: key.clone(),
            key,
            local_parameters: LocalParameters::new(),
            facets: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn set_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.field = field.into();
        self
    }

    /// Break the stats down by the values of another field.
    pub fn add_facet<S: Into<String>>(&mut self, facet: S) -> &mut Self {
        self.facets.push(facet.into());
        self
    }

    /// Tag the field so pivot facets can reference it.
    pub fn add_tag<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_tag(tag);
        self
    }

    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_exclude(tag);
        self
    }

    /// Request only selected statistics, e.g. `min`, `max`, `percentiles`.
    pub fn add_statistic<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) -> &mut Self {
        self.local_parameters.set(name, value);
        self
    }
}

/// Stats component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Stats {
    fields: Vec<StatsField>,
    facets: Vec<String>,
}

impl Stats {
    pub fn new() -> Self {
        Stats::default()
    }

    /// Add a stats field; keys are unique.
    pub fn create_field<S: Into<String>>(&mut self, key: S) -> Result<&mut StatsField> {
        let field = StatsField::new(key);
        if field.key.is_empty() {
            return Err(SolriumError::invalid_argument("A stats field must have a key value"));
        }
        if self.fields.iter().any(|f| f.key == field.key) {
            return Err(SolriumError::invalid_argument(format!(
                "A stats field must have a unique key value, '{}' is already in use",
                field.key
            )));
        }
        self.fields.push(field);
        let index = self.fields.len() - 1;
        Ok(&mut self.fields[index])
    }

    pub fn field(&self, key: &str) -> Option<&StatsField> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn fields(&self) -> &[StatsField] {
        &self.fields
    }

    pub fn remove_field(&mut self, key: &str) {
        self.fields.retain(|f| f.key != key);
    }

    /// Facet applied to every stats field.
    pub fn add_facet<S: Into<String>>(&mut self, facet: S) -> &mut Self {
        self.facets.push(facet.into());
        self
    }
}

impl Component for Stats {
    fn component_type(&self) -> ComponentType {
        ComponentType::Stats
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("stats", true);
        for field in &self.fields {
            let mut params = field.local_parameters.clone();
            if field.key != field.field {
                params.set_key(field.key.clone());
            }
            request.add_param("stats.field", params.apply(&field.field));
            for facet in &field.facets {
                add_field_param(request, &field.field, "stats.facet", facet.as_str());
            }
        }
        for facet in &self.facets {
            request.add_param("stats.facet", facet.as_str());
        }
        Ok(())
    }
}

/// Statistics of one field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsFieldResult {
    pub min: Option<FieldValue>,
    pub max: Option<FieldValue>,
    pub sum: Option<FieldValue>,
    pub count: Option<u64>,
    pub missing: Option<u64>,
    pub sum_of_squares: Option<f64>,
    pub mean: Option<FieldValue>,
    pub stddev: Option<f64>,
    pub percentiles: Vec<(String, f64)>,
    pub distinct_values: Vec<FieldValue>,
    pub count_distinct: Option<u64>,
    pub cardinality: Option<u64>,
    /// Facet field → facet value → stats.
    pub facets: Vec<(String, Vec<(String, StatsFieldResult)>)>,
}

impl StatsFieldResult {
    fn parse(value: &Value) -> StatsFieldResult {
        let field_value = |key: &str| {
            named_list::get(value, key)
                .filter(|v| !v.is_null())
                .map(FieldValue::from_json)
        };
        StatsFieldResult {
            min: field_value("min"),
            max: field_value("max"),
            sum: field_value("sum"),
            count: named_list::get_u64(value, "count"),
            missing: named_list::get_u64(value, "missing"),
            sum_of_squares: named_list::get_f64(value, "sumOfSquares"),
            mean: field_value("mean"),
            stddev: named_list::get_f64(value, "stddev"),
            percentiles: named_list::get(value, "percentiles")
                .map(|p| {
                    named_list::entries(p)
                        .into_iter()
                        .filter_map(|(k, v)| named_list::as_f64(v).map(|v| (k, v)))
                        .collect()
                })
                .unwrap_or_default(),
            distinct_values: named_list::get(value, "distinctValues")
                .map(|v| named_list::items(v).into_iter().map(FieldValue::from_json).collect())
                .unwrap_or_default(),
            count_distinct: named_list::get_u64(value, "countDistinct"),
            cardinality: named_list::get_u64(value, "cardinality"),
            facets: named_list::get(value, "facets")
                .map(|facets| {
                    named_list::entries(facets)
                        .into_iter()
                        .map(|(field, values)| {
                            let values = named_list::entries(values)
                                .into_iter()
                                .map(|(value, stats)| (value, StatsFieldResult::parse(stats)))
                                .collect();
                            (field, values)
                        })
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// Stats of all fields, keyed by stats field key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsResult {
    fields: Vec<(String, StatsFieldResult)>,
}

impl StatsResult {
    /// Parse `stats.stats_fields` of a response (or of a pivot item).
    pub fn parse(data: &Value) -> StatsResult {
        let fields = named_list::path(data, &["stats", "stats_fields"])
            .map(|fields| {
                named_list::entries(fields)
                    .into_iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k, StatsFieldResult::parse(v)))
                    .collect()
            })
            .unwrap_or_default();
        StatsResult { fields }
    }

    pub fn field(&self, key: &str) -> Option<&StatsFieldResult> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, r)| r)
    }

    pub fn fields(&self) -> &[(String, StatsFieldResult)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    #[test]
    fn test_build() {
        let mut stats = Stats::new();
        stats.create_field("price").unwrap().add_facet("inStock");
        stats.create_field("pop").unwrap().set_field("popularity").add_tag("piv");
        stats.add_facet("cat");
        assert!(stats.create_field("price").is_err());

        let mut request = Request::new(Method::Get, "select");
        stats.build(&mut request).unwrap();
        assert_eq!(request.param("stats"), Some("true"));
        assert_eq!(
            request.params().get("stats.field").unwrap(),
            &["price".to_string(), "{!tag=piv key=pop}popularity".to_string()]
        );
        assert_eq!(request.param("f.price.stats.facet"), Some("inStock"));
        assert_eq!(request.param("stats.facet"), Some("cat"));
    }

    #[test]
    fn test_parse() {
        let data = json!({"stats": {"stats_fields": {
            "price": {"min": 0.0, "max": 2199.0, "count": 15, "missing": 1, "sum": 5251.27,
                      "mean": 350.08, "stddev": 547.7,
                      "facets": {"inStock": {"true": {"min": 3.0, "count": 10}}}},
            "empty": null
        }}});
        let result = StatsResult::parse(&data);
        let price = result.field("price").unwrap();
        assert_eq!(price.max, Some(FieldValue::Float(2199.0)));
        assert_eq!(price.count, Some(15));
        assert_eq!(price.facets[0].1[0].1.count, Some(10));
        assert!(result.field("empty").is_none());
    }
}
