//! Facet definitions.

use crate::component::add_field_param;
use crate::error::{Result, SolriumError};
use crate::query::local_parameters::LocalParameters;
use crate::request::Request;

/// Kinds of facets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FacetType {
    Field,
    Query,
    MultiQuery,
    Range,
    Pivot,
    Interval,
}

/// A facet of a [`super::FacetSet`], identified by a unique key.
#[derive(Debug, Clone, PartialEq)]
pub enum Facet {
    Field(FacetField),
    Query(FacetQuery),
    MultiQuery(FacetMultiQuery),
    Range(FacetRange),
    Pivot(FacetPivot),
    Interval(FacetInterval),
}

impl Facet {
    pub fn key(&self) -> &str {
        match self {
            Facet::Field(f) => &f.key,
            Facet::Query(f) => &f.key,
            Facet::MultiQuery(f) => &f.key,
            Facet::Range(f) => &f.key,
            Facet::Pivot(f) => &f.key,
            Facet::Interval(f) => &f.key,
        }
    }

    pub fn facet_type(&self) -> FacetType {
        match self {
            Facet::Field(_) => FacetType::Field,
            Facet::Query(_) => FacetType::Query,
            Facet::MultiQuery(_) => FacetType::MultiQuery,
            Facet::Range(_) => FacetType::Range,
            Facet::Pivot(_) => FacetType::Pivot,
            Facet::Interval(_) => FacetType::Interval,
        }
    }

    pub(crate) fn build(&self, request: &mut Request) -> Result<()> {
        match self {
            Facet::Field(f) => f.build(request),
            Facet::Query(f) => f.build(request),
            Facet::MultiQuery(f) => f.build(request),
            Facet::Range(f) => f.build(request),
            Facet::Pivot(f) => f.build(request),
            Facet::Interval(f) => f.build(request),
        }
    }
}

/// Local params with `key` (unless it equals the rendered value) and excludes.
fn local_params(base: &LocalParameters, key: &str, value: &str) -> LocalParameters {
    let mut params = base.clone();
    if key != value {
        params.set_key(key);
    }
    params
}

/// Value counts of a field (`facet.field`).
#[derive(Debug, Clone, PartialEq)]
pub struct FacetField {
    key: String,
    field: String,
    pub local_parameters: LocalParameters,
    pub prefix: Option<String>,
    pub contains: Option<String>,
    pub contains_ignore_case: Option<bool>,
    pub matches: Option<String>,
    pub sort: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<u64>,
    pub mincount: Option<u64>,
    pub missing: Option<bool>,
    pub method: Option<String>,
    pub enum_cache_min_df: Option<u64>,
    pub exists: Option<bool>,
    pub exclude_terms: Vec<String>,
    pub threads: Option<i64>,
}

impl FacetField {
    /// Facet on the field named like the key.
    pub fn new<S: Into<String>>(key: S) -> Self {
        let key = key.into();
        FacetField {
            field: key.clone(),
            key,
            local_parameters: LocalParameters::new(),
            prefix: None,
            contains: None,
            contains_ignore_case: None,
            matches: None,
            sort: None,
            limit: None,
            offset: None,
            mincount: None,
            missing: None,
            method: None,
            enum_cache_min_df: None,
            exists: None,
            exclude_terms: Vec::new(),
            threads: None,
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

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.offset = Some(offset);
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

    /// Exclude filter queries with the given tag.
    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_exclude(tag);
        self
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        let field = self.field.as_str();
        let params = local_params(&self.local_parameters, &self.key, field);
        request.add_param("facet.field", params.apply(field));
        add_field_param(request, field, "facet.prefix", self.prefix.as_deref());
        add_field_param(request, field, "facet.contains", self.contains.as_deref());
        add_field_param(request, field, "facet.contains.ignoreCase", self.contains_ignore_case);
        add_field_param(request, field, "facet.matches", self.matches.as_deref());
        add_field_param(request, field, "facet.sort", self.sort.as_deref());
        add_field_param(request, field, "facet.limit", self.limit);
        add_field_param(request, field, "facet.offset", self.offset);
        add_field_param(request, field, "facet.mincount", self.mincount);
        add_field_param(request, field, "facet.missing", self.missing);
        add_field_param(request, field, "facet.method", self.method.as_deref());
        add_field_param(request, field, "facet.enum.cache.minDf", self.enum_cache_min_df);
        add_field_param(request, field, "facet.exists", self.exists);
        if !self.exclude_terms.is_empty() {
            add_field_param(request, field, "facet.excludeTerms", self.exclude_terms.join(","));
        }
        add_field_param(request, field, "facet.threads", self.threads);
        Ok(())
    }
}

/// Count of documents matching a query (`facet.query`).
#[derive(Debug, Clone, PartialEq)]
pub struct FacetQuery {
    key: String,
    query: String,
    pub local_parameters: LocalParameters,
}

impl FacetQuery {
    pub fn new<K: Into<String>, Q: Into<String>>(key: K, query: Q) -> Self {
        FacetQuery {
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

    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_exclude(tag);
        self
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        let params = local_params(&self.local_parameters, &self.key, &self.query);
        request.add_param("facet.query", params.apply(&self.query));
        Ok(())
    }
}

/// A group of facet queries reported together.
#[derive(Debug, Clone, PartialEq)]
pub struct FacetMultiQuery {
    key: String,
    queries: Vec<FacetQuery>,
    excludes: Vec<String>,
}

impl FacetMultiQuery {
    pub fn new<S: Into<String>>(key: S) -> Self {
        FacetMultiQuery {
            key: key.into(),
            queries: Vec::new(),
            excludes: Vec::new(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Add a sub-query; sub-query keys are unique within the facet.
    pub fn create_query<K: Into<String>, Q: Into<String>>(&mut self, key: K, query: Q) -> Result<&mut Self> {
        let key = key.into();
        if key.is_empty() {
            return Err(SolriumError::invalid_argument("A facet query must have a key"));
        }
        if self.queries.iter().any(|q| q.key == key) {
            return Err(SolriumError::invalid_argument(format!(
                "A query must have a unique key value within a multiquery facet, '{key}' is already in use"
            )));
        }
        let mut facet_query = FacetQuery::new(key, query);
        for tag in &self.excludes {
            facet_query.add_exclude(tag.clone());
        }
        self.queries.push(facet_query);
        Ok(self)
    }

    pub fn queries(&self) -> &[FacetQuery] {
        &self.queries
    }

    pub fn remove_query(&mut self, key: &str) {
        self.queries.retain(|q| q.key != key);
    }

    /// Exclude a tag for all current and future sub-queries.
    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        let tag = tag.into();
        for query in &mut self.queries {
            query.add_exclude(tag.clone());
        }
        self.excludes.push(tag);
        self
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        for query in &self.queries {
            query.build(request)?;
        }
        Ok(())
    }
}

/// Counts over ranges of a field (`facet.range`).
#[derive(Debug, Clone, PartialEq)]
pub struct FacetRange {
    key: String,
    field: String,
    pub local_parameters: LocalParameters,
    pub start: Option<String>,
    pub end: Option<String>,
    pub gap: Option<String>,
    pub hardend: Option<bool>,
    pub other: Vec<String>,
    pub include: Vec<String>,
    pub mincount: Option<u64>,
    pub method: Option<String>,
}

impl FacetRange {
    pub fn new<S: Into<String>>(key: S) -> Self {
        let key = key.into();
        FacetRange {
            field: key.clone(),
            key,
            local_parameters: LocalParameters::new(),
            start: None,
            end: None,
            gap: None,
            hardend: None,
            other: Vec::new(),
            include: Vec::new(),
            mincount: None,
            method: None,
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

    /// Set start, end and gap in one call.
    pub fn set_range<S: Into<String>, E: Into<String>, G: Into<String>>(
        &mut self,
        start: S,
        end: E,
        gap: G,
    ) -> &mut Self {
        self.start = Some(start.into());
        self.end = Some(end.into());
        self.gap = Some(gap.into());
        self
    }

    pub fn set_hardend(&mut self, hardend: bool) -> &mut Self {
        self.hardend = Some(hardend);
        self
    }

    /// `before`, `after`, `between`, `all` or `none`.
    pub fn add_other<S: Into<String>>(&mut self, other: S) -> &mut Self {
        self.other.push(other.into());
        self
    }

    /// `lower`, `upper`, `edge`, `outer` or `all`.
    pub fn add_include<S: Into<String>>(&mut self, include: S) -> &mut Self {
        self.include.push(include.into());
        self
    }

    pub fn set_mincount(&mut self, mincount: u64) -> &mut Self {
        self.mincount = Some(mincount);
        self
    }

    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_exclude(tag);
        self
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        let field = self.field.as_str();
        let params = local_params(&self.local_parameters, &self.key, field);
        request.add_param("facet.range", params.apply(field));
        add_field_param(request, field, "facet.range.start", self.start.as_deref());
        add_field_param(request, field, "facet.range.end", self.end.as_deref());
        add_field_param(request, field, "facet.range.gap", self.gap.as_deref());
        add_field_param(request, field, "facet.range.hardend", self.hardend);
        for other in &self.other {
            add_field_param(request, field, "facet.range.other", other.as_str());
        }
        for include in &self.include {
            add_field_param(request, field, "facet.range.include", include.as_str());
        }
        add_field_param(request, field, "facet.mincount", self.mincount);
        add_field_param(request, field, "facet.range.method", self.method.as_deref());
        Ok(())
    }
}

/// Hierarchical counts over several fields (`facet.pivot`).
#[derive(Debug, Clone, PartialEq)]
pub struct FacetPivot {
    key: String,
    fields: Vec<String>,
    pub local_parameters: LocalParameters,
    pub mincount: Option<u64>,
    pub limit: Option<i64>,
    pub offset: Option<u64>,
    pub sort: Option<String>,
}

impl FacetPivot {
    pub fn new<S: Into<String>>(key: S) -> Self {
        FacetPivot {
            key: key.into(),
            fields: Vec::new(),
            local_parameters: LocalParameters::new(),
            mincount: None,
            limit: None,
            offset: None,
            sort: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn add_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    /// Add fields from a comma separated list.
    pub fn add_fields(&mut self, fields: &str) -> &mut Self {
        for field in fields.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            self.fields.push(field.to_string());
        }
        self
    }

    pub fn set_mincount(&mut self, mincount: u64) -> &mut Self {
        self.mincount = Some(mincount);
        self
    }

    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    /// Compute stats for the stats fields tagged `tag` on every pivot.
    pub fn add_stats<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add("stats", tag);
        self
    }

    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_exclude(tag);
        self
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        if self.fields.is_empty() {
            return Err(SolriumError::invalid_argument(format!(
                "Pivot facet '{}' has no fields",
                self.key
            )));
        }
        let fields = self.fields.join(",");
        let params = local_params(&self.local_parameters, &self.key, &fields);
        request.add_param("facet.pivot", params.apply(&fields));
        if let Some(mincount) = self.mincount {
            request.set_param("facet.pivot.mincount", mincount);
        }
        for field in &self.fields {
            add_field_param(request, field, "facet.limit", self.limit);
            add_field_param(request, field, "facet.offset", self.offset);
            add_field_param(request, field, "facet.sort", self.sort.as_deref());
        }
        Ok(())
    }
}

/// Counts over arbitrary intervals of a field (`facet.interval`).
#[derive(Debug, Clone, PartialEq)]
pub struct FacetInterval {
    key: String,
    field: String,
    pub local_parameters: LocalParameters,
    set: Vec<(Option<String>, String)>,
}

impl FacetInterval {
    pub fn new<S: Into<String>>(key: S) -> Self {
        let key = key.into();
        FacetInterval {
            field: key.clone(),
            key,
            local_parameters: LocalParameters::new(),
            set: Vec::new(),
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

    /// Add an interval such as `[0,10)`, optionally under an output key.
    pub fn add_interval<S: Into<String>>(&mut self, key: Option<&str>, interval: S) -> &mut Self {
        self.set.push((key.map(str::to_string), interval.into()));
        self
    }

    pub fn intervals(&self) -> &[(Option<String>, String)] {
        &self.set
    }

    pub fn add_exclude<S: Into<String>>(&mut self, tag: S) -> &mut Self {
        self.local_parameters.add_exclude(tag);
        self
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        let field = self.field.as_str();
        let params = local_params(&self.local_parameters, &self.key, field);
        request.add_param("facet.interval", params.apply(field));
        for (key, interval) in &self.set {
            let value = match key {
                Some(key) => {
                    let mut params = LocalParameters::new();
                    params.set_key(key.clone());
                    params.apply(interval)
                }
                None => interval.clone(),
            };
            add_field_param(request, field, "facet.interval.set", value);
        }
        Ok(())
    }
}
