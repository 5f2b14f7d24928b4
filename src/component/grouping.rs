//! Result grouping component (`group=true`).

use serde_json::Value;

use crate::component::{Component, ComponentType};
use crate::document::FieldValue;
use crate::error::Result;
use crate::query::select::DocumentList;
use crate::request::Request;
use crate::util::named_list;

/// Output format of grouped results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupFormat {
    Grouped,
    Simple,
}

impl GroupFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            GroupFormat::Grouped => "grouped",
            GroupFormat::Simple => "simple",
        }
    }
}

/// Grouping component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouping {
    fields: Vec<String>,
    queries: Vec<String>,
    pub function: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub sort: Option<String>,
    pub main_result: Option<bool>,
    pub number_of_groups: Option<bool>,
    pub truncate: Option<bool>,
    pub facet: Option<bool>,
    pub format: Option<GroupFormat>,
    pub cache_percentage: Option<u32>,
}

impl Grouping {
    pub fn new() -> Self {
        Grouping::default()
    }

    pub fn add_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn add_query<S: Into<String>>(&mut self, query: S) -> &mut Self {
        self.queries.push(query.into());
        self
    }

    pub fn queries(&self) -> &[String] {
        &self.queries
    }

    pub fn set_function<S: Into<String>>(&mut self, function: S) -> &mut Self {
        self.function = Some(function.into());
        self
    }

    pub fn set_limit(&mut self, limit: u32) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_offset(&mut self, offset: u32) -> &mut Self {
        self.offset = Some(offset);
        self
    }

    pub fn set_sort<S: Into<String>>(&mut self, sort: S) -> &mut Self {
        self.sort = Some(sort.into());
        self
    }

    pub fn set_main_result(&mut self, main: bool) -> &mut Self {
        self.main_result = Some(main);
        self
    }

    /// Include the number of groups per field (`group.ngroups`).
    pub fn set_number_of_groups(&mut self, ngroups: bool) -> &mut Self {
        self.number_of_groups = Some(ngroups);
        self
    }

    pub fn set_truncate(&mut self, truncate: bool) -> &mut Self {
        self.truncate = Some(truncate);
        self
    }

    pub fn set_facet(&mut self, facet: bool) -> &mut Self {
        self.facet = Some(facet);
        self
    }

    pub fn set_format(&mut self, format: GroupFormat) -> &mut Self {
        self.format = Some(format);
        self
    }

    pub fn set_cache_percentage(&mut self, percentage: u32) -> &mut Self {
        self.cache_percentage = Some(percentage);
        self
    }
}

impl Component for Grouping {
    fn component_type(&self) -> ComponentType {
        ComponentType::Grouping
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("group", true);
        request.params_mut().add_all("group.field", &self.fields);
        request.params_mut().add_all("group.query", &self.queries);
        request.set_param("group.func", self.function.as_deref());
        request.set_param("group.limit", self.limit);
        request.set_param("group.offset", self.offset);
        request.set_param("group.sort", self.sort.as_deref());
        request.set_param("group.main", self.main_result);
        request.set_param("group.ngroups", self.number_of_groups);
        request.set_param("group.truncate", self.truncate);
        request.set_param("group.facet", self.facet);
        request.set_param("group.format", self.format.map(|f| f.as_str()));
        request.set_param("group.cache.percent", self.cache_percentage);
        Ok(())
    }
}

/// Documents sharing one value of the group field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueGroup {
    pub value: FieldValue,
    pub documents: DocumentList,
}

/// Groups of a `group.field`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldGroup {
    pub matches: u64,
    pub number_of_groups: Option<u64>,
    pub groups: Vec<ValueGroup>,
}

/// Result of a `group.query`, also used for the simple format.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryGroup {
    pub matches: u64,
    pub documents: DocumentList,
}

/// One entry of the `grouped` section.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupResult {
    Field(FieldGroup),
    Query(QueryGroup),
}

impl GroupResult {
    pub fn as_field(&self) -> Option<&FieldGroup> {
        match self {
            GroupResult::Field(group) => Some(group),
            GroupResult::Query(_) => None,
        }
    }

    pub fn as_query(&self) -> Option<&QueryGroup> {
        match self {
            GroupResult::Query(group) => Some(group),
            GroupResult::Field(_) => None,
        }
    }
}

/// Parsed `grouped` section, keyed by field, function or query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupingResult {
    groups: Vec<(String, GroupResult)>,
}

impl GroupingResult {
    pub fn parse(data: &Value) -> GroupingResult {
        let Some(grouped) = named_list::get(data, "grouped") else {
            return GroupingResult::default();
        };
        let groups = named_list::entries(grouped)
            .into_iter()
            .map(|(key, value)| {
                let matches = named_list::get_u64(value, "matches").unwrap_or(0);
                let result = match named_list::get(value, "groups") {
                    Some(groups) => GroupResult::Field(FieldGroup {
                        matches,
                        number_of_groups: named_list::get_u64(value, "ngroups"),
                        groups: named_list::items(groups)
                            .into_iter()
                            .map(|group| ValueGroup {
                                value: named_list::get(group, "groupValue")
                                    .map(FieldValue::from_json)
                                    .unwrap_or(FieldValue::Null),
                                documents: named_list::get(group, "doclist")
                                    .map(DocumentList::parse)
                                    .unwrap_or_default(),
                            })
                            .collect(),
                    }),
                    None => GroupResult::Query(QueryGroup {
                        matches,
                        documents: named_list::get(value, "doclist")
                            .map(DocumentList::parse)
                            .unwrap_or_default(),
                    }),
                };
                (key, result)
            })
            .collect();
        GroupingResult { groups }
    }

    pub fn group(&self, key: &str) -> Option<&GroupResult> {
        self.groups.iter().find(|(k, _)| k == key).map(|(_, g)| g)
    }

    pub fn groups(&self) -> &[(String, GroupResult)] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;
    use serde_json::json;

    #[test]
    fn test_build() {
        let mut grouping = Grouping::new();
        grouping
            .add_field("manu_exact")
            .add_query("price:[0 TO 99.99]")
            .add_query("price:[100 TO *]")
            .set_limit(3)
            .set_number_of_groups(true)
            .set_format(GroupFormat::Simple);

        let mut request = Request::new(Method::Get, "select");
        grouping.build(&mut request).unwrap();
        assert_eq!(request.param("group"), Some("true"));
        assert_eq!(request.param("group.field"), Some("manu_exact"));
        assert_eq!(request.params().get("group.query").unwrap().len(), 2);
        assert_eq!(request.param("group.limit"), Some("3"));
        assert_eq!(request.param("group.format"), Some("simple"));
        assert!(request.param("group.main").is_none());
    }

    #[test]
    fn test_parse_field_and_query_groups() {
        let data = json!({"grouped": {
            "manu_exact": {"matches": 14, "ngroups": 2, "groups": [
                {"groupValue": "Belkin", "doclist": {"numFound": 2, "start": 0, "docs": [{"id": "F8V7067"}]}},
                {"groupValue": null, "doclist": {"numFound": 1, "start": 0, "docs": [{"id": "x"}]}}
            ]},
            "price:[0 TO 99.99]": {"matches": 14, "doclist": {"numFound": 5, "start": 0, "docs": []}}
        }});
        let result = GroupingResult::parse(&data);
        assert_eq!(result.len(), 2);

        let field = result.group("manu_exact").and_then(|g| g.as_field()).unwrap();
        assert_eq!(field.number_of_groups, Some(2));
        assert_eq!(field.groups[0].value, FieldValue::Str("Belkin".into()));
        assert_eq!(field.groups[0].documents.num_found, 2);
        assert!(field.groups[1].value.is_null());

        let query = result.group("price:[0 TO 99.99]").and_then(|g| g.as_query()).unwrap();
        assert_eq!(query.documents.num_found, 5);
        assert!(query.documents.documents.is_empty());
    }
}
