//! Terms query: indexed terms of fields with their document frequencies.

use serde_json::Value;

use crate::error::Result;
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::util::named_list;

/// `terms.sort`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermsSort {
    Count,
    Index,
}

impl TermsSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            TermsSort::Count => "count",
            TermsSort::Index => "index",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TermsQuery {
    options: QueryOptions,
    fields: Vec<String>,
    lower_bound: Option<String>,
    lower_bound_inclusive: Option<bool>,
    upper_bound: Option<String>,
    upper_bound_inclusive: Option<bool>,
    min_count: Option<u64>,
    max_count: Option<u64>,
    prefix: Option<String>,
    regex: Option<String>,
    regex_flags: Vec<String>,
    limit: Option<i64>,
    raw: Option<bool>,
    sort: Option<TermsSort>,
}

impl_query!(TermsQuery, QueryType::Terms);

impl Default for TermsQuery {
    fn default() -> Self {
        TermsQuery {
            options: QueryOptions::new("terms").with_omit_header(true),
            fields: Vec::new(),
            lower_bound: None,
            lower_bound_inclusive: None,
            upper_bound: None,
            upper_bound_inclusive: None,
            min_count: None,
            max_count: None,
            prefix: None,
            regex: None,
            regex_flags: Vec::new(),
            limit: None,
            raw: None,
            sort: None,
        }
    }
}

impl TermsQuery {
    pub fn new() -> Self {
        TermsQuery::default()
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn add_field<S: Into<String>>(&mut self, field: S) -> &mut Self {
        self.fields.push(field.into());
        self
    }

    /// Set fields from a comma separated list.
    pub fn set_fields(&mut self, fields: &str) -> &mut Self {
        self.fields = fields
            .split(',')
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string)
            .collect();
        self
    }

    pub fn set_lower_bound<S: Into<String>>(&mut self, lower: S, inclusive: Option<bool>) -> &mut Self {
        self.lower_bound = Some(lower.into());
        self.lower_bound_inclusive = inclusive;
        self
    }

    pub fn set_upper_bound<S: Into<String>>(&mut self, upper: S, inclusive: Option<bool>) -> &mut Self {
        self.upper_bound = Some(upper.into());
        self.upper_bound_inclusive = inclusive;
        self
    }

    pub fn set_min_count(&mut self, count: u64) -> &mut Self {
        self.min_count = Some(count);
        self
    }

    pub fn set_max_count(&mut self, count: u64) -> &mut Self {
        self.max_count = Some(count);
        self
    }

    pub fn set_prefix<S: Into<String>>(&mut self, prefix: S) -> &mut Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Regex with flags such as `case_insensitive` or `literal`.
    pub fn set_regex<S: Into<String>>(&mut self, regex: S, flags: &[&str]) -> &mut Self {
        self.regex = Some(regex.into());
        self.regex_flags = flags.iter().map(|f| f.to_string()).collect();
        self
    }

    /// Maximum terms per field; negative means unlimited.
    pub fn set_limit(&mut self, limit: i64) -> &mut Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_raw(&mut self, raw: bool) -> &mut Self {
        self.raw = Some(raw);
        self
    }

    pub fn set_sort(&mut self, sort: TermsSort) -> &mut Self {
        self.sort = Some(sort);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TermsResult {
    pub header: ResponseHeader,
    pub data: Value,
    /// field → (term, document frequency), in response order.
    pub fields: Vec<(String, Vec<(String, u64)>)>,
}

impl_query_result!(TermsResult);

impl TermsResult {
    pub fn field(&self, name: &str) -> Option<&[(String, u64)]> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, terms)| terms.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.fields.iter().all(|(_, terms)| terms.is_empty())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TermsRequestBuilder;

impl RequestBuilder for TermsRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<TermsQuery>(query, QueryType::Terms)?;
        let mut request = create_request(query, Method::Get);
        request.add_param("terms", true);
        request.params_mut().add_all("terms.fl", &query.fields);
        request.add_param("terms.lower", query.lower_bound.as_deref());
        if query.lower_bound.is_some() {
            request.add_param("terms.lower.incl", query.lower_bound_inclusive);
        }
        request.add_param("terms.upper", query.upper_bound.as_deref());
        if query.upper_bound.is_some() {
            request.add_param("terms.upper.incl", query.upper_bound_inclusive);
        }
        request.add_param("terms.mincount", query.min_count);
        request.add_param("terms.maxcount", query.max_count);
        request.add_param("terms.prefix", query.prefix.as_deref());
        request.add_param("terms.regex", query.regex.as_deref());
        if query.regex.is_some() {
            request.params_mut().add_all("terms.regex.flag", &query.regex_flags);
        }
        request.add_param("terms.limit", query.limit);
        request.add_param("terms.raw", query.raw);
        request.add_param("terms.sort", query.sort.map(|s| s.as_str()));
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TermsResponseParser;

impl ResponseParser for TermsResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<TermsQuery>(query, QueryType::Terms)?;
        let fields = named_list::get(&data, "terms")
            .map(|terms| {
                named_list::entries(terms)
                    .into_iter()
                    .map(|(field, counts)| (field, named_list::counts(counts)))
                    .collect()
            })
            .unwrap_or_default();
        Ok(SolrResult::Terms(TermsResult {
            header: ResponseHeader::from_data(&data),
            fields,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request() {
        let mut query = TermsQuery::new();
        query
            .set_fields("name, cat")
            .set_lower_bound("a", Some(false))
            .set_prefix("ip")
            .set_regex("ip.*", &["case_insensitive"])
            .set_limit(-1)
            .set_sort(TermsSort::Index);
        let request = TermsRequestBuilder.build(&query).unwrap();
        assert_eq!(request.handler(), "terms");
        assert_eq!(
            request.params().get("terms.fl").unwrap(),
            &["name".to_string(), "cat".to_string()]
        );
        assert_eq!(request.param("terms.lower"), Some("a"));
        assert_eq!(request.param("terms.lower.incl"), Some("false"));
        assert!(request.param("terms.upper.incl").is_none());
        assert_eq!(request.param("terms.regex.flag"), Some("case_insensitive"));
        assert_eq!(request.param("terms.limit"), Some("-1"));
        assert_eq!(request.param("terms.sort"), Some("index"));
    }

    #[test]
    fn test_parse_flat_and_map() {
        let data = json!({"terms": {"name": ["ipod", 3, "ipad", 1], "cat": {"music": 2}}});
        let result = TermsResponseParser
            .parse(&TermsQuery::new(), &Response::ok(""), data)
            .unwrap();
        let result = TermsResult::try_from(result).unwrap();
        assert_eq!(
            result.field("name").unwrap(),
            &[("ipod".to_string(), 3), ("ipad".to_string(), 1)]
        );
        assert_eq!(result.field("cat").unwrap(), &[("music".to_string(), 2)]);
        assert!(result.field("features").is_none());
    }
}
