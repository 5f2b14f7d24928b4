//! Request builder for select queries.

use tracing::trace;

use crate::error::Result;
use crate::query::select::SelectQuery;
use crate::query::{Query, QueryType, create_request, downcast_query};
use crate::registry::RequestBuilder;
use crate::request::{Method, Request};

/// Builds `GET select` requests.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectRequestBuilder;

impl RequestBuilder for SelectRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<SelectQuery>(query, QueryType::Select)?;
        let mut request = create_request(query, Method::Get);
        add_search_params(query, &mut request)?;
        trace!(params = request.params().len(), "built select request");
        Ok(request)
    }
}

/// Add the search parameters and components of a select query.
///
/// Shared with query types that extend select, such as more-like-this.
pub(crate) fn add_search_params(query: &SelectQuery, request: &mut Request) -> Result<()> {
    request.add_param("q", query.local_parameters.apply(query.query()));
    request.add_param("start", query.start());
    request.add_param("rows", query.rows());
    request.add_param("fl", query.fields().join(","));
    let sort = query
        .sorts()
        .iter()
        .map(|(field, order)| format!("{field} {}", order.as_str()))
        .collect::<Vec<_>>()
        .join(",");
    request.add_param("sort", sort);
    request.add_param("q.op", query.query_default_operator().map(|o| o.as_str()));
    request.add_param("df", query.query_default_field());
    request.add_param("cursorMark", query.cursor_mark());
    request.add_param("sow", query.split_on_whitespace());
    for filter_query in query.filter_queries() {
        request.add_param("fq", filter_query.render());
    }
    query.components().build(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Spatial;
    use crate::query::PingQuery;
    use crate::query::select::{QueryOperator, SortOrder};
    use crate::error::SolriumError;

    fn build(query: &SelectQuery) -> Request {
        SelectRequestBuilder.build(query).unwrap()
    }

    #[test]
    fn test_default_params() {
        let request = build(&SelectQuery::new());
        assert_eq!(request.method(), Method::Get);
        assert_eq!(request.handler(), "select");
        assert_eq!(request.param("q"), Some("*:*"));
        assert_eq!(request.param("start"), Some("0"));
        assert_eq!(request.param("rows"), Some("10"));
        assert_eq!(request.param("fl"), Some("*,score"));
        assert_eq!(request.param("omitHeader"), Some("true"));
        assert_eq!(request.param("wt"), Some("json"));
        assert!(request.param("sort").is_none());
    }

    #[test]
    fn test_full_params() {
        let mut query = SelectQuery::new();
        query
            .set_query("text:ipod")
            .set_start(20)
            .set_rows(5)
            .set_fields(["id", "name"])
            .add_sort("price", SortOrder::Desc)
            .add_sort("id", SortOrder::Asc)
            .set_query_default_operator(QueryOperator::And)
            .set_query_default_field("text")
            .set_cursor_mark("*");
        query.local_parameters.set_type("lucene");
        query.create_filter_query("stock", "inStock:true").unwrap().add_tag("s");
        query.create_filter_query("cat", "cat:electronics").unwrap();
        query.facet_set().create_facet_field("cat").unwrap().add_exclude("s");
        query.set_spatial(Spatial::new("store", "45.15,-93.85", 5.0));

        let request = build(&query);
        assert_eq!(request.param("q"), Some("{!lucene}text:ipod"));
        assert_eq!(request.param("start"), Some("20"));
        assert_eq!(request.param("fl"), Some("id,name"));
        assert_eq!(request.param("sort"), Some("price desc,id asc"));
        assert_eq!(request.param("q.op"), Some("AND"));
        assert_eq!(request.param("df"), Some("text"));
        assert_eq!(request.param("cursorMark"), Some("*"));
        assert_eq!(
            request.params().get("fq").unwrap(),
            &["{!tag=s}inStock:true".to_string(), "cat:electronics".to_string()]
        );
        assert_eq!(request.param("facet.field"), Some("{!ex=s}cat"));
        assert_eq!(request.param("pt"), Some("45.15,-93.85"));
    }

    #[test]
    fn test_rows_zero_with_facets() {
        let mut query = SelectQuery::new();
        query.set_rows(0);
        query.facet_set().create_facet_field("cat").unwrap();
        let request = build(&query);
        assert_eq!(request.param("rows"), Some("0"));
        assert_eq!(request.param("facet"), Some("true"));
    }

    #[test]
    fn test_wrong_query_type() {
        let result = SelectRequestBuilder.build(&PingQuery::new());
        assert!(matches!(result, Err(SolriumError::QueryTypeMismatch { .. })));
    }
}
