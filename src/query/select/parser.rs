//! Response parser for select queries.

use serde_json::Value;

use crate::component::ComponentResults;
use crate::error::Result;
use crate::query::select::{DocumentList, SelectQuery, SelectResult};
use crate::query::{Query, QueryType, ResponseHeader, downcast_query};
use crate::registry::{ResponseParser, SolrResult};
use crate::response::Response;
use crate::util::named_list;

/// Parses select responses into [`SelectResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectResponseParser;

impl ResponseParser for SelectResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        let query = downcast_query::<SelectQuery>(query, QueryType::Select)?;
        Ok(SolrResult::Select(parse_select(query, data)))
    }
}

/// Parse the select part of a response; shared with select-like types.
pub(crate) fn parse_select(query: &SelectQuery, data: Value) -> SelectResult {
    SelectResult {
        header: ResponseHeader::from_data(&data),
        list: named_list::get(&data, "response")
            .map(DocumentList::parse)
            .unwrap_or_default(),
        next_cursor_mark: named_list::get_string(&data, "nextCursorMark"),
        components: ComponentResults::parse(&data, query.components()),
        data,
    }
}
