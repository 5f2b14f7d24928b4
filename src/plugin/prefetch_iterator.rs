//! Iterate over every document matching a select query.
//!
//! Documents are fetched in pages of `prefetch` rows. When the query sets
//! a cursor mark, pages are walked with `cursorMark` (the query's sort must
//! then include the unique key field); otherwise with `start`/`rows`.

use std::collections::VecDeque;
use std::sync::Arc;

use tracing::trace;

use crate::client::Client;
use crate::document::Document;
use crate::error::{Result, SolriumError};
use crate::query::SelectQuery;

pub const DEFAULT_PREFETCH: u64 = 100;

#[derive(Debug)]
pub struct PrefetchIterator {
    client: Arc<Client>,
    query: SelectQuery,
    prefetch: u64,
    endpoint: Option<String>,
    buffer: VecDeque<Document>,
    start: u64,
    num_found: Option<u64>,
    cursor_mark: Option<String>,
    done: bool,
}

impl PrefetchIterator {
    pub fn new(client: Arc<Client>, query: SelectQuery) -> Self {
        let cursor_mark = query.cursor_mark().map(str::to_string);
        let start = query.start();
        PrefetchIterator {
            client,
            query,
            prefetch: DEFAULT_PREFETCH,
            endpoint: None,
            buffer: VecDeque::new(),
            start,
            num_found: None,
            cursor_mark,
            done: false,
        }
    }

    /// Rows per request.
    pub fn with_prefetch(mut self, prefetch: u64) -> Result<Self> {
        if prefetch == 0 {
            return Err(SolriumError::invalid_argument("Prefetch must be at least 1"));
        }
        self.prefetch = prefetch;
        Ok(self)
    }

    pub fn with_endpoint<S: Into<String>>(mut self, key: S) -> Self {
        self.endpoint = Some(key.into());
        self
    }

    pub fn prefetch(&self) -> u64 {
        self.prefetch
    }

    /// Total number of matching documents, fetching the first page if
    /// nothing was fetched yet.
    pub fn num_found(&mut self) -> Result<u64> {
        if self.num_found.is_none() {
            self.fetch()?;
        }
        Ok(self.num_found.unwrap_or(0))
    }

    fn fetch(&mut self) -> Result<()> {
        self.query.set_rows(self.prefetch);
        match &self.cursor_mark {
            Some(mark) => {
                self.query.set_cursor_mark(mark.clone());
            }
            None => {
                self.query.set_start(self.start);
            }
        }
        let result = match &self.endpoint {
            Some(key) => self.client.select_on(&self.query, key)?,
            None => self.client.select(&self.query)?,
        };
        trace!(start = self.start, rows = result.len(), num_found = result.num_found(), "Fetched page");

        self.num_found = Some(result.num_found());
        let fetched = result.len() as u64;
        match (&self.cursor_mark, result.next_cursor_mark()) {
            (Some(current), Some(next)) => {
                if current == next {
                    self.done = true;
                }
                self.cursor_mark = Some(next.to_string());
            }
            (Some(_), None) => self.done = true,
            (None, _) => {
                self.start += fetched;
                if self.start >= result.num_found() {
                    self.done = true;
                }
            }
        }
        if fetched == 0 {
            self.done = true;
        }
        self.buffer.extend(result.list.documents);
        Ok(())
    }
}

impl Iterator for PrefetchIterator {
    type Item = Result<Document>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            if let Err(error) = self.fetch() {
                self.done = true;
                return Some(Err(error));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::endpoint::Endpoint;
    use crate::registry::QueryTypeRegistry;
    use crate::request::Request;
    use crate::response::Response;
    use parking_lot::Mutex;
    use serde_json::json;

    /// Serves `total` documents by offset or by a numeric cursor.
    #[derive(Debug)]
    struct Pages {
        total: u64,
        requests: Mutex<Vec<String>>,
    }

    impl Adapter for Pages {
        fn execute(&self, request: &Request, _endpoint: &Endpoint) -> Result<Response> {
            self.requests.lock().push(request.query_string());
            let rows: u64 = request.param("rows").unwrap_or("10").parse().unwrap_or(10);
            let (start, next) = match request.param("cursorMark") {
                Some(mark) => {
                    let start = if mark == "*" { 0 } else { mark.parse().unwrap_or(0) };
                    let end = (start + rows).min(self.total);
                    (start, Some(end.to_string()))
                }
                None => (request.param("start").unwrap_or("0").parse().unwrap_or(0), None),
            };
            let docs: Vec<_> = (start..(start + rows).min(self.total))
                .map(|i| json!({"id": i.to_string()}))
                .collect();
            let mut body = json!({"response": {"numFound": self.total, "start": start, "docs": docs}});
            if let Some(next) = next {
                body["nextCursorMark"] = json!(next);
            }
            Ok(Response::ok(body.to_string()))
        }
    }

    fn client(total: u64) -> (Arc<Client>, Arc<Pages>) {
        let adapter = Arc::new(Pages {
            total,
            requests: Mutex::new(Vec::new()),
        });
        let client = Client::with_registry(adapter.clone(), QueryTypeRegistry::with_defaults());
        client
            .add_endpoint(Endpoint::builder("local").core("books").build())
            .unwrap();
        (Arc::new(client), adapter)
    }

    fn ids(iterator: PrefetchIterator) -> Vec<String> {
        iterator
            .map(|d| d.unwrap().get_str("id").unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn test_offset_paging() {
        let (client, adapter) = client(7);
        let iterator = PrefetchIterator::new(client, SelectQuery::new())
            .with_prefetch(3)
            .unwrap();
        let ids = ids(iterator);
        assert_eq!(ids, (0..7).map(|i| i.to_string()).collect::<Vec<_>>());
        assert_eq!(adapter.requests.lock().len(), 3);
    }

    #[test]
    fn test_cursor_paging() {
        let (client, adapter) = client(5);
        let mut query = SelectQuery::new();
        query.set_cursor_mark("*");
        let iterator = PrefetchIterator::new(client, query).with_prefetch(2).unwrap();
        assert_eq!(ids(iterator).len(), 5);
        // The last page repeats the cursor mark.
        let requests = adapter.requests.lock();
        assert_eq!(requests.len(), 4);
        assert!(requests[0].contains("cursorMark=%2A"));
        assert!(requests[3].contains("cursorMark=5"));
    }

    #[test]
    fn test_empty_result() {
        let (client, _) = client(0);
        let mut iterator = PrefetchIterator::new(client, SelectQuery::new());
        assert_eq!(iterator.num_found().unwrap(), 0);
        assert!(iterator.next().is_none());
    }
}
