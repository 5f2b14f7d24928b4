//! Parallel execution of labelled queries.
//!
//! Queries are dispatched on a `rayon` thread pool through a shared
//! [`Client`]; each runs the full pipeline, plugins included. Results come
//! back in the order the labels were added. A failing query yields an
//! error for its own label only.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use solrium::client::Client;
//! use solrium::plugin::ParallelExecution;
//! use solrium::query::SelectQuery;
//!
//! let client = Arc::new(Client::http().unwrap());
//! let mut parallel = ParallelExecution::new(client).unwrap();
//!
//! let mut books = SelectQuery::new();
//! books.set_query("cat:book");
//! let mut music = SelectQuery::new();
//! music.set_query("cat:music");
//! parallel.add_query("books", books).add_query("music", music);
//!
//! for (label, result) in parallel.execute().iter() {
//!     println!("{label}: {}", result.is_ok());
//! }
//! ```

use std::sync::Arc;

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::debug;

use crate::client::Client;
use crate::error::{Result, SolriumError};
use crate::query::Query;
use crate::registry::SolrResult;

struct Entry {
    label: String,
    query: Arc<dyn Query>,
    endpoint: Option<String>,
}

/// Labelled results of a parallel execution, in label insertion order.
#[derive(Debug, Default)]
pub struct ParallelResults {
    entries: Vec<(String, Result<SolrResult>)>,
}

impl ParallelResults {
    pub fn get(&self, label: &str) -> Option<&Result<SolrResult>> {
        self.entries.iter().find(|(l, _)| l == label).map(|(_, r)| r)
    }

    /// Take the result of a label out.
    pub fn take(&mut self, label: &str) -> Option<Result<SolrResult>> {
        let index = self.entries.iter().position(|(l, _)| l == label)?;
        Some(self.entries.remove(index).1)
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(l, _)| l.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Result<SolrResult>)> {
        self.entries.iter().map(|(l, r)| (l.as_str(), r))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_inner(self) -> Vec<(String, Result<SolrResult>)> {
        self.entries
    }
}

/// Runs labelled queries concurrently.
pub struct ParallelExecution {
    client: Arc<Client>,
    pool: Arc<ThreadPool>,
    entries: Vec<Entry>,
}

impl std::fmt::Debug for ParallelExecution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelExecution")
            .field("threads", &self.pool.current_num_threads())
            .field("labels", &self.labels())
            .finish()
    }
}

impl ParallelExecution {
    /// One worker per CPU.
    pub fn new(client: Arc<Client>) -> Result<Self> {
        ParallelExecution::with_threads(client, num_cpus::get())
    }

    pub fn with_threads(client: Arc<Client>, threads: usize) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads.max(1))
            .thread_name(|i| format!("solrium-parallel-{i}"))
            .build()
            .map_err(|e| SolriumError::invalid_config(format!("Failed to create thread pool: {e}")))?;
        Ok(ParallelExecution {
            client,
            pool: Arc::new(pool),
            entries: Vec::new(),
        })
    }

    /// Add a query under a label. Reusing a label replaces its query and
    /// keeps its position.
    pub fn add_query<L: Into<String>, Q: Query>(&mut self, label: L, query: Q) -> &mut Self {
        self.insert(label.into(), Arc::new(query), None)
    }

    /// Add a query to run against a specific endpoint.
    pub fn add_query_on<L, Q, E>(&mut self, label: L, query: Q, endpoint: E) -> &mut Self
    where
        L: Into<String>,
        Q: Query,
        E: Into<String>,
    {
        self.insert(label.into(), Arc::new(query), Some(endpoint.into()))
    }

    fn insert(&mut self, label: String, query: Arc<dyn Query>, endpoint: Option<String>) -> &mut Self {
        match self.entries.iter_mut().find(|e| e.label == label) {
            Some(entry) => {
                entry.query = query;
                entry.endpoint = endpoint;
            }
            None => self.entries.push(Entry {
                label,
                query,
                endpoint,
            }),
        }
        self
    }

    pub fn remove_query(&mut self, label: &str) -> &mut Self {
        self.entries.retain(|e| e.label != label);
        self
    }

    pub fn clear_queries(&mut self) -> &mut Self {
        self.entries.clear();
        self
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Execute every query and wait for all of them.
    pub fn execute(&self) -> ParallelResults {
        let (tx, rx) = crossbeam_channel::unbounded();
        debug!(queries = self.entries.len(), threads = self.pool.current_num_threads(), "Dispatching parallel queries");

        for (index, entry) in self.entries.iter().enumerate() {
            let tx = tx.clone();
            let client = Arc::clone(&self.client);
            let query = Arc::clone(&entry.query);
            let endpoint = entry.endpoint.clone();
            self.pool.spawn(move || {
                let result = client.execute_on(query.as_ref(), endpoint.as_deref());
                let _ = tx.send((index, result));
            });
        }
        // The receiver ends once every worker dropped its sender.
        drop(tx);

        let mut slots: Vec<Option<Result<SolrResult>>> = self.entries.iter().map(|_| None).collect();
        for (index, result) in rx.iter() {
            slots[index] = Some(result);
        }

        let entries = self
            .entries
            .iter()
            .zip(slots)
            .map(|(entry, slot)| {
                let result = slot.unwrap_or_else(|| {
                    Err(SolriumError::invalid_operation(format!(
                        "Query '{}' did not complete",
                        entry.label
                    )))
                });
                (entry.label.clone(), result)
            })
            .collect();
        ParallelResults { entries }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::Adapter;
    use crate::endpoint::Endpoint;
    use crate::query::{PingQuery, SelectQuery, SelectResult};
    use crate::registry::QueryTypeRegistry;
    use crate::request::Request;
    use crate::response::Response;
    use std::thread;
    use std::time::Duration;

    /// Answers with the `q` parameter as the only document id, slower for
    /// earlier labels so completion order differs from label order.
    #[derive(Debug)]
    struct Echo;

    impl Adapter for Echo {
        fn execute(&self, request: &Request, _endpoint: &Endpoint) -> Result<Response> {
            let q = request.param("q").unwrap_or_default().to_string();
            if q == "fail" {
                return Err(SolriumError::transport("connection reset"));
            }
            let delay = q.trim_start_matches("id:").parse::<u64>().unwrap_or(0);
            thread::sleep(Duration::from_millis(50u64.saturating_sub(delay * 10)));
            let body = serde_json::json!({
                "response": {"numFound": 1, "start": 0, "docs": [{"id": q}]}
            });
            Ok(Response::ok(body.to_string()))
        }
    }

    fn client() -> Arc<Client> {
        let client = Client::with_registry(Arc::new(Echo), QueryTypeRegistry::with_defaults());
        client
            .add_endpoint(Endpoint::builder("local").core("books").build())
            .unwrap();
        Arc::new(client)
    }

    fn select(q: &str) -> SelectQuery {
        let mut query = SelectQuery::new();
        query.set_query(q);
        query
    }

    #[test]
    fn test_results_keep_label_order() {
        let mut parallel = ParallelExecution::with_threads(client(), 4).unwrap();
        parallel
            .add_query("first", select("id:1"))
            .add_query("broken", select("fail"))
            .add_query("second", select("id:2"))
            .add_query("third", select("id:3"));

        let mut results = parallel.execute();
        assert_eq!(results.labels(), vec!["first", "broken", "second", "third"]);
        assert!(results.get("broken").unwrap().as_ref().unwrap_err().is_transport());

        let first = SelectResult::try_from(results.take("first").unwrap().unwrap()).unwrap();
        assert_eq!(first.documents()[0].get_str("id"), Some("id:1"));
        let third = SelectResult::try_from(results.take("third").unwrap().unwrap()).unwrap();
        assert_eq!(third.documents()[0].get_str("id"), Some("id:3"));
    }

    #[test]
    fn test_replace_label_and_unknown_endpoint() {
        let mut parallel = ParallelExecution::with_threads(client(), 2).unwrap();
        parallel
            .add_query("a", select("id:1"))
            .add_query("b", select("id:2"))
            .add_query("a", select("id:3"))
            .add_query_on("c", PingQuery::new(), "missing");
        assert_eq!(parallel.labels(), vec!["a", "b", "c"]);

        let results = parallel.execute();
        assert_eq!(results.len(), 3);
        assert!(results.get("a").unwrap().is_ok());
        assert!(matches!(
            results.get("c").unwrap(),
            Err(SolriumError::InvalidArgument(_))
        ));
    }
}
