//! # Solrium
//!
//! A typed, pluggable client library for Apache Solr.
//!
//! ## Features
//!
//! - Typed queries for search, indexing, admin and managed resources
//! - Select components: facets, highlighting, grouping, spellcheck, stats
//! - Response decoding for the JSON, XML and PHPS writers
//! - A plugin pipeline with load balancing, request customization,
//!   buffered indexing, parallel execution and prefetching iterators
//!
//! ## Example
//!
//! ```no_run
//! use solrium::prelude::*;
//!
//! let client = Client::http()?;
//! client.add_endpoint(Endpoint::from_url("books", "http://localhost:8983/solr/books")?)?;
//!
//! let mut query = SelectQuery::new();
//! query.set_query("title:rust").set_rows(5);
//! let result = client.select(&query)?;
//! for doc in result.iter() {
//!     println!("{:?}", doc.get_str("title"));
//! }
//! # Ok::<(), SolriumError>(())
//! ```

pub mod adapter;
pub mod cli;
pub mod client;
pub mod component;
pub mod config;
pub mod document;
pub mod endpoint;
pub mod error;
pub mod event;
pub mod plugin;
pub mod query;
pub mod registry;
pub mod request;
pub mod response;
pub mod util;
pub mod writer;

pub mod prelude {
    pub use crate::adapter::{Adapter, AdapterConfig, HttpAdapter};
    pub use crate::client::Client;
    pub use crate::config::ClientConfig;
    pub use crate::document::{Document, FieldValue, Modifier};
    pub use crate::endpoint::Endpoint;
    pub use crate::error::{Result, SolriumError};
    pub use crate::event::{Event, EventKind};
    pub use crate::plugin::{
        BufferedAdd, BufferedDelete, CustomizeRequest, LoadBalancer, MinimumScoreFilter, ParallelExecution,
        Plugin, PostBigRequest, PrefetchIterator,
    };
    pub use crate::query::{Query, QueryType, SelectQuery, SelectResult, UpdateQuery, UpdateResult};
    pub use crate::registry::SolrResult;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
