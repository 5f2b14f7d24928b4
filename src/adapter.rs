//! Pluggable HTTP transport.
//!
//! The library never talks to the network directly; it hands a
//! [`Request`] and the chosen [`Endpoint`] to an [`Adapter`] and gets a
//! [`Response`] back. Any status Solr answers with (including 4xx/5xx) is
//! a response; only failures to get an answer at all are errors, and those
//! must be reported as [`crate::error::SolriumError::Transport`].

pub mod http;

use std::fmt::Debug;

use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::request::Request;
use crate::response::Response;

pub use http::{AdapterConfig, HttpAdapter};

/// Trait for HTTP transports.
pub trait Adapter: Send + Sync + Debug {
    /// Send a request to an endpoint and return the raw response.
    fn execute(&self, request: &Request, endpoint: &Endpoint) -> Result<Response>;
}
