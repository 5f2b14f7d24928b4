//! Client plugins.
//!
//! A [`Plugin`] is registered on a [`Client`] under a unique key and may
//! implement any of the pipeline hooks. Every hook has a no-op default, so
//! a plugin only implements the stages it cares about. Hooks run in
//! registration order.
//!
//! `pre_*` hooks may short-circuit a stage by returning a value: the first
//! plugin returning `Some` supplies the stage's output and the default
//! behaviour of the stage is skipped. `post_*` hooks may edit the output
//! in place. An error returned by any hook aborts the execution.
//!
//! The buffered add/delete helpers, parallel execution and the prefetch
//! iterator drive a shared [`Client`] from the outside and are not
//! registered as plugins.

pub mod buffered_add;
pub mod buffered_delete;
pub mod customize_request;
pub mod load_balancer;
pub mod minimum_score_filter;
pub mod parallel;
pub mod post_big_request;
pub mod prefetch_iterator;

use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::Result;
use crate::query::{Query, QueryType};
use crate::registry::SolrResult;
use crate::request::Request;
use crate::response::Response;

pub use buffered_add::{BufferedAdd, BufferedAddLite};
pub use buffered_delete::{BufferedDelete, BufferedDeleteLite};
pub use customize_request::{Customization, CustomizationKind, CustomizeRequest};
pub use load_balancer::{LoadBalancer, LoadBalancerConfig};
pub use minimum_score_filter::{MinimumScoreFilter, MinimumScoreFilterConfig};
pub use parallel::ParallelExecution;
pub use post_big_request::{PostBigRequest, PostBigRequestConfig};
pub use prefetch_iterator::PrefetchIterator;

/// Pipeline hooks.
#[allow(unused_variables)]
pub trait Plugin: Send + Sync {
    /// Supply the query instead of the registered factory.
    fn pre_create_query(&self, query_type: QueryType) -> Result<Option<Box<dyn Query>>> {
        Ok(None)
    }

    fn post_create_query(&self, query: &mut dyn Query) -> Result<()> {
        Ok(())
    }

    /// Supply the request instead of the registered builder.
    fn pre_create_request(&self, query: &dyn Query) -> Result<Option<Request>> {
        Ok(None)
    }

    fn post_create_request(&self, query: &dyn Query, request: &mut Request) -> Result<()> {
        Ok(())
    }

    /// Supply the response instead of sending the request through the
    /// client's adapter to `endpoint`.
    fn pre_execute_request(
        &self,
        client: &Client,
        query: &dyn Query,
        request: &Request,
        endpoint: &Endpoint,
    ) -> Result<Option<Response>> {
        Ok(None)
    }

    fn post_execute_request(
        &self,
        query: &dyn Query,
        request: &Request,
        response: &mut Response,
    ) -> Result<()> {
        Ok(())
    }

    /// Supply the result instead of checking and parsing the response.
    fn pre_create_result(&self, query: &dyn Query, response: &Response) -> Result<Option<SolrResult>> {
        Ok(None)
    }

    fn post_create_result(
        &self,
        query: &dyn Query,
        response: &Response,
        result: &mut SolrResult,
    ) -> Result<()> {
        Ok(())
    }
}
