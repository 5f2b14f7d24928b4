//! Weighted load balancing with failover across the client's endpoints.
//!
//! The balancer takes over the execute-request stage: it picks an endpoint
//! by weight, sends the request through the client's adapter and, with
//! failover enabled, moves on to another endpoint when the attempt fails
//! with a transport error or one of the configured status codes. Endpoints
//! that failed are excluded for the rest of that execution and each failed
//! attempt is published as an [`Event::EndpointFailure`].
//!
//! Queries of a blocked type (update by default) are not balanced and go
//! to the endpoint the client resolved.

use std::collections::BTreeMap;

use parking_lot::Mutex;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::client::Client;
use crate::endpoint::Endpoint;
use crate::error::{Result, SolriumError};
use crate::event::Event;
use crate::plugin::Plugin;
use crate::query::{Query, QueryType};
use crate::request::Request;
use crate::response::Response;

/// Configuration of a [`LoadBalancer`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoadBalancerConfig {
    /// Endpoint key → weight.
    pub endpoints: BTreeMap<String, u32>,
    pub failover: bool,
    /// Retries after the first failed attempt; unlimited when unset.
    pub max_retries: Option<usize>,
    /// Statuses treated like a transport failure.
    pub failover_status_codes: Vec<u16>,
    /// Query type names (`update`, `select`, ...) that are not balanced.
    pub blocked_query_types: Vec<String>,
}

impl Default for LoadBalancerConfig {
    fn default() -> Self {
        LoadBalancerConfig {
            endpoints: BTreeMap::new(),
            failover: false,
            max_retries: Some(1),
            failover_status_codes: Vec::new(),
            blocked_query_types: vec![QueryType::Update.as_str().to_string()],
        }
    }
}

impl LoadBalancerConfig {
    pub fn with_endpoint<S: Into<String>>(mut self, key: S, weight: u32) -> Self {
        self.endpoints.insert(key.into(), weight);
        self
    }

    pub fn with_failover(mut self, failover: bool) -> Self {
        self.failover = failover;
        self
    }

    pub fn with_max_retries(mut self, max_retries: Option<usize>) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_failover_status_code(mut self, status: u16) -> Self {
        self.failover_status_codes.push(status);
        self
    }
}

#[derive(Debug)]
struct State {
    endpoints: Vec<(String, u32)>,
    failover: bool,
    max_retries: Option<usize>,
    failover_status_codes: Vec<u16>,
    blocked_query_types: Vec<String>,
    forced_endpoint: Option<String>,
    last_endpoint: Option<String>,
}

/// Load balancer plugin.
#[derive(Debug)]
pub struct LoadBalancer {
    state: Mutex<State>,
}

impl Default for LoadBalancer {
    fn default() -> Self {
        LoadBalancer::from_config(LoadBalancerConfig::default())
    }
}

impl LoadBalancer {
    pub fn new() -> Self {
        LoadBalancer::default()
    }

    pub fn from_config(config: LoadBalancerConfig) -> Self {
        LoadBalancer {
            state: Mutex::new(State {
                endpoints: config.endpoints.into_iter().collect(),
                failover: config.failover,
                max_retries: config.max_retries,
                failover_status_codes: config.failover_status_codes,
                blocked_query_types: config.blocked_query_types,
                forced_endpoint: None,
                last_endpoint: None,
            }),
        }
    }

    /// Add an endpoint (by client endpoint key) or change its weight.
    pub fn add_endpoint<S: Into<String>>(&self, key: S, weight: u32) -> &Self {
        let key = key.into();
        let mut state = self.state.lock();
        match state.endpoints.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = weight,
            None => state.endpoints.push((key, weight)),
        }
        self
    }

    pub fn remove_endpoint(&self, key: &str) -> &Self {
        self.state.lock().endpoints.retain(|(k, _)| k != key);
        self
    }

    pub fn endpoints(&self) -> Vec<(String, u32)> {
        self.state.lock().endpoints.clone()
    }

    pub fn set_failover(&self, failover: bool) -> &Self {
        self.state.lock().failover = failover;
        self
    }

    pub fn failover(&self) -> bool {
        self.state.lock().failover
    }

    pub fn set_max_retries(&self, max_retries: Option<usize>) -> &Self {
        self.state.lock().max_retries = max_retries;
        self
    }

    pub fn add_failover_status_code(&self, status: u16) -> &Self {
        let mut state = self.state.lock();
        if !state.failover_status_codes.contains(&status) {
            state.failover_status_codes.push(status);
        }
        self
    }

    pub fn add_blocked_query_type(&self, query_type: QueryType) -> &Self {
        let mut state = self.state.lock();
        let name = query_type.as_str();
        if !state.blocked_query_types.iter().any(|t| t == name) {
            state.blocked_query_types.push(name.to_string());
        }
        self
    }

    pub fn remove_blocked_query_type(&self, query_type: QueryType) -> &Self {
        let name = query_type.as_str();
        self.state.lock().blocked_query_types.retain(|t| t != name);
        self
    }

    pub fn is_blocked(&self, query_type: QueryType) -> bool {
        let name = query_type.as_str();
        self.state.lock().blocked_query_types.iter().any(|t| t == name)
    }

    /// Send the next balanced query to `key`, bypassing the weights.
    pub fn set_forced_endpoint_for_next_query<S: Into<String>>(&self, key: S) -> &Self {
        self.state.lock().forced_endpoint = Some(key.into());
        self
    }

    /// Key of the endpoint the last balanced query was sent to.
    pub fn last_endpoint(&self) -> Option<String> {
        self.state.lock().last_endpoint.clone()
    }

    /// Pick an endpoint by weight among those not excluded.
    fn pick(&self, excluded: &[String]) -> Option<String> {
        let state = self.state.lock();
        let candidates: Vec<&(String, u32)> = state
            .endpoints
            .iter()
            .filter(|(key, weight)| *weight > 0 && !excluded.contains(key))
            .collect();
        if candidates.is_empty() {
            return None;
        }
        let weights = WeightedIndex::new(candidates.iter().map(|(_, weight)| *weight)).ok()?;
        Some(candidates[weights.sample(&mut rand::rng())].0.clone())
    }

    fn record(&self, key: &str) {
        self.state.lock().last_endpoint = Some(key.to_string());
    }

    fn execute_forced(&self, client: &Client, key: &str, request: &Request) -> Result<Response> {
        let endpoint = client.endpoint(key)?;
        self.record(key);
        debug!(endpoint = key, "Sending request to forced endpoint");
        client.adapter().execute(request, &endpoint)
    }

    fn execute_balanced(&self, client: &Client, request: &Request) -> Result<Response> {
        let (failover, max_retries, failover_status_codes) = {
            let state = self.state.lock();
            (state.failover, state.max_retries, state.failover_status_codes.clone())
        };

        let mut excluded: Vec<String> = Vec::new();
        let mut last_error = None;
        while let Some(key) = self.pick(&excluded) {
            let endpoint = client.endpoint(&key)?;
            self.record(&key);
            debug!(endpoint = %key, "Sending balanced request");

            let error = match client.adapter().execute(request, &endpoint) {
                Ok(response) if !failover || !failover_status_codes.contains(&response.status_code()) => {
                    return Ok(response);
                }
                Ok(response) => SolriumError::http(
                    response.status_code(),
                    response.status_message(),
                    response.body_str().into_owned(),
                ),
                Err(error) if failover && error.is_transport() => error,
                Err(error) => return Err(error),
            };

            warn!(endpoint = %key, error = %error, "Endpoint failed, failing over");
            client.events().dispatch(&Event::EndpointFailure {
                endpoint: &key,
                error: &error,
            });
            excluded.push(key);
            last_error = Some(error);
            if max_retries.is_some_and(|max| excluded.len() > max) {
                break;
            }
        }

        Err(last_error.unwrap_or_else(|| {
            SolriumError::invalid_config("The load balancer has no endpoints with a positive weight")
        }))
    }
}

impl Plugin for LoadBalancer {
    fn pre_execute_request(
        &self,
        client: &Client,
        query: &dyn Query,
        request: &Request,
        _endpoint: &Endpoint,
    ) -> Result<Option<Response>> {
        if self.is_blocked(query.query_type()) {
            return Ok(None);
        }
        let forced = self.state.lock().forced_endpoint.take();
        let response = match forced {
            Some(key) => self.execute_forced(client, &key, request)?,
            None => self.execute_balanced(client, request)?,
        };
        Ok(Some(response))
    }
}
