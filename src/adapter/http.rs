//! Blocking HTTP adapter built on `reqwest`.

use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Body, Client};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::adapter::Adapter;
use crate::endpoint::Endpoint;
use crate::error::{Result, SolriumError};
use crate::request::Request;
use crate::response::Response;

/// Configuration for the HTTP adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    /// Overall request timeout in seconds.
    pub timeout_secs: u64,
    /// Connection timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Optional proxy URL applied to all schemes.
    pub proxy: Option<String>,
    /// User agent header.
    pub user_agent: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            connect_timeout_secs: 5,
            proxy: None,
            user_agent: format!("solrium/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl AdapterConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout_secs = timeout.as_secs();
        self
    }

    pub fn with_proxy<S: Into<String>>(mut self, proxy: S) -> Self {
        self.proxy = Some(proxy.into());
        self
    }
}

/// Adapter sending requests with a blocking `reqwest` client.
///
/// The underlying client keeps a connection pool, so one adapter should be
/// shared by all requests of a [`crate::client::Client`].
pub struct HttpAdapter {
    client: Client,
    config: AdapterConfig,
}

impl HttpAdapter {
    /// Create an adapter with default settings.
    pub fn new() -> Result<Self> {
        Self::from_config(AdapterConfig::default())
    }

    /// Create an adapter from configuration.
    pub fn from_config(config: AdapterConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .user_agent(config.user_agent.clone());

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| SolriumError::invalid_config(format!("Invalid proxy '{proxy}': {e}")))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| SolriumError::invalid_config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }
}

impl fmt::Debug for HttpAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpAdapter")
            .field("timeout_secs", &self.config.timeout_secs)
            .field("connect_timeout_secs", &self.config.connect_timeout_secs)
            .field("has_proxy", &self.config.proxy.is_some())
            .finish()
    }
}

impl Adapter for HttpAdapter {
    fn execute(&self, request: &Request, endpoint: &Endpoint) -> Result<Response> {
        let uri = request.uri(endpoint)?;
        let method = reqwest::Method::from_bytes(request.method().as_str().as_bytes())
            .map_err(|e| SolriumError::invalid_argument(format!("Invalid HTTP method: {e}")))?;

        // open the upload before touching the network
        let multipart = request.multipart_body()?;

        debug!(method = %request.method(), uri = %uri, "sending request");
        let mut builder = self.client.request(method, &uri);

        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(content_type) = request.content_type() {
            if request.header("Content-Type").is_none() {
                builder = builder.header("Content-Type", content_type);
            }
        }

        if let Some(credentials) = request.credentials().or(endpoint.credentials()) {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        } else if let Some(token) = endpoint.authorization_token() {
            builder = builder.header("Authorization", token.header_value());
        }

        if let Some(body) = multipart {
            let len = body.len();
            builder = builder.body(Body::sized(body.into_reader(), len));
        } else if let Some(data) = request.raw_data() {
            builder = builder.body(data.to_vec());
        }

        let response = builder.send().map_err(|e| {
            if e.is_timeout() {
                SolriumError::transport(format!("Request to {uri} timed out: {e}"))
            } else if e.is_connect() {
                SolriumError::transport(format!("Failed to connect to {uri}: {e}"))
            } else {
                SolriumError::transport(format!("Request to {uri} failed: {e}"))
            }
        })?;

        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), String::from_utf8_lossy(v.as_bytes()).to_string()))
            .collect();
        let body = response
            .bytes()
            .map_err(|e| SolriumError::transport(format!("Failed to read response body from {uri}: {e}")))?;

        trace!(status = status.as_u16(), bytes = body.len(), "received response");
        Ok(Response::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or_default(),
            headers,
            body.to_vec(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_default_config() {
        let config = AdapterConfig::default();
        assert_eq!(config.timeout_secs, 5);
        assert!(config.user_agent.starts_with("solrium/"));
    }

    #[test]
    fn test_invalid_proxy_is_config_error() {
        let config = AdapterConfig::default().with_proxy("not a proxy url ::");
        assert!(matches!(
            HttpAdapter::from_config(config),
            Err(SolriumError::Config(_))
        ));
    }

    #[test]
    fn test_unreachable_endpoint_is_transport_error() {
        let adapter = HttpAdapter::from_config(
            AdapterConfig::default().with_connect_timeout(Duration::from_secs(1)),
        )
        .unwrap();
        // port 9 (discard) on localhost is practically never listening
        let endpoint = Endpoint::builder("dead").port(9).core("x").build();
        let request = Request::new(Method::Get, "admin/ping");
        let error = adapter.execute(&request, &endpoint).unwrap_err();
        assert!(error.is_transport(), "unexpected error: {error}");
    }

    #[test]
    fn test_debug_output() {
        let adapter = HttpAdapter::new().unwrap();
        let debug_output = format!("{:?}", adapter);
        assert!(debug_output.contains("has_proxy: false"));
    }
}
