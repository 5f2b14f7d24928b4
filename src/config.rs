//! Client configuration.
//!
//! A [`ClientConfig`] describes the endpoints, the HTTP adapter and the
//! plugins of a [`Client`](crate::client::Client). It can be built in
//! code with the `with_*` methods or loaded from JSON:
//!
//! ```
//! use solrium::config::ClientConfig;
//!
//! let config = ClientConfig::from_json_str(r#"{
//!     "endpoints": {
//!         "local": { "host": "127.0.0.1", "port": 8983, "core": "techproducts" }
//!     },
//!     "adapter": { "timeout_secs": 10 },
//!     "plugins": { "post_big_request": { "max_query_string_length": 2048 } }
//! }"#).unwrap();
//!
//! assert_eq!(config.endpoints["local"].core.as_deref(), Some("techproducts"));
//! assert_eq!(config.adapter.timeout_secs, 10);
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::adapter::AdapterConfig;
use crate::endpoint::EndpointConfig;
use crate::error::{Result, SolriumError};
use crate::plugin::{LoadBalancerConfig, MinimumScoreFilterConfig, PostBigRequestConfig};

/// Configuration of a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Endpoints by key.
    pub endpoints: BTreeMap<String, EndpointConfig>,
    /// Key of the default endpoint; the first endpoint (by key) when unset.
    pub default_endpoint: Option<String>,
    pub adapter: AdapterConfig,
    pub plugins: PluginsConfig,
}

/// Plugins registered by [`Client::from_config`](crate::client::Client::from_config).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginsConfig {
    pub load_balancer: Option<LoadBalancerConfig>,
    pub post_big_request: Option<PostBigRequestConfig>,
    pub minimum_score_filter: Option<MinimumScoreFilterConfig>,
}

impl ClientConfig {
    pub fn new() -> Self {
        ClientConfig::default()
    }

    /// Parse a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ClientConfig = serde_json::from_str(json)
            .map_err(|e| SolriumError::invalid_config(format!("Invalid client configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SolriumError::invalid_config(format!("Cannot read {}: {e}", path.display()))
        })?;
        ClientConfig::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_endpoint<S: Into<String>>(mut self, key: S, endpoint: EndpointConfig) -> Self {
        self.endpoints.insert(key.into(), endpoint);
        self
    }

    pub fn with_default_endpoint<S: Into<String>>(mut self, key: S) -> Self {
        self.default_endpoint = Some(key.into());
        self
    }

    pub fn with_adapter(mut self, adapter: AdapterConfig) -> Self {
        self.adapter = adapter;
        self
    }

    pub fn with_plugins(mut self, plugins: PluginsConfig) -> Self {
        self.plugins = plugins;
        self
    }

    /// Check cross references between sections.
    pub fn validate(&self) -> Result<()> {
        if let Some(default) = &self.default_endpoint {
            if !self.endpoints.contains_key(default) {
                return Err(SolriumError::invalid_config(format!(
                    "Default endpoint '{default}' is not configured"
                )));
            }
        }
        if let Some(balancer) = &self.plugins.load_balancer {
            for key in balancer.endpoints.keys() {
                if !self.endpoints.contains_key(key) {
                    return Err(SolriumError::invalid_config(format!(
                        "Load balancer endpoint '{key}' is not configured"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl PluginsConfig {
    pub fn with_load_balancer(mut self, config: LoadBalancerConfig) -> Self {
        self.load_balancer = Some(config);
        self
    }

    pub fn with_post_big_request(mut self, config: PostBigRequestConfig) -> Self {
        self.post_big_request = Some(config);
        self
    }

    pub fn with_minimum_score_filter(mut self, config: MinimumScoreFilterConfig) -> Self {
        self.minimum_score_filter = Some(config);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.endpoints.is_empty());
        assert!(config.default_endpoint.is_none());
        assert_eq!(config.adapter.timeout_secs, 5);
        assert!(config.plugins.load_balancer.is_none());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "endpoints": {{
                    "a": {{"host": "solr-a", "core": "books"}},
                    "b": {{"host": "solr-b", "core": "books"}}
                }},
                "default_endpoint": "b",
                "plugins": {{"load_balancer": {{"endpoints": {{"a": 1, "b": 3}}}}}}
            }}"#
        )
        .unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoints.len(), 2);
        assert_eq!(config.endpoints["a"].port, 8983);
        assert_eq!(config.default_endpoint.as_deref(), Some("b"));
        let balancer = config.plugins.load_balancer.unwrap();
        assert_eq!(balancer.endpoints["b"], 3);
    }

    #[test]
    fn test_unknown_default_endpoint() {
        let result = ClientConfig::from_json_str(r#"{"default_endpoint": "missing"}"#);
        assert!(matches!(result, Err(SolriumError::Config(_))));
    }

    #[test]
    fn test_builders() {
        let config = ClientConfig::new()
            .with_endpoint("local", EndpointConfig::default())
            .with_default_endpoint("local")
            .with_plugins(PluginsConfig::default().with_post_big_request(PostBigRequestConfig::default()));
        assert!(config.validate().is_ok());
        let json = config.to_json_string().unwrap();
        assert_eq!(ClientConfig::from_json_str(&json).unwrap(), config);
    }
}
