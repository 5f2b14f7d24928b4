//! Adds custom parameters and headers to every request.
//!
//! ```
//! use solrium::plugin::{Customization, CustomizeRequest};
//!
//! let plugin = CustomizeRequest::new();
//! plugin
//!     .add_customization(Customization::param("auth", "token", "s3cret").persistent(true))
//!     .unwrap();
//! plugin
//!     .add_customization(Customization::header("trace", "X-Trace-Id", "42"))
//!     .unwrap();
//! assert_eq!(plugin.customizations().len(), 2);
//! ```

use parking_lot::Mutex;
use tracing::trace;

use crate::error::{Result, SolriumError};
use crate::plugin::Plugin;
use crate::query::Query;
use crate::request::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomizationKind {
    Param,
    Header,
}

/// One parameter or header to add.
#[derive(Debug, Clone, PartialEq)]
pub struct Customization {
    pub key: String,
    pub kind: CustomizationKind,
    pub name: String,
    pub values: Vec<String>,
    /// Applied to every request instead of only the next one.
    pub persistent: bool,
    /// Replace values already on the request.
    pub overwrite: bool,
}

impl Customization {
    pub fn new<K, N, V>(key: K, kind: CustomizationKind, name: N, value: V) -> Self
    where
        K: Into<String>,
        N: Into<String>,
        V: Into<String>,
    {
        Customization {
            key: key.into(),
            kind,
            name: name.into(),
            values: vec![value.into()],
            persistent: false,
            overwrite: true,
        }
    }

    pub fn param<K: Into<String>, N: Into<String>, V: Into<String>>(key: K, name: N, value: V) -> Self {
        Customization::new(key, CustomizationKind::Param, name, value)
    }

    pub fn header<K: Into<String>, N: Into<String>, V: Into<String>>(key: K, name: N, value: V) -> Self {
        Customization::new(key, CustomizationKind::Header, name, value)
    }

    pub fn add_value<V: Into<String>>(mut self, value: V) -> Self {
        self.values.push(value.into());
        self
    }

    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn apply(&self, request: &mut Request) {
        match self.kind {
            CustomizationKind::Param => {
                if self.overwrite {
                    request.set_param(&self.name, None::<&str>);
                }
                for value in &self.values {
                    request.add_param(&self.name, value.as_str());
                }
            }
            CustomizationKind::Header => {
                let value = self.values.join(", ");
                if self.overwrite || request.header(&self.name).is_none() {
                    request.set_header(&self.name, value);
                } else {
                    request.add_header(&self.name, value);
                }
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct CustomizeRequest {
    customizations: Mutex<Vec<Customization>>,
}

impl CustomizeRequest {
    pub fn new() -> Self {
        CustomizeRequest::default()
    }

    /// Add a customization; keys must be unique and names non-empty.
    pub fn add_customization(&self, customization: Customization) -> Result<&Self> {
        if customization.key.is_empty() || customization.name.is_empty() {
            return Err(SolriumError::invalid_argument(
                "A customization needs a key and a name",
            ));
        }
        let mut customizations = self.customizations.lock();
        if customizations.iter().any(|c| c.key == customization.key) {
            return Err(SolriumError::invalid_argument(format!(
                "A customization with key '{}' already exists",
                customization.key
            )));
        }
        customizations.push(customization);
        Ok(self)
    }

    pub fn customization(&self, key: &str) -> Option<Customization> {
        self.customizations.lock().iter().find(|c| c.key == key).cloned()
    }

    pub fn customizations(&self) -> Vec<Customization> {
        self.customizations.lock().clone()
    }

    pub fn remove_customization(&self, key: &str) -> bool {
        let mut customizations = self.customizations.lock();
        let before = customizations.len();
        customizations.retain(|c| c.key != key);
        customizations.len() != before
    }

    pub fn clear(&self) {
        self.customizations.lock().clear();
    }
}

impl Plugin for CustomizeRequest {
    fn post_create_request(&self, _query: &dyn Query, request: &mut Request) -> Result<()> {
        let mut customizations = self.customizations.lock();
        for customization in customizations.iter() {
            trace!(key = %customization.key, name = %customization.name, "Applying customization");
            customization.apply(request);
        }
        // One-shot customizations are used up.
        customizations.retain(|c| c.persistent);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::PingQuery;
    use crate::request::Method;

    #[test]
    fn test_persistent_and_one_shot() {
        let plugin = CustomizeRequest::new();
        plugin
            .add_customization(Customization::param("p", "shards.tolerant", "true").persistent(true))
            .unwrap();
        plugin
            .add_customization(Customization::header("h", "X-Request-Id", "abc"))
            .unwrap();
        assert!(plugin.add_customization(Customization::param("p", "x", "y")).is_err());

        let query = PingQuery::new();
        let mut first = Request::new(Method::Get, "admin/ping");
        plugin.post_create_request(&query, &mut first).unwrap();
        assert_eq!(first.param("shards.tolerant"), Some("true"));
        assert_eq!(first.header("X-Request-Id"), Some("abc"));

        let mut second = Request::new(Method::Get, "admin/ping");
        plugin.post_create_request(&query, &mut second).unwrap();
        assert_eq!(second.param("shards.tolerant"), Some("true"));
        assert_eq!(second.header("X-Request-Id"), None);
        assert_eq!(plugin.customizations().len(), 1);
    }

    #[test]
    fn test_overwrite() {
        let plugin = CustomizeRequest::new();
        plugin
            .add_customization(Customization::param("fq", "fq", "inStock:true").overwrite(false))
            .unwrap();
        let mut request = Request::new(Method::Get, "select");
        request.add_param("fq", "cat:book");
        plugin.post_create_request(&PingQuery::new(), &mut request).unwrap();
        assert_eq!(request.query_string(), "fq=cat%3Abook&fq=inStock%3Atrue");

        let plugin = CustomizeRequest::new();
        plugin
            .add_customization(Customization::param("fq", "fq", "inStock:true"))
            .unwrap();
        let mut request = Request::new(Method::Get, "select");
        request.add_param("fq", "cat:book");
        plugin.post_create_request(&PingQuery::new(), &mut request).unwrap();
        assert_eq!(request.query_string(), "fq=inStock%3Atrue");
    }
}
