//! Distributed search over shards or collections.

use crate::component::{Component, ComponentType};
use crate::error::Result;
use crate::request::Request;

/// Distributed search component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistributedSearch {
    shards: Vec<(String, String)>,
    collections: Vec<(String, String)>,
    pub shard_request_handler: Option<String>,
    pub shards_tolerant: Option<bool>,
}

impl DistributedSearch {
    pub fn new() -> Self {
        DistributedSearch::default()
    }

    /// Add a shard, e.g. `("shard1", "localhost:8983/solr/core1")`. A key
    /// that is already present is replaced.
    pub fn add_shard<K: Into<String>, V: Into<String>>(&mut self, key: K, shard: V) -> &mut Self {
        upsert(&mut self.shards, key.into(), shard.into());
        self
    }

    pub fn remove_shard(&mut self, key: &str) -> &mut Self {
        self.shards.retain(|(k, _)| k != key);
        self
    }

    pub fn shards(&self) -> &[(String, String)] {
        &self.shards
    }

    pub fn add_collection<K: Into<String>, V: Into<String>>(&mut self, key: K, collection: V) -> &mut Self {
        upsert(&mut self.collections, key.into(), collection.into());
        self
    }

    pub fn remove_collection(&mut self, key: &str) -> &mut Self {
        self.collections.retain(|(k, _)| k != key);
        self
    }

    pub fn collections(&self) -> &[(String, String)] {
        &self.collections
    }

    /// Handler used for the shard requests (`shards.qt`).
    pub fn set_shard_request_handler<S: Into<String>>(&mut self, handler: S) -> &mut Self {
        self.shard_request_handler = Some(handler.into());
        self
    }

    pub fn set_shards_tolerant(&mut self, tolerant: bool) -> &mut Self {
        self.shards_tolerant = Some(tolerant);
        self
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: String, value: String) {
    match entries.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key, value)),
    }
}

fn join(entries: &[(String, String)]) -> String {
    entries
        .iter()
        .map(|(_, v)| v.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

impl Component for DistributedSearch {
    fn component_type(&self) -> ComponentType {
        ComponentType::DistributedSearch
    }

    fn build(&self, request: &mut Request) -> Result<()> {
        request.set_param("shards", join(&self.shards));
        request.set_param("shards.qt", self.shard_request_handler.as_deref());
        request.set_param("collection", join(&self.collections));
        request.set_param("shards.tolerant", self.shards_tolerant);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Method;

    #[test]
    fn test_shards_and_collections() {
        let mut search = DistributedSearch::new();
        search
            .add_shard("s1", "localhost:8983/solr/core1")
            .add_shard("s2", "localhost:7574/solr/core1")
            .add_shard("s1", "localhost:8984/solr/core1")
            .set_shard_request_handler("dismax")
            .set_shards_tolerant(true);

        let mut request = Request::new(Method::Get, "select");
        search.build(&mut request).unwrap();
        assert_eq!(
            request.param("shards"),
            Some("localhost:8984/solr/core1,localhost:7574/solr/core1")
        );
        assert_eq!(request.param("shards.qt"), Some("dismax"));
        assert_eq!(request.param("shards.tolerant"), Some("true"));
        assert!(request.param("collection").is_none());
    }
}
