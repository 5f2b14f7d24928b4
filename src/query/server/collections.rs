//! Collections API (`admin/collections`) for SolrCloud.

use serde_json::Value;

use crate::error::{Result, SolriumError};
use crate::query::{
    Query, QueryOptions, QueryType, ResponseHeader, create_request, downcast_query, impl_query,
    impl_query_result,
};
use crate::registry::{RequestBuilder, ResponseParser, SolrResult};
use crate::request::{Method, Request};
use crate::response::Response;
use crate::util::named_list;

/// Options of the `CREATE` action.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateCollection {
    pub name: String,
    pub num_shards: Option<u32>,
    pub replication_factor: Option<u32>,
    pub config_name: Option<String>,
    /// `compositeId` or `implicit`.
    pub router_name: Option<String>,
    /// Shard names for the implicit router.
    pub shards: Vec<String>,
    pub max_shards_per_node: Option<u32>,
    /// Collection properties, sent as `property.<name>`.
    pub properties: Vec<(String, String)>,
}

impl CreateCollection {
    pub fn new<S: Into<String>>(name: S) -> Self {
        CreateCollection {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_num_shards(mut self, num_shards: u32) -> Self {
        self.num_shards = Some(num_shards);
        self
    }

    pub fn with_replication_factor(mut self, replication_factor: u32) -> Self {
        self.replication_factor = Some(replication_factor);
        self
    }

    pub fn with_config_name<S: Into<String>>(mut self, config_name: S) -> Self {
        self.config_name = Some(config_name.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CollectionsAction {
    Create(CreateCollection),
    Delete {
        name: String,
    },
    Reload {
        name: String,
    },
    List,
    /// Cluster state, optionally narrowed to a collection, shard or route.
    ClusterStatus {
        collection: Option<String>,
        shard: Option<String>,
        route: Option<String>,
    },
    CreateShard {
        collection: String,
        shard: String,
        create_node_set: Option<String>,
    },
    DeleteShard {
        collection: String,
        shard: String,
    },
}

impl CollectionsAction {
    pub fn name(&self) -> &'static str {
        match self {
            CollectionsAction::Create(_) => "CREATE",
            CollectionsAction::Delete { .. } => "DELETE",
            CollectionsAction::Reload { .. } => "RELOAD",
            CollectionsAction::List => "LIST",
            CollectionsAction::ClusterStatus { .. } => "CLUSTERSTATUS",
            CollectionsAction::CreateShard { .. } => "CREATESHARD",
            CollectionsAction::DeleteShard { .. } => "DELETESHARD",
        }
    }

    fn apply(&self, request: &mut Request) -> Result<()> {
        request.add_param("action", self.name());
        match self {
            CollectionsAction::Create(create) => {
                if create.name.is_empty() {
                    return Err(SolriumError::invalid_argument("CREATE needs a collection name"));
                }
                request.add_param("name", &create.name);
                request.add_param("numShards", create.num_shards);
                request.add_param("replicationFactor", create.replication_factor);
                request.add_param("collection.configName", create.config_name.as_deref());
                request.add_param("router.name", create.router_name.as_deref());
                request.add_param("shards", create.shards.join(","));
                request.add_param("maxShardsPerNode", create.max_shards_per_node);
                for (key, value) in &create.properties {
                    request.add_param(format!("property.{key}"), value);
                }
            }
            CollectionsAction::Delete { name } | CollectionsAction::Reload { name } => {
                if name.is_empty() {
                    return Err(SolriumError::invalid_argument(format!(
                        "{} needs a collection name",
                        self.name()
                    )));
                }
                request.add_param("name", name);
            }
            CollectionsAction::List => {}
            CollectionsAction::ClusterStatus {
                collection,
                shard,
                route,
            } => {
                request.add_param("collection", collection.as_deref());
                request.add_param("shard", shard.as_deref());
                request.add_param("_route_", route.as_deref());
            }
            CollectionsAction::CreateShard {
                collection,
                shard,
                create_node_set,
            } => {
                request.add_param("collection", collection);
                request.add_param("shard", shard);
                request.add_param("createNodeSet", create_node_set.as_deref());
            }
            CollectionsAction::DeleteShard { collection, shard } => {
                request.add_param("collection", collection);
                request.add_param("shard", shard);
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionsQuery {
    options: QueryOptions,
    action: Option<CollectionsAction>,
    async_id: Option<String>,
}

impl_query!(CollectionsQuery, QueryType::Collections);

impl Default for CollectionsQuery {
    fn default() -> Self {
        CollectionsQuery {
            options: QueryOptions::new("admin/collections"),
            action: None,
            async_id: None,
        }
    }
}

impl CollectionsQuery {
    pub fn new() -> Self {
        CollectionsQuery::default()
    }

    pub fn action(&self) -> Option<&CollectionsAction> {
        self.action.as_ref()
    }

    pub fn set_action(&mut self, action: CollectionsAction) -> &mut Self {
        self.action = Some(action);
        self
    }

    pub fn set_async<S: Into<String>>(&mut self, id: S) -> &mut Self {
        self.async_id = Some(id.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReplicaState {
    pub name: String,
    pub core: Option<String>,
    pub node_name: Option<String>,
    pub base_url: Option<String>,
    pub state: Option<String>,
    pub leader: bool,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShardState {
    pub name: String,
    pub range: Option<String>,
    pub state: Option<String>,
    pub replicas: Vec<ReplicaState>,
}

impl ShardState {
    pub fn leader(&self) -> Option<&ReplicaState> {
        self.replicas.iter().find(|r| r.leader)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionState {
    pub name: String,
    pub config_name: Option<String>,
    pub replication_factor: Option<u64>,
    pub router: Option<String>,
    pub shards: Vec<ShardState>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterStatus {
    pub collections: Vec<CollectionState>,
    pub live_nodes: Vec<String>,
    /// alias → collections.
    pub aliases: Vec<(String, String)>,
}

impl ClusterStatus {
    fn parse(cluster: &Value) -> ClusterStatus {
        let collections = named_list::get(cluster, "collections")
            .map(|collections| {
                named_list::entries(collections)
                    .into_iter()
                    .map(|(name, state)| parse_collection(name, state))
                    .collect()
            })
            .unwrap_or_default();
        ClusterStatus {
            collections,
            live_nodes: named_list::get(cluster, "live_nodes")
                .map(named_list::as_string_list)
                .unwrap_or_default(),
            aliases: named_list::get(cluster, "aliases")
                .map(|aliases| {
                    named_list::entries(aliases)
                        .into_iter()
                        .map(|(alias, target)| (alias, named_list::value_to_string(target)))
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    pub fn collection(&self, name: &str) -> Option<&CollectionState> {
        self.collections.iter().find(|c| c.name == name)
    }
}

fn parse_collection(name: String, state: &Value) -> CollectionState {
    let shards = named_list::get(state, "shards")
        .map(|shards| {
            named_list::entries(shards)
                .into_iter()
                .map(|(shard, value)| ShardState {
                    name: shard,
                    range: named_list::get_string(value, "range"),
                    state: named_list::get_string(value, "state"),
                    replicas: named_list::get(value, "replicas")
                        .map(|replicas| {
                            named_list::entries(replicas)
                                .into_iter()
                                .map(|(replica, r)| ReplicaState {
                                    name: replica,
                                    core: named_list::get_string(r, "core"),
                                    node_name: named_list::get_string(r, "node_name"),
                                    base_url: named_list::get_string(r, "base_url"),
                                    state: named_list::get_string(r, "state"),
                                    leader: named_list::get_bool(r, "leader").unwrap_or(false),
                                })
                                .collect()
                        })
                        .unwrap_or_default(),
                })
                .collect()
        })
        .unwrap_or_default();
    CollectionState {
        name,
        config_name: named_list::get_string(state, "configName"),
        replication_factor: named_list::get_u64(state, "replicationFactor"),
        router: named_list::get(state, "router").and_then(|r| named_list::get_string(r, "name")),
        shards,
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionsResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub success: bool,
    /// Collection names of LIST requests.
    pub collections: Vec<String>,
    /// Cluster state of CLUSTERSTATUS requests.
    pub cluster_status: Option<ClusterStatus>,
}

impl_query_result!(CollectionsResult);

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionsRequestBuilder;

impl RequestBuilder for CollectionsRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<CollectionsQuery>(query, QueryType::Collections)?;
        let action = query
            .action
            .as_ref()
            .ok_or_else(|| SolriumError::invalid_argument("A collections query needs an action"))?;
        let mut request = create_request(query, Method::Get);
        request.set_is_server_request(true);
        action.apply(&mut request)?;
        request.add_param("async", query.async_id.as_deref());
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CollectionsResponseParser;

impl ResponseParser for CollectionsResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<CollectionsQuery>(query, QueryType::Collections)?;
        let header = ResponseHeader::from_data(&data);
        Ok(SolrResult::Collections(CollectionsResult {
            success: header.status == 0 && named_list::get(&data, "failure").is_none(),
            collections: named_list::get(&data, "collections")
                .map(named_list::as_string_list)
                .unwrap_or_default(),
            cluster_status: named_list::get(&data, "cluster").map(ClusterStatus::parse),
            header,
            data,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request() {
        let mut query = CollectionsQuery::new();
        query.set_action(CollectionsAction::Create(
            CreateCollection::new("books")
                .with_num_shards(2)
                .with_replication_factor(1)
                .with_config_name("_default"),
        ));
        let request = CollectionsRequestBuilder.build(&query).unwrap();
        assert!(request.is_server_request());
        assert_eq!(request.handler(), "admin/collections");
        assert_eq!(request.param("action"), Some("CREATE"));
        assert_eq!(request.param("numShards"), Some("2"));
        assert_eq!(request.param("collection.configName"), Some("_default"));
        assert!(request.param("shards").is_none());
    }

    #[test]
    fn test_parse_list() {
        let mut query = CollectionsQuery::new();
        query.set_action(CollectionsAction::List);
        let data = json!({"responseHeader": {"status": 0, "QTime": 1}, "collections": ["books", "films"]});
        let result = CollectionsResponseParser.parse(&query, &Response::ok(""), data).unwrap();
        let result = CollectionsResult::try_from(result).unwrap();
        assert!(result.success);
        assert_eq!(result.collections, vec!["books", "films"]);
    }

    #[test]
    fn test_parse_cluster_status() {
        let data = json!({"cluster": {
            "collections": {"books": {
                "configName": "_default",
                "router": {"name": "compositeId"},
                "shards": {"shard1": {"range": "80000000-7fffffff", "state": "active", "replicas": {
                    "core_node1": {"core": "books_shard1_replica_n1", "node_name": "10.0.0.1:8983_solr",
                                   "base_url": "http://10.0.0.1:8983/solr", "state": "active", "leader": "true"},
                    "core_node2": {"core": "books_shard1_replica_n2", "state": "recovering"}
                }}}
            }},
            "live_nodes": ["10.0.0.1:8983_solr"],
            "aliases": {"library": "books"}
        }});
        let result = CollectionsResponseParser
            .parse(&CollectionsQuery::new(), &Response::ok(""), data)
            .unwrap();
        let status = CollectionsResult::try_from(result).unwrap().cluster_status.unwrap();
        let books = status.collection("books").unwrap();
        assert_eq!(books.router.as_deref(), Some("compositeId"));
        let shard = &books.shards[0];
        assert_eq!(shard.replicas.len(), 2);
        assert_eq!(shard.leader().unwrap().name, "core_node1");
        assert_eq!(status.live_nodes.len(), 1);
        assert_eq!(status.aliases, vec![("library".to_string(), "books".to_string())]);
    }
}
