//! Core admin API (`admin/cores`).
//!
//! ```
//! use solrium::query::CoreAdminQuery;
//! use solrium::query::server::CoreAdminAction;
//!
//! let mut query = CoreAdminQuery::new();
//! query
//!     .set_action(CoreAdminAction::Reload { core: "books".into() })
//!     .set_async("reload-books-1");
//! ```

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
pub struct CreateCore {
    pub name: String,
    pub instance_dir: Option<String>,
    pub config: Option<String>,
    pub schema: Option<String>,
    pub data_dir: Option<String>,
    pub config_set: Option<String>,
    pub collection: Option<String>,
    pub shard: Option<String>,
    /// Core properties, sent as `property.<name>`.
    pub properties: Vec<(String, String)>,
}

impl CreateCore {
    pub fn new<S: Into<String>>(name: S) -> Self {
        CreateCore {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_instance_dir<S: Into<String>>(mut self, dir: S) -> Self {
        self.instance_dir = Some(dir.into());
        self
    }

    pub fn with_config_set<S: Into<String>>(mut self, config_set: S) -> Self {
        self.config_set = Some(config_set.into());
        self
    }

    pub fn with_property<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.properties.push((key.into(), value.into()));
        self
    }
}

/// Options of the `SPLIT` action. Give either target paths or target
/// cores; ranges or a split key are optional.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SplitCore {
    pub core: String,
    pub paths: Vec<String>,
    pub target_cores: Vec<String>,
    pub ranges: Option<String>,
    pub split_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoreAdminAction {
    /// Status of one core, or of all cores when `core` is `None`.
    Status {
        core: Option<String>,
        index_info: Option<bool>,
    },
    Create(CreateCore),
    Reload {
        core: String,
    },
    Rename {
        core: String,
        other: String,
    },
    Swap {
        core: String,
        other: String,
    },
    Unload {
        core: String,
        delete_index: Option<bool>,
        delete_data_dir: Option<bool>,
        delete_instance_dir: Option<bool>,
    },
    MergeIndexes {
        core: String,
        index_dirs: Vec<String>,
        src_cores: Vec<String>,
    },
    Split(SplitCore),
    /// Status of an async request.
    RequestStatus {
        request_id: String,
    },
    RequestRecovery {
        core: String,
    },
}

impl CoreAdminAction {
    pub fn name(&self) -> &'static str {
        match self {
            CoreAdminAction::Status { .. } => "STATUS",
            CoreAdminAction::Create(_) => "CREATE",
            CoreAdminAction::Reload { .. } => "RELOAD",
            CoreAdminAction::Rename { .. } => "RENAME",
            CoreAdminAction::Swap { .. } => "SWAP",
            CoreAdminAction::Unload { .. } => "UNLOAD",
            CoreAdminAction::MergeIndexes { .. } => "MERGEINDEXES",
            CoreAdminAction::Split(_) => "SPLIT",
            CoreAdminAction::RequestStatus { .. } => "REQUESTSTATUS",
            CoreAdminAction::RequestRecovery { .. } => "REQUESTRECOVERY",
        }
    }

    fn apply(&self, request: &mut Request) -> Result<()> {
        request.add_param("action", self.name());
        match self {
            CoreAdminAction::Status { core, index_info } => {
                request.add_param("core", core.as_deref());
                request.add_param("indexInfo", *index_info);
            }
            CoreAdminAction::Create(create) => {
                require("name", &create.name)?;
                request.add_param("name", &create.name);
                request.add_param("instanceDir", create.instance_dir.as_deref());
                request.add_param("config", create.config.as_deref());
                request.add_param("schema", create.schema.as_deref());
                request.add_param("dataDir", create.data_dir.as_deref());
                request.add_param("configSet", create.config_set.as_deref());
                request.add_param("collection", create.collection.as_deref());
                request.add_param("shard", create.shard.as_deref());
                for (key, value) in &create.properties {
                    request.add_param(format!("property.{key}"), value);
                }
            }
            CoreAdminAction::Reload { core } | CoreAdminAction::RequestRecovery { core } => {
                require("core", core)?;
                request.add_param("core", core);
            }
            CoreAdminAction::Rename { core, other } | CoreAdminAction::Swap { core, other } => {
                require("core", core)?;
                require("other", other)?;
                request.add_param("core", core);
                request.add_param("other", other);
            }
            CoreAdminAction::Unload {
                core,
                delete_index,
                delete_data_dir,
                delete_instance_dir,
            } => {
                require("core", core)?;
                request.add_param("core", core);
                request.add_param("deleteIndex", *delete_index);
                request.add_param("deleteDataDir", *delete_data_dir);
                request.add_param("deleteInstanceDir", *delete_instance_dir);
            }
            CoreAdminAction::MergeIndexes {
                core,
                index_dirs,
                src_cores,
            } => {
                require("core", core)?;
                if index_dirs.is_empty() && src_cores.is_empty() {
                    return Err(SolriumError::invalid_argument(
                        "MERGEINDEXES needs index directories or source cores",
                    ));
                }
                request.add_param("core", core);
                request.params_mut().add_all("indexDir", index_dirs);
                request.params_mut().add_all("srcCore", src_cores);
            }
            CoreAdminAction::Split(split) => {
                require("core", &split.core)?;
                request.add_param("core", &split.core);
                request.params_mut().add_all("path", &split.paths);
                request.params_mut().add_all("targetCore", &split.target_cores);
                request.add_param("ranges", split.ranges.as_deref());
                request.add_param("split.key", split.split_key.as_deref());
            }
            CoreAdminAction::RequestStatus { request_id } => {
                require("requestid", request_id)?;
                request.add_param("requestid", request_id);
            }
        }
        Ok(())
    }
}

fn require(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        Err(SolriumError::invalid_argument(format!(
            "Core admin parameter '{name}' must not be empty"
        )))
    } else {
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoreAdminQuery {
    options: QueryOptions,
    action: Option<CoreAdminAction>,
    async_id: Option<String>,
}

impl_query!(CoreAdminQuery, QueryType::CoreAdmin);

impl Default for CoreAdminQuery {
    fn default() -> Self {
        CoreAdminQuery {
            options: QueryOptions::new("admin/cores"),
            action: None,
            async_id: None,
        }
    }
}

impl CoreAdminQuery {
    pub fn new() -> Self {
        CoreAdminQuery::default()
    }

    pub fn action(&self) -> Option<&CoreAdminAction> {
        self.action.as_ref()
    }

    pub fn set_action(&mut self, action: CoreAdminAction) -> &mut Self {
        self.action = Some(action);
        self
    }

    /// Run the action asynchronously under this request id.
    pub fn set_async<S: Into<String>>(&mut self, id: S) -> &mut Self {
        self.async_id = Some(id.into());
        self
    }

    /// Shorthand for a status request.
    pub fn status<S: Into<String>>(core: Option<S>) -> Self {
        let mut query = CoreAdminQuery::new();
        query.set_action(CoreAdminAction::Status {
            core: core.map(Into::into),
            index_info: None,
        });
        query
    }
}

/// Status of one core.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreStatus {
    pub name: String,
    pub instance_dir: Option<String>,
    pub data_dir: Option<String>,
    pub config: Option<String>,
    pub schema: Option<String>,
    pub start_time: Option<String>,
    pub uptime: Option<u64>,
    pub num_docs: Option<u64>,
    pub max_doc: Option<u64>,
    pub deleted_docs: Option<u64>,
    pub version: Option<i64>,
    pub size_in_bytes: Option<u64>,
    pub current: Option<bool>,
}

impl CoreStatus {
    fn parse(name: String, value: &Value) -> CoreStatus {
        let index = named_list::get(value, "index").unwrap_or(&Value::Null);
        CoreStatus {
            name: named_list::get_string(value, "name").unwrap_or(name),
            instance_dir: named_list::get_string(value, "instanceDir"),
            data_dir: named_list::get_string(value, "dataDir"),
            config: named_list::get_string(value, "config"),
            schema: named_list::get_string(value, "schema"),
            start_time: named_list::get_string(value, "startTime"),
            uptime: named_list::get_u64(value, "uptime"),
            num_docs: named_list::get_u64(index, "numDocs"),
            max_doc: named_list::get_u64(index, "maxDoc"),
            deleted_docs: named_list::get_u64(index, "deletedDocs"),
            version: named_list::get_i64(index, "version"),
            size_in_bytes: named_list::get_u64(index, "sizeInBytes"),
            current: named_list::get_bool(index, "current"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreAdminResult {
    pub header: ResponseHeader,
    pub data: Value,
    pub success: bool,
    /// Per-core status of STATUS requests.
    pub cores: Vec<CoreStatus>,
    /// State of an async request (`completed`, `running`, `failed`, `notfound`).
    pub request_status: Option<String>,
}

impl_query_result!(CoreAdminResult);

impl CoreAdminResult {
    pub fn core(&self, name: &str) -> Option<&CoreStatus> {
        self.cores.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoreAdminRequestBuilder;

impl RequestBuilder for CoreAdminRequestBuilder {
    fn build(&self, query: &dyn Query) -> Result<Request> {
        let query = downcast_query::<CoreAdminQuery>(query, QueryType::CoreAdmin)?;
        let action = query
            .action
            .as_ref()
            .ok_or_else(|| SolriumError::invalid_argument("A core admin query needs an action"))?;
        let mut request = create_request(query, Method::Get);
        request.set_is_server_request(true);
        action.apply(&mut request)?;
        request.add_param("async", query.async_id.as_deref());
        Ok(request)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CoreAdminResponseParser;

impl ResponseParser for CoreAdminResponseParser {
    fn parse(&self, query: &dyn Query, _response: &Response, data: Value) -> Result<SolrResult> {
        downcast_query::<CoreAdminQuery>(query, QueryType::CoreAdmin)?;
        let header = ResponseHeader::from_data(&data);
        let cores = named_list::get(&data, "status")
            .map(|status| {
                named_list::entries(status)
                    .into_iter()
                    .filter(|(_, core)| !named_list::entries(core).is_empty())
                    .map(|(name, core)| CoreStatus::parse(name, core))
                    .collect()
            })
            .unwrap_or_default();
        Ok(SolrResult::CoreAdmin(CoreAdminResult {
            success: header.status == 0 && named_list::get(&data, "error").is_none(),
            request_status: named_list::get_string(&data, "STATUS"),
            header,
            cores,
            data,
        }))
    }
}
