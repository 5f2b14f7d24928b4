//! Query types addressed to the Solr server rather than a core: core
//! admin, collections, managed resources and generic API requests.
//!
//! Core admin and collections requests are "server requests": their URI is
//! built from the endpoint's server URI, so the endpoint needs no core or
//! collection.

pub mod api;
pub mod collections;
pub mod core_admin;
pub mod managed_resources;

pub use api::{ApiQuery, ApiResult};
pub use collections::{CollectionsAction, CollectionsQuery, CollectionsResult};
pub use core_admin::{CoreAdminAction, CoreAdminQuery, CoreAdminResult};
pub use managed_resources::{
    ManagedCommand, ManagedResourcesQuery, ManagedResourcesResult, ManagedStopwordsQuery,
    ManagedStopwordsResult, ManagedSynonymsQuery, ManagedSynonymsResult,
};
