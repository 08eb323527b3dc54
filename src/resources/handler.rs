//! Handler traits implemented by every resource and datasource type.

use async_trait::async_trait;

use super::context::ProviderContext;
use super::data::ResourceData;
use crate::error::Result;

/// CRUD entry points of one resource type.
///
/// Every verb leaves `data` consistent with the last observed remote
/// snapshot. The identifier is cleared only when the resource is confirmed
/// gone.
#[async_trait]
pub trait ResourceHandler: Send + Sync {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// Creates the remote resource and populates `data` from it.
    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;

    /// Refreshes `data`. Clears the id when the resource is gone.
    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;

    /// Applies changed attributes in place.
    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;

    /// Deletes the remote resource and clears the id.
    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;
}

/// Read entry point of one datasource type.
#[async_trait]
pub trait DataSourceHandler: Send + Sync {
    /// Registered type name.
    fn type_name(&self) -> &'static str;

    /// Looks up the data and stores it, with a fresh id, in `data`.
    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()>;
}
