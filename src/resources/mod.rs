//! Resource and datasource handlers.
//!
//! Each product line owns one module with its typed configurations and the
//! handlers built on them. Handlers share the [`ProviderContext`], exchange
//! attributes through [`ResourceData`] and wait on remote state through the
//! [`crate::poller`].

pub mod certificate;
pub mod config_inspection;
mod context;
mod data;
mod handler;
pub mod kafka;
pub mod kubernetes;
pub mod states;
pub mod tgw_peering;
pub mod transit_gateway;
mod validation;

pub use context::ProviderContext;
pub use data::ResourceData;
pub use handler::{DataSourceHandler, ResourceHandler};

#[cfg(test)]
pub(crate) use context::test_support;
