//! Typed facade over the SCP OpenAPI, one module per product line.

pub mod certificate;
pub mod client;
pub mod config_inspection;
pub mod kafka;
pub mod kubernetes;
pub mod project;
pub mod transit_gateway;
pub mod types;

pub use client::{ApiResponse, ScpClient};
pub use types::{AsyncResponse, ListResponse, PageRequest, TagRequest};
