//! Configuration specification types for the provider.
//!
//! This module defines the structs that map to the `scp.yaml` manifest:
//! provider credentials, polling policy, and the resource and datasource
//! blocks to reconcile.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Default SCP OpenAPI endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://openapi.samsungsdscloud.com";

/// The root manifest structure.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Provider connection settings.
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Managed resources, applied in declaration order.
    #[serde(default)]
    pub resources: Vec<BlockConfig>,
    /// Datasources, read on every apply.
    #[serde(default)]
    pub data: Vec<BlockConfig>,
}

/// Provider connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct ProviderConfig {
    /// Base URL of the SCP OpenAPI gateway.
    #[serde(default = "default_endpoint")]
    #[validate(url)]
    pub endpoint: String,
    /// Project every request is scoped to.
    #[serde(default)]
    #[validate(length(min = 1, message = "project_id is required"))]
    pub project_id: String,
    /// Access key sent with every request.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Pre-issued bearer token.
    #[serde(default, skip_serializing)]
    pub auth_token: Option<String>,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1, max = 600))]
    pub request_timeout_secs: u64,
    /// Polling policy for asynchronous operations.
    #[serde(default)]
    #[validate(nested)]
    pub poll: PollSettings,
}

/// Polling policy settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct PollSettings {
    /// Seconds between two state checks.
    #[serde(default = "default_interval")]
    #[validate(range(min = 1))]
    pub interval_secs: u64,
    /// Consecutive 5xx responses tolerated before failing.
    #[serde(default = "default_transient_attempts")]
    #[validate(range(min = 1, max = 100))]
    pub transient_attempts: u32,
    /// Seconds between two attempts after a 5xx.
    #[serde(default = "default_interval")]
    pub transient_backoff_secs: u64,
    /// Settle delay before looking up freshly created resources.
    #[serde(default = "default_true")]
    pub settle_delays: bool,
}

/// A single resource or datasource block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BlockConfig {
    /// Registered type name (e.g. `scp_kafka_cluster`).
    #[serde(rename = "type")]
    pub type_name: String,
    /// Local name, unique per type.
    pub name: String,
    /// Attribute values handed to the handler.
    #[serde(default = "empty_object")]
    pub config: serde_json::Value,
}

impl BlockConfig {
    /// Returns the `type.name` address of the block.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}.{}", self.type_name, self.name)
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            project_id: String::new(),
            access_key: None,
            auth_token: None,
            request_timeout_secs: default_request_timeout(),
            poll: PollSettings::default(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            transient_attempts: default_transient_attempts(),
            transient_backoff_secs: default_interval(),
            settle_delays: true,
        }
    }
}

impl PollSettings {
    /// Interval between two state checks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Backoff after a transient failure.
    #[must_use]
    pub const fn transient_backoff(&self) -> Duration {
        Duration::from_secs(self.transient_backoff_secs)
    }
}

fn default_endpoint() -> String {
    String::from(DEFAULT_ENDPOINT)
}

const fn default_request_timeout() -> u64 {
    30
}

const fn default_interval() -> u64 {
    5
}

const fn default_transient_attempts() -> u32 {
    10
}

const fn default_true() -> bool {
    true
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
