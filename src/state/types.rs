//! State types for tracking managed resources.
//!
//! The state records, per block address, the remote identifier and the
//! attributes observed after the last successful call, so the next run can
//! read, update or delete the same remote object.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Current version of the state format.
pub const STATE_VERSION: &str = "1.0";

/// The complete provider state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderState {
    /// State format version.
    pub version: String,
    /// Project the records belong to.
    pub project_id: String,
    /// Managed resources, in the order they were first created.
    #[serde(default)]
    pub resources: Vec<ResourceRecord>,
    /// Results of the last datasource reads.
    #[serde(default)]
    pub data: Vec<ResourceRecord>,
    /// When the state was last updated.
    pub last_updated: DateTime<Utc>,
}

/// One recorded resource or datasource instance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResourceRecord {
    /// Registered type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Local block name.
    pub name: String,
    /// Remote identifier.
    pub id: String,
    /// Attributes observed after the last call.
    #[serde(default)]
    pub attributes: Map<String, Value>,
    /// Hash of the block configuration last applied.
    pub config_hash: String,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl ProviderState {
    /// Creates a new empty state for a project.
    #[must_use]
    pub fn new(project_id: &str) -> Self {
        Self {
            version: STATE_VERSION.to_string(),
            project_id: project_id.to_string(),
            resources: Vec::new(),
            data: Vec::new(),
            last_updated: Utc::now(),
        }
    }

    /// Gets a resource by type and name.
    #[must_use]
    pub fn resource(&self, type_name: &str, name: &str) -> Option<&ResourceRecord> {
        self.resources
            .iter()
            .find(|r| r.type_name == type_name && r.name == name)
    }

    /// Adds or replaces a resource, keeping its position when replaced.
    pub fn set_resource(&mut self, record: ResourceRecord) {
        upsert(&mut self.resources, record);
        self.last_updated = Utc::now();
    }

    /// Removes a resource by type and name.
    pub fn remove_resource(&mut self, type_name: &str, name: &str) -> Option<ResourceRecord> {
        let index = self
            .resources
            .iter()
            .position(|r| r.type_name == type_name && r.name == name)?;
        self.last_updated = Utc::now();
        Some(self.resources.remove(index))
    }

    /// Adds or replaces a datasource result.
    pub fn set_data(&mut self, record: ResourceRecord) {
        upsert(&mut self.data, record);
        self.last_updated = Utc::now();
    }

    /// Returns all resource addresses.
    #[must_use]
    pub fn addresses(&self) -> Vec<String> {
        self.resources.iter().map(ResourceRecord::address).collect()
    }
}

impl ResourceRecord {
    /// Creates a new record.
    #[must_use]
    pub fn new(
        type_name: &str,
        name: &str,
        id: &str,
        attributes: Map<String, Value>,
        config_hash: &str,
    ) -> Self {
        let now = Utc::now();
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            id: id.to_string(),
            attributes,
            config_hash: config_hash.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns the `type.name` address.
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}.{}", self.type_name, self.name)
    }

    /// Replaces id, attributes and hash, keeping the creation time.
    pub fn refresh(&mut self, id: &str, attributes: Map<String, Value>, config_hash: &str) {
        self.id = id.to_string();
        self.attributes = attributes;
        self.config_hash = config_hash.to_string();
        self.updated_at = Utc::now();
    }
}

fn upsert(records: &mut Vec<ResourceRecord>, record: ResourceRecord) {
    match records
        .iter_mut()
        .find(|r| r.type_name == record.type_name && r.name == record.name)
    {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(type_name: &str, name: &str, id: &str) -> ResourceRecord {
        ResourceRecord::new(type_name, name, id, Map::new(), "hash")
    }

    #[test]
    fn test_set_resource_keeps_order() {
        let mut state = ProviderState::new("PROJECT-1");
        state.set_resource(record("scp_transit_gateway", "hub", "TGW-1"));
        state.set_resource(record("scp_transit_gateway_peering", "link", "TGWP-1"));
        state.set_resource(record("scp_transit_gateway", "hub", "TGW-2"));

        assert_eq!(
            state.addresses(),
            vec!["scp_transit_gateway.hub", "scp_transit_gateway_peering.link"]
        );
        assert_eq!(state.resource("scp_transit_gateway", "hub").unwrap().id, "TGW-2");
    }

    #[test]
    fn test_remove_resource() {
        let mut state = ProviderState::new("PROJECT-1");
        state.set_resource(record("scp_certificate", "web", "CERT-1"));

        assert!(state.remove_resource("scp_certificate", "web").is_some());
        assert!(state.remove_resource("scp_certificate", "web").is_none());
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_refresh_keeps_created_at() {
        let mut rec = record("scp_certificate", "web", "CERT-1");
        let created = rec.created_at;
        rec.refresh("CERT-1", Map::new(), "other");

        assert_eq!(rec.created_at, created);
        assert_eq!(rec.config_hash, "other");
    }

    #[test]
    fn test_record_serializes_type_key() {
        let value = serde_json::to_value(record("scp_certificate", "web", "CERT-1")).unwrap();
        assert_eq!(value["type"], "scp_certificate");
    }
}
