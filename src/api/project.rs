//! Project facade, used to resolve service zone placement.

use serde::Deserialize;

use super::client::{ApiResponse, ScpClient};
use crate::error::Result;

/// A service zone the project is allowed to use.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServiceZone {
    /// Service zone identifier.
    pub service_zone_id: String,
    /// Block the zone belongs to.
    pub block_id: String,
    /// Display name.
    pub service_zone_name: String,
}

/// Project detail.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectInfo {
    /// Project identifier.
    pub project_id: String,
    /// Project name.
    pub project_name: String,
    /// Usable service zones.
    pub service_zones: Vec<ServiceZone>,
}

impl ProjectInfo {
    /// Returns the block id of a service zone, if the project can use it.
    #[must_use]
    pub fn block_id_of(&self, service_zone_id: &str) -> Option<&str> {
        self.service_zones
            .iter()
            .find(|z| z.service_zone_id == service_zone_id)
            .map(|z| z.block_id.as_str())
            .filter(|b| !b.is_empty())
    }
}

impl ScpClient {
    /// Gets the project this client is scoped to.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn get_project_info(&self) -> Result<ApiResponse<ProjectInfo>> {
        self.get(&format!("/project/v3/projects/{}", self.project_id()), &[])
            .await
    }
}
