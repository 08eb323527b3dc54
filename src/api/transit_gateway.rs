//! Transit Gateway facade: gateways and gateway peerings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiResponse, ScpClient, push_opt};
use super::types::{AsyncResponse, ListResponse, PageRequest, TagRequest};
use crate::error::Result;

const GATEWAYS: &str = "/transit-gateway/v2/transit-gateways";
const PEERINGS: &str = "/transit-gateway/v2/transit-gateway-peerings";

/// State reported by the peering list scan when the peering is gone.
pub const PEERING_DELETED: &str = "DELETED";

/// Gateway creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTransitGatewayRequest {
    /// Bandwidth in Gbps.
    pub bandwidth_gbps: u32,
    /// Service zone.
    pub service_zone_id: String,
    /// Gateway name.
    pub transit_gateway_name: String,
    /// Whether the uplink is enabled.
    pub uplink_enabled: bool,
    /// Free-form description.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub transit_gateway_description: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct UplinkUpdateRequest {
    uplink_enabled: bool,
}

/// Gateway detail.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct TransitGatewayDetail {
    pub transit_gateway_id: String,
    pub transit_gateway_name: String,
    pub transit_gateway_state: String,
    pub transit_gateway_description: String,
    pub bandwidth_gbps: i64,
    pub uplink_enabled: bool,
    pub service_zone_id: String,
    pub project_id: String,
    pub created_by: String,
    pub created_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
}

/// Peering creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePeeringRequest {
    /// Project of the requesting gateway.
    pub requester_project_id: String,
    /// Requesting gateway.
    pub requester_transit_gateway_id: String,
    /// Project of the approving gateway.
    pub approver_project_id: String,
    /// Approving gateway.
    pub approver_transit_gateway_id: String,
    /// Free-form description.
    pub transit_gateway_peering_description: String,
    /// Creation tags.
    pub tags: Vec<TagRequest>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct PeeringDescriptionRequest<'a> {
    transit_gateway_peering_description: &'a str,
}

/// Answer of peering creation and approve, reject and cancel actions.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeeringResponse {
    /// Whether the action was accepted.
    pub success: bool,
    /// Affected peering.
    pub transit_gateway_peering_id: String,
    /// Peering state after the action, when reported.
    pub transit_gateway_peering_state: String,
}

/// Peering detail.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct PeeringDetail {
    pub transit_gateway_peering_id: String,
    pub transit_gateway_peering_name: String,
    pub transit_gateway_peering_description: String,
    pub transit_gateway_peering_state: String,
    pub requester_transit_gateway_id: String,
    pub requester_project_id: String,
    pub approver_transit_gateway_id: String,
    pub approver_project_id: String,
    pub requested_by: String,
    pub requested_dt: Option<DateTime<Utc>>,
    pub approved_by: String,
    pub approved_dt: Option<DateTime<Utc>>,
    pub automated: bool,
    pub project_id: String,
    pub service_zone_id: String,
    pub created_by: String,
    pub created_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
}

/// Peering list item.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct PeeringSummary {
    pub transit_gateway_peering_id: String,
    pub transit_gateway_peering_name: String,
    pub transit_gateway_peering_description: String,
    pub transit_gateway_peering_state: String,
    pub requester_transit_gateway_id: String,
    pub requester_project_id: String,
    pub approver_transit_gateway_id: String,
    pub approver_project_id: String,
    pub automated: bool,
    pub project_id: String,
    pub completed_dt: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
}

/// Filters for the peering list.
#[derive(Debug, Clone, Default)]
pub struct PeeringFilter {
    /// Approving gateway.
    pub approver_transit_gateway_id: Option<String>,
    /// Requesting gateway.
    pub requester_transit_gateway_id: Option<String>,
    /// Peering name.
    pub transit_gateway_peering_name: Option<String>,
    /// Creator.
    pub created_by: Option<String>,
}

impl ScpClient {
    /// Gets a transit gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the gateway is not found or the API call fails.
    pub async fn get_transit_gateway(
        &self,
        transit_gateway_id: &str,
    ) -> Result<ApiResponse<TransitGatewayDetail>> {
        self.get(&format!("{GATEWAYS}/{transit_gateway_id}"), &[]).await
    }

    /// Lists transit gateways by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_transit_gateways(
        &self,
        transit_gateway_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ApiResponse<ListResponse<TransitGatewayDetail>>> {
        let mut query = Vec::new();
        push_opt(&mut query, "transitGatewayName", transit_gateway_name);
        page.append_to(&mut query);
        self.get(GATEWAYS, &query).await
    }

    /// Requests a new transit gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_transit_gateway(
        &self,
        request: &CreateTransitGatewayRequest,
    ) -> Result<ApiResponse<AsyncResponse>> {
        self.post(GATEWAYS, Some(request)).await
    }

    /// Turns the gateway uplink on or off.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn update_transit_gateway_uplink(
        &self,
        transit_gateway_id: &str,
        uplink_enabled: bool,
    ) -> Result<ApiResponse<Option<TransitGatewayDetail>>> {
        self.put(
            &format!("{GATEWAYS}/{transit_gateway_id}/uplink"),
            &UplinkUpdateRequest { uplink_enabled },
        )
        .await
    }

    /// Requests deletion of a transit gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn delete_transit_gateway(
        &self,
        transit_gateway_id: &str,
    ) -> Result<ApiResponse<Option<AsyncResponse>>> {
        self.delete(&format!("{GATEWAYS}/{transit_gateway_id}")).await
    }

    /// Lists peerings.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_peerings(
        &self,
        filter: &PeeringFilter,
        page: &PageRequest,
    ) -> Result<ApiResponse<ListResponse<PeeringSummary>>> {
        let mut query = Vec::new();
        push_opt(
            &mut query,
            "approverTransitGatewayId",
            filter.approver_transit_gateway_id.as_deref(),
        );
        push_opt(
            &mut query,
            "requesterTransitGatewayId",
            filter.requester_transit_gateway_id.as_deref(),
        );
        push_opt(
            &mut query,
            "transitGatewayPeeringName",
            filter.transit_gateway_peering_name.as_deref(),
        );
        push_opt(&mut query, "createdBy", filter.created_by.as_deref());
        page.append_to(&mut query);
        self.get(PEERINGS, &query).await
    }

    /// Lists the peerings of one gateway.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_peerings_by_transit_gateway(
        &self,
        transit_gateway_id: &str,
    ) -> Result<ApiResponse<ListResponse<PeeringSummary>>> {
        self.get(&format!("{GATEWAYS}/{transit_gateway_id}/peerings"), &[])
            .await
    }

    /// Gets a peering.
    ///
    /// # Errors
    ///
    /// Returns an error if the peering is not found or the API call fails.
    pub async fn get_peering(&self, peering_id: &str) -> Result<ApiResponse<PeeringDetail>> {
        self.get(&format!("{PEERINGS}/{peering_id}"), &[]).await
    }

    /// Finds a peering by scanning the first list page.
    ///
    /// Returns [`PEERING_DELETED`] and no snapshot when the id is absent,
    /// since a deleted peering disappears from the list before its detail
    /// endpoint stops answering.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn find_peering_for_delete(
        &self,
        peering_id: &str,
    ) -> Result<(Option<PeeringSummary>, String)> {
        let page = self
            .list_peerings(&PeeringFilter::default(), &PageRequest::new(0, 1000))
            .await?
            .into_body();

        Ok(page
            .contents
            .into_iter()
            .find(|p| p.transit_gateway_peering_id == peering_id)
            .map_or_else(
                || (None, String::from(PEERING_DELETED)),
                |p| {
                    let state = p.transit_gateway_peering_state.clone();
                    (Some(p), state)
                },
            ))
    }

    /// Requests a peering.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_peering(
        &self,
        request: &CreatePeeringRequest,
    ) -> Result<ApiResponse<PeeringResponse>> {
        self.post(PEERINGS, Some(request)).await
    }

    /// Changes the peering description.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn update_peering_description(
        &self,
        peering_id: &str,
        description: &str,
    ) -> Result<ApiResponse<Option<PeeringDetail>>> {
        self.put(
            &format!("{PEERINGS}/{peering_id}/description"),
            &PeeringDescriptionRequest {
                transit_gateway_peering_description: description,
            },
        )
        .await
    }

    /// Deletes a peering.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn delete_peering(&self, peering_id: &str) -> Result<ApiResponse<serde_json::Value>> {
        self.delete(&format!("{PEERINGS}/{peering_id}")).await
    }

    /// Approves a requested peering.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn approve_peering(&self, peering_id: &str) -> Result<ApiResponse<PeeringResponse>> {
        self.peering_action(peering_id, "approve").await
    }

    /// Rejects a requested peering.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn reject_peering(&self, peering_id: &str) -> Result<ApiResponse<PeeringResponse>> {
        self.peering_action(peering_id, "reject").await
    }

    /// Cancels a requested peering.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn cancel_peering(&self, peering_id: &str) -> Result<ApiResponse<PeeringResponse>> {
        self.peering_action(peering_id, "cancel").await
    }

    async fn peering_action(
        &self,
        peering_id: &str,
        action: &str,
    ) -> Result<ApiResponse<PeeringResponse>> {
        self.post::<(), _>(&format!("{PEERINGS}/{peering_id}/{action}"), None)
            .await
    }
}
