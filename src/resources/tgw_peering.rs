//! Transit gateway peering resource, peering transitions and datasources.
//!
//! A peering is requested by one gateway owner and approved, rejected or
//! cancelled afterwards. Each transition is modelled as its own resource so
//! that both sides of a peering can be driven from manifests.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use validator::Validate;

use super::context::ProviderContext;
use super::data::ResourceData;
use super::handler::{DataSourceHandler, ResourceHandler};
use super::states::{ACTIVE_TARGET, CREATING_PENDING, DELETED_TARGET, DELETING_PENDING, REQUESTING};
use crate::api::transit_gateway::{CreatePeeringRequest, PeeringDetail, PeeringFilter, PeeringResponse};
use crate::api::types::tag_requests;
use crate::api::{ApiResponse, PageRequest};
use crate::error::{ResourceError, Result};
use crate::poller::{self, Observed, PollDescriptor};

#[derive(Debug, Deserialize, Validate)]
struct PeeringConfig {
    #[validate(length(min = 3, max = 60))]
    requester_transit_gateway_id: String,
    #[validate(length(min = 3, max = 60))]
    approver_transit_gateway_id: String,
    #[validate(length(min = 3, max = 60))]
    requester_project_id: String,
    #[validate(length(min = 3, max = 60))]
    approver_project_id: String,
    #[serde(default)]
    #[validate(length(max = 50))]
    transit_gateway_peering_description: String,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// `scp_transit_gateway_peering`: a peering request between two gateways.
#[derive(Debug, Default)]
pub struct PeeringResource;

#[async_trait]
impl ResourceHandler for PeeringResource {
    fn type_name(&self) -> &'static str {
        "scp_transit_gateway_peering"
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: PeeringConfig = data.decode(self.type_name())?;

        info!(
            "Requesting peering {} -> {}",
            config.requester_transit_gateway_id, config.approver_transit_gateway_id
        );
        let answer = ctx
            .client()
            .create_peering(&CreatePeeringRequest {
                tags: tag_requests(&config.tags),
                requester_project_id: config.requester_project_id,
                requester_transit_gateway_id: config.requester_transit_gateway_id,
                approver_project_id: config.approver_project_id,
                approver_transit_gateway_id: config.approver_transit_gateway_id,
                transit_gateway_peering_description: config.transit_gateway_peering_description,
            })
            .await?
            .into_body();

        if answer.transit_gateway_peering_id.is_empty() {
            return Err(ResourceError::not_found("transit gateway peering id not returned").into());
        }
        data.set_id(answer.transit_gateway_peering_id);
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let Some(detail) = fetch_or_clear(ctx, data).await? else {
            return Ok(());
        };

        data.set("requester_transit_gateway_id", &detail.requester_transit_gateway_id)?;
        data.set("approver_transit_gateway_id", &detail.approver_transit_gateway_id)?;
        data.set("requester_project_id", &detail.requester_project_id)?;
        data.set("approver_project_id", &detail.approver_project_id)?;
        data.set(
            "transit_gateway_peering_description",
            &detail.transit_gateway_peering_description,
        )?;
        data.set("transit_gateway_peering_state", &detail.transit_gateway_peering_state)
    }

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id(self.type_name())?;

        if data.has_change("transit_gateway_peering_description") {
            let config: PeeringConfig = data.decode(self.type_name())?;
            info!("Updating description of peering {id}");
            ctx.client()
                .update_peering_description(&id, &config.transit_gateway_peering_description)
                .await?;
        }
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id(self.type_name())?;

        if data.get_str("transit_gateway_peering_state") == Some(REQUESTING) {
            info!("Cancelling pending peering {id} before deletion");
            ctx.client().cancel_peering(&id).await?;
        }

        info!("Deleting peering {id}");
        match ctx.client().delete_peering(&id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => debug!("Peering {id} already deleted"),
            Err(e) => return Err(e),
        }

        let descriptor = PollDescriptor::new(
            format!("transit gateway peering {id}"),
            DELETING_PENDING,
            DELETED_TARGET,
        );
        let peering_id = id.as_str();
        poller::wait(&descriptor, ctx.policy(), move || async move {
            let (summary, state) = ctx.client().find_peering_for_delete(peering_id).await?;
            Ok(match summary {
                Some(summary) => Observed::new(summary, state),
                None => Observed::state_only(state),
            })
        })
        .await?;

        data.clear_id();
        Ok(())
    }
}

/// Loads the peering behind `data`, clearing the id when it is gone.
async fn fetch_or_clear(ctx: &ProviderContext, data: &mut ResourceData) -> Result<Option<PeeringDetail>> {
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(None);
    };

    match ctx.client().get_peering(&id).await {
        Ok(response) => Ok(Some(response.into_body())),
        Err(e) if e.is_not_found() => {
            debug!("Peering {id} is gone");
            data.clear_id();
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

#[derive(Debug, Deserialize, Validate)]
struct PeeringActionConfig {
    #[validate(length(min = 1, message = "transit_gateway_peering_id is required"))]
    transit_gateway_peering_id: String,
}

/// Transition applied by a peering action resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PeeringAction {
    Approve,
    Reject,
    Cancel,
}

impl PeeringAction {
    const fn verb(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Cancel => "cancel",
        }
    }

    async fn send(self, ctx: &ProviderContext, id: &str) -> Result<ApiResponse<PeeringResponse>> {
        match self {
            Self::Approve => ctx.client().approve_peering(id).await,
            Self::Reject => ctx.client().reject_peering(id).await,
            Self::Cancel => ctx.client().cancel_peering(id).await,
        }
    }
}

/// `scp_transit_gateway_peering_approve`, `_reject` and `_cancel`.
#[derive(Debug)]
pub struct PeeringActionResource {
    type_name: &'static str,
    action: PeeringAction,
}

impl PeeringActionResource {
    /// Approves a requested peering and waits for it to become active.
    #[must_use]
    pub const fn approve() -> Self {
        Self {
            type_name: "scp_transit_gateway_peering_approve",
            action: PeeringAction::Approve,
        }
    }

    /// Rejects a requested peering.
    #[must_use]
    pub const fn reject() -> Self {
        Self {
            type_name: "scp_transit_gateway_peering_reject",
            action: PeeringAction::Reject,
        }
    }

    /// Cancels a peering request.
    #[must_use]
    pub const fn cancel() -> Self {
        Self {
            type_name: "scp_transit_gateway_peering_cancel",
            action: PeeringAction::Cancel,
        }
    }

    async fn apply(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: PeeringActionConfig = data.decode(self.type_name)?;
        let peering_id = config.transit_gateway_peering_id;
        let verb = self.action.verb();

        info!("Sending {verb} for peering {peering_id}");
        let answer = self.action.send(ctx, &peering_id).await?.into_body();
        if !answer.success {
            return Err(ResourceError::ActionRejected {
                action: verb.to_string(),
                peering_id,
            }
            .into());
        }

        if answer.transit_gateway_peering_id.is_empty() {
            data.set_id(peering_id.clone());
        } else {
            data.set_id(answer.transit_gateway_peering_id);
        }

        if self.action == PeeringAction::Approve {
            let descriptor = PollDescriptor::new(
                format!("transit gateway peering {peering_id}"),
                CREATING_PENDING,
                ACTIVE_TARGET,
            );
            let id = peering_id.as_str();
            poller::wait(&descriptor, ctx.policy(), move || async move {
                let detail = ctx.client().get_peering(id).await?.into_body();
                let state = detail.transit_gateway_peering_state.clone();
                Ok(Observed::new(detail, state))
            })
            .await?;
        }

        self.read(ctx, data).await
    }
}

#[async_trait]
impl ResourceHandler for PeeringActionResource {
    fn type_name(&self) -> &'static str {
        self.type_name
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        self.apply(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        if let Some(detail) = fetch_or_clear(ctx, data).await? {
            data.set("transit_gateway_peering_state", detail.transit_gateway_peering_state)?;
        }
        Ok(())
    }

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        match self.action {
            PeeringAction::Approve => self.apply(ctx, data).await,
            PeeringAction::Reject | PeeringAction::Cancel => Err(ResourceError::unsupported(
                self.type_name,
                "Update function is not supported!",
            )
            .into()),
        }
    }

    async fn delete(&self, _ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        data.clear_id();
        Ok(())
    }
}

const fn default_page_size() -> i64 {
    20
}

#[derive(Debug, Deserialize, Validate)]
struct PeeringListConfig {
    #[serde(default)]
    approver_transit_gateway_id: Option<String>,
    #[serde(default)]
    requester_transit_gateway_id: Option<String>,
    #[serde(default)]
    transit_gateway_peering_name: Option<String>,
    #[serde(default)]
    created_by: Option<String>,
    #[serde(default)]
    page: i64,
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1))]
    size: i64,
}

#[derive(Debug, Deserialize, Validate)]
struct GatewayLookup {
    #[validate(length(min = 1, message = "transit_gateway_id is required"))]
    transit_gateway_id: String,
}

#[derive(Debug, Deserialize, Validate)]
struct PeeringLookup {
    #[validate(length(min = 1, message = "transit_gateway_peering_id is required"))]
    transit_gateway_peering_id: String,
}

/// `scp_transit_gateway_peerings` datasource: peerings of the project.
#[derive(Debug, Default)]
pub struct PeeringsDataSource;

/// `scp_transit_gateway_peerings_by_tgw` datasource: peerings of a gateway.
#[derive(Debug, Default)]
pub struct PeeringsByGatewayDataSource;

/// `scp_transit_gateway_peering_detail` datasource: one peering.
#[derive(Debug, Default)]
pub struct PeeringDetailDataSource;

#[async_trait]
impl DataSourceHandler for PeeringsDataSource {
    fn type_name(&self) -> &'static str {
        "scp_transit_gateway_peerings"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: PeeringListConfig = data.decode(self.type_name())?;
        let filter = PeeringFilter {
            approver_transit_gateway_id: config.approver_transit_gateway_id,
            requester_transit_gateway_id: config.requester_transit_gateway_id,
            transit_gateway_peering_name: config.transit_gateway_peering_name,
            created_by: config.created_by,
        };
        let list = ctx
            .client()
            .list_peerings(&filter, &PageRequest::new(config.page, config.size))
            .await?
            .into_body();

        data.set("contents", &list.contents)?;
        data.set("total_count", list.total_count)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[async_trait]
impl DataSourceHandler for PeeringsByGatewayDataSource {
    fn type_name(&self) -> &'static str {
        "scp_transit_gateway_peerings_by_tgw"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let lookup: GatewayLookup = data.decode(self.type_name())?;
        let list = ctx
            .client()
            .list_peerings_by_transit_gateway(&lookup.transit_gateway_id)
            .await?
            .into_body();

        data.set("contents", &list.contents)?;
        data.set("total_count", list.total_count)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[async_trait]
impl DataSourceHandler for PeeringDetailDataSource {
    fn type_name(&self) -> &'static str {
        "scp_transit_gateway_peering_detail"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let lookup: PeeringLookup = data.decode(self.type_name())?;
        let detail = ctx
            .client()
            .get_peering(&lookup.transit_gateway_peering_id)
            .await?
            .into_body();

        data.set_all(&detail)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}
