//! Transit gateway resource.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, info};
use validator::Validate;

use super::context::ProviderContext;
use super::data::ResourceData;
use super::handler::ResourceHandler;
use super::states::{ACTIVE_TARGET, CREATING_PENDING, DELETED_TARGET, DELETING_PENDING};
use crate::api::transit_gateway::{CreateTransitGatewayRequest, TransitGatewayDetail};
use crate::api::PageRequest;
use crate::error::{ResourceError, Result};
use crate::poller::{self, Observed, PollDescriptor};

/// Attributes that force a new gateway.
const IMMUTABLE: &[&str] = &["name", "service_zone_id", "bandwidth_gbps", "description"];

#[derive(Debug, Deserialize, Validate)]
struct TransitGatewayConfig {
    #[validate(length(min = 3, max = 20, message = "name must be 3 to 20 characters"))]
    name: String,
    #[validate(length(min = 1, message = "service_zone_id is required"))]
    service_zone_id: String,
    #[validate(range(min = 1, message = "bandwidth_gbps must be positive"))]
    bandwidth_gbps: u32,
    #[serde(default)]
    uplink_enabled: bool,
    #[serde(default)]
    #[validate(length(max = 50))]
    description: String,
}

/// `scp_transit_gateway`: a transit gateway.
#[derive(Debug, Default)]
pub struct TransitGatewayResource;

#[async_trait]
impl ResourceHandler for TransitGatewayResource {
    fn type_name(&self) -> &'static str {
        "scp_transit_gateway"
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: TransitGatewayConfig = data.decode(self.type_name())?;

        info!("Creating transit gateway {}", config.name);
        let answer = ctx
            .client()
            .create_transit_gateway(&CreateTransitGatewayRequest {
                bandwidth_gbps: config.bandwidth_gbps,
                service_zone_id: config.service_zone_id,
                transit_gateway_name: config.name.clone(),
                uplink_enabled: config.uplink_enabled,
                transit_gateway_description: config.description,
            })
            .await?
            .into_body();

        let id = if answer.resource_id.is_empty() {
            lookup_by_name(ctx, &config.name).await?
        } else {
            answer.resource_id
        };

        data.set_id(id.clone());

        wait_for_gateway(ctx, &id, CREATING_PENDING, ACTIVE_TARGET, true).await?;
        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Ok(());
        };

        match ctx.client().get_transit_gateway(&id).await {
            Ok(response) => apply_detail(data, &response.into_body()),
            Err(e) if e.is_not_found() => {
                debug!("Transit gateway {id} is gone");
                data.clear_id();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn update(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        if let Some(key) = IMMUTABLE.iter().find(|k| data.has_change(k)) {
            return Err(ResourceError::unsupported(
                self.type_name(),
                format!("{key} cannot be changed in place, only uplink_enabled can"),
            )
            .into());
        }

        let id = data.require_id(self.type_name())?;
        if data.has_change("uplink_enabled") {
            let config: TransitGatewayConfig = data.decode(self.type_name())?;
            info!(
                "Setting uplink of transit gateway {id} to {}",
                config.uplink_enabled
            );
            ctx.client()
                .update_transit_gateway_uplink(&id, config.uplink_enabled)
                .await?;
        }
        self.read(ctx, data).await
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id(self.type_name())?;

        info!("Deleting transit gateway {id}");
        match ctx.client().delete_transit_gateway(&id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => debug!("Transit gateway {id} already deleted"),
            Err(e) => return Err(e),
        }

        wait_for_gateway(ctx, &id, DELETING_PENDING, DELETED_TARGET, false).await?;
        data.clear_id();
        Ok(())
    }
}

async fn lookup_by_name(ctx: &ProviderContext, name: &str) -> Result<String> {
    let list = ctx
        .client()
        .list_transit_gateways(Some(name), &PageRequest::new(0, 1000))
        .await?
        .into_body();

    list.contents
        .into_iter()
        .find(|g| g.transit_gateway_name == name && !g.transit_gateway_id.is_empty())
        .map(|g| g.transit_gateway_id)
        .ok_or_else(|| ResourceError::not_found("transit gateway id not found").into())
}

fn apply_detail(data: &mut ResourceData, detail: &TransitGatewayDetail) -> Result<()> {
    data.set("name", &detail.transit_gateway_name)?;
    data.set("service_zone_id", &detail.service_zone_id)?;
    data.set("bandwidth_gbps", detail.bandwidth_gbps)?;
    data.set("uplink_enabled", detail.uplink_enabled)?;
    data.set("description", &detail.transit_gateway_description)?;
    data.set("state", &detail.transit_gateway_state)
}

async fn wait_for_gateway(
    ctx: &ProviderContext,
    id: &str,
    pending: &'static [&'static str],
    target: &'static [&'static str],
    error_on_not_found: bool,
) -> Result<Option<TransitGatewayDetail>> {
    let descriptor = PollDescriptor::new(format!("transit gateway {id}"), pending, target)
        .error_on_not_found(error_on_not_found);

    poller::wait(&descriptor, ctx.policy(), move || async move {
        let detail = ctx.client().get_transit_gateway(id).await?.into_body();
        let state = detail.transit_gateway_state.clone();
        Ok(Observed::new(detail, state))
    })
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::context::test_support::context_for;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const BASE: &str = "/transit-gateway/v2/transit-gateways";

    fn gateway(state: &str, uplink: bool) -> serde_json::Value {
        json!({
            "transitGatewayId": "TGW-1",
            "transitGatewayName": "corehub",
            "transitGatewayState": state,
            "bandwidthGbps": 1,
            "uplinkEnabled": uplink,
            "serviceZoneId": "ZONE-1"
        })
    }

    fn recorded(uplink: bool) -> serde_json::Map<String, serde_json::Value> {
        let value = json!({
            "name": "corehub",
            "service_zone_id": "ZONE-1",
            "bandwidth_gbps": 1,
            "uplink_enabled": uplink,
            "description": "",
            "state": "ACTIVE"
        });
        value.as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn test_create_waits_for_active() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceId": "TGW-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/TGW-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(gateway("CREATING", false)))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/TGW-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(gateway("ACTIVE", false)))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({
            "name": "corehub",
            "service_zone_id": "ZONE-1",
            "bandwidth_gbps": 1
        }));
        TransitGatewayResource.create(&ctx, &mut data).await.expect("create");

        assert_eq!(data.id(), Some("TGW-1"));
        assert_eq!(data.get_str("state"), Some("ACTIVE"));
    }

    #[tokio::test]
    async fn test_create_keeps_id_when_wait_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"resourceId": "TGW-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/TGW-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(gateway("ERROR", false)))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({
            "name": "corehub",
            "service_zone_id": "ZONE-1",
            "bandwidth_gbps": 1
        }));
        let err = TransitGatewayResource
            .create(&ctx, &mut data)
            .await
            .expect_err("unexpected state");

        assert!(err.to_string().contains("ERROR"));
        assert_eq!(data.id(), Some("TGW-1"));
    }

    #[tokio::test]
    async fn test_create_falls_back_to_name_lookup() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"requestId": "REQ-1"})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contents": [gateway("CREATING", false)],
                "totalCount": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/TGW-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(gateway("ACTIVE", false)))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({
            "name": "corehub",
            "service_zone_id": "ZONE-1",
            "bandwidth_gbps": 1
        }));
        TransitGatewayResource.create(&ctx, &mut data).await.expect("create");
        assert_eq!(data.id(), Some("TGW-1"));
    }

    #[tokio::test]
    async fn test_update_toggles_uplink() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path(format!("{BASE}/TGW-1/uplink")))
            .and(body_json(json!({"uplinkEnabled": true})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/TGW-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(gateway("ACTIVE", true)))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::from_state(
            "TGW-1",
            &recorded(false),
            &json!({"name": "corehub", "service_zone_id": "ZONE-1", "bandwidth_gbps": 1, "uplink_enabled": true}),
        );
        TransitGatewayResource.update(&ctx, &mut data).await.expect("update");
        assert_eq!(data.get("uplink_enabled"), Some(&json!(true)));
    }

    #[tokio::test]
    async fn test_update_rejects_bandwidth_change() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::from_state(
            "TGW-1",
            &recorded(false),
            &json!({"name": "corehub", "service_zone_id": "ZONE-1", "bandwidth_gbps": 10}),
        );
        let err = TransitGatewayResource
            .update(&ctx, &mut data)
            .await
            .expect_err("immutable");
        assert!(err.to_string().contains("bandwidth_gbps"));
    }

    #[tokio::test]
    async fn test_delete_tolerates_absence() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/TGW-1")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/TGW-1")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        for _ in 0..2 {
            let mut data = ResourceData::new(&json!({}));
            data.set_id("TGW-1");
            TransitGatewayResource.delete(&ctx, &mut data).await.expect("delete");
            assert_eq!(data.id(), None);
        }
    }
}
