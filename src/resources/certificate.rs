//! Certificate Manager resources and datasources.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{debug, info};
use validator::Validate;

use super::context::ProviderContext;
use super::data::ResourceData;
use super::handler::{DataSourceHandler, ResourceHandler};
use super::states::{CERTIFICATE_DELETED_TARGET, NO_PENDING};
use crate::api::certificate::{
    CertificateDetail, CertificateFilter, CreateCertificateRequest, CreateSelfSignedRequest,
    Recipient,
};
use crate::api::types::tag_requests;
use crate::api::PageRequest;
use crate::error::{ResourceError, Result};
use crate::poller::{self, Observed, PollDescriptor};

const UPDATE_NOT_IMPLEMENTED: &str = "Update function is not implemented";

/// Expiry notification recipient as written in a manifest.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct RecipientConfig {
    email: String,
    user_id: String,
    user_name: String,
}

impl From<&RecipientConfig> for Recipient {
    fn from(r: &RecipientConfig) -> Self {
        Self {
            email: r.email.clone(),
            user_id: r.user_id.clone(),
            user_name: r.user_name.clone(),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
struct CertificateConfig {
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    #[validate(length(min = 1, message = "key is required"))]
    key: String,
    #[validate(length(min = 1, message = "body is required"))]
    body: String,
    #[serde(default)]
    chain: String,
    #[serde(default)]
    recipients: Vec<RecipientConfig>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize, Validate)]
struct SelfSignedConfig {
    #[validate(length(min = 1, message = "name is required"))]
    name: String,
    #[validate(length(min = 1, message = "common_name is required"))]
    common_name: String,
    #[validate(length(min = 1, message = "organization_name is required"))]
    organization_name: String,
    #[validate(length(min = 1, message = "start_date is required"))]
    start_date: String,
    #[validate(length(min = 1, message = "expiration_date is required"))]
    expiration_date: String,
    #[serde(default)]
    recipients: Vec<RecipientConfig>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

/// `scp_certificate`: imports a CA-issued certificate.
#[derive(Debug, Default)]
pub struct CertificateResource;

/// `scp_certificate_self_sign`: issues a self-signed certificate.
#[derive(Debug, Default)]
pub struct SelfSignedCertificateResource;

#[async_trait]
impl ResourceHandler for CertificateResource {
    fn type_name(&self) -> &'static str {
        "scp_certificate"
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: CertificateConfig = data.decode(self.type_name())?;

        info!("Importing certificate {}", config.name);
        let created = ctx
            .client()
            .create_certificate(&CreateCertificateRequest {
                certificate_name: config.name,
                private_key: config.key,
                public_certificate: config.body,
                certificate_chain: config.chain,
                recipients: config.recipients.iter().map(Recipient::from).collect(),
                tags: tag_requests(&config.tags),
            })
            .await?
            .into_body();

        set_created_id(data, created)?;
        read_certificate(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        read_certificate(ctx, data).await
    }

    async fn update(&self, _ctx: &ProviderContext, _data: &mut ResourceData) -> Result<()> {
        Err(ResourceError::unsupported(self.type_name(), UPDATE_NOT_IMPLEMENTED).into())
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        delete_certificate(ctx, data, self.type_name()).await
    }
}

#[async_trait]
impl ResourceHandler for SelfSignedCertificateResource {
    fn type_name(&self) -> &'static str {
        "scp_certificate_self_sign"
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: SelfSignedConfig = data.decode(self.type_name())?;

        info!("Issuing self-signed certificate {}", config.name);
        let created = ctx
            .client()
            .create_self_signed_certificate(&CreateSelfSignedRequest {
                certificate_name: config.name,
                common_name: config.common_name,
                organization_name: config.organization_name,
                certificate_start_date: config.start_date,
                certificate_expiration_date: config.expiration_date,
                recipients: config.recipients.iter().map(Recipient::from).collect(),
                tags: tag_requests(&config.tags),
            })
            .await?
            .into_body();

        set_created_id(data, created)?;
        read_certificate(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        read_certificate(ctx, data).await
    }

    async fn update(&self, _ctx: &ProviderContext, _data: &mut ResourceData) -> Result<()> {
        Err(ResourceError::unsupported(self.type_name(), UPDATE_NOT_IMPLEMENTED).into())
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        delete_certificate(ctx, data, self.type_name()).await
    }
}

fn set_created_id(data: &mut ResourceData, created: CertificateDetail) -> Result<()> {
    if created.certificate_id.is_empty() {
        return Err(ResourceError::not_found("certificate id not returned").into());
    }
    data.set_id(created.certificate_id);
    Ok(())
}

async fn read_certificate(ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
    let Some(id) = data.id().map(str::to_string) else {
        return Ok(());
    };

    match ctx.client().get_certificate(&id).await {
        Ok(response) => {
            let detail = response.into_body();
            data.set("name", detail.certificate_name)?;
            data.set("certificate_state", detail.certificate_state)
        }
        Err(e) if e.is_not_found() => {
            debug!("Certificate {id} is gone");
            data.clear_id();
            Ok(())
        }
        Err(e) => Err(e),
    }
}

async fn delete_certificate(
    ctx: &ProviderContext,
    data: &mut ResourceData,
    resource_type: &str,
) -> Result<()> {
    let id = data.require_id(resource_type)?;

    info!("Deleting certificate {id}");
    match ctx.client().delete_certificate(&id).await {
        Ok(_) => {}
        Err(e) if e.is_not_found() => debug!("Certificate {id} already deleted"),
        Err(e) => return Err(e),
    }

    wait_for_certificate(ctx, &id).await?;
    data.clear_id();
    Ok(())
}

/// Waits until the certificate is deleted or released.
async fn wait_for_certificate(ctx: &ProviderContext, id: &str) -> Result<Option<CertificateDetail>> {
    let descriptor = PollDescriptor::new(
        format!("certificate {id}"),
        NO_PENDING,
        CERTIFICATE_DELETED_TARGET,
    )
    .error_on_not_found(false);

    poller::wait(&descriptor, ctx.policy(), move || async move {
        let detail = ctx.client().get_certificate(id).await?.into_body();
        let state = detail.certificate_state.clone();
        Ok(Observed::new(detail, state))
    })
    .await
}

#[derive(Debug, Deserialize, Validate)]
struct CertificateLookup {
    #[validate(length(min = 1, message = "certificate_id is required"))]
    certificate_id: String,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
struct CertificateListConfig {
    certificate_name: Option<String>,
    common_name: Option<String>,
}

/// `scp_certificate` datasource: one certificate in full.
#[derive(Debug, Default)]
pub struct CertificateDataSource;

/// `scp_certificates` datasource: certificates of the project.
#[derive(Debug, Default)]
pub struct CertificatesDataSource;

#[async_trait]
impl DataSourceHandler for CertificateDataSource {
    fn type_name(&self) -> &'static str {
        "scp_certificate"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let lookup: CertificateLookup = data.decode(self.type_name())?;
        let detail = ctx
            .client()
            .get_certificate(&lookup.certificate_id)
            .await?
            .into_body();

        data.set_all(&detail)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[async_trait]
impl DataSourceHandler for CertificatesDataSource {
    fn type_name(&self) -> &'static str {
        "scp_certificates"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: CertificateListConfig = data.decode(self.type_name())?;
        let filter = CertificateFilter {
            certificate_name: config.certificate_name,
            common_name: config.common_name,
        };
        let list = ctx
            .client()
            .list_certificates(&filter, &PageRequest::new(0, 10000).sorted_by("createdDt:desc"))
            .await?
            .into_body();

        data.set("contents", &list.contents)?;
        data.set("total_count", list.total_count)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}
