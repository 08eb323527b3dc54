//! Kubeconfig retrieval for Kubernetes Engine clusters.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;
use validator::Validate;

use super::context::ProviderContext;
use super::data::ResourceData;
use super::handler::{DataSourceHandler, ResourceHandler};
use crate::error::{ResourceError, Result};

#[derive(Debug, Deserialize, Validate)]
struct KubeconfigConfig {
    #[validate(length(min = 1, message = "kubernetes_engine_id is required"))]
    kubernetes_engine_id: String,
    #[validate(length(min = 1, message = "kubeconfig_type is required"))]
    kubeconfig_type: String,
}

/// `scp_kubernetes_admin_kubeconfig`: administrator kubeconfig, fetched
/// once at create time.
#[derive(Debug, Default)]
pub struct AdminKubeconfigResource;

#[async_trait]
impl ResourceHandler for AdminKubeconfigResource {
    fn type_name(&self) -> &'static str {
        "scp_kubernetes_admin_kubeconfig"
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: KubeconfigConfig = data.decode(self.type_name())?;

        info!(
            "Fetching {} admin kubeconfig of engine {}",
            config.kubeconfig_type, config.kubernetes_engine_id
        );
        let kubeconfig = ctx
            .client()
            .get_admin_kubeconfig(&config.kubernetes_engine_id, &config.kubeconfig_type)
            .await?
            .into_body();

        data.set("kube_config", kubeconfig)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }

    async fn read(&self, _ctx: &ProviderContext, _data: &mut ResourceData) -> Result<()> {
        Ok(())
    }

    async fn update(&self, _ctx: &ProviderContext, _data: &mut ResourceData) -> Result<()> {
        Err(ResourceError::unsupported(
            self.type_name(),
            "kubeconfig inputs cannot change, recreate the resource instead",
        )
        .into())
    }

    async fn delete(&self, _ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        data.clear_id();
        Ok(())
    }
}

/// `scp_kubernetes_user_kubeconfig` datasource: the caller's kubeconfig.
#[derive(Debug, Default)]
pub struct UserKubeconfigDataSource;

#[async_trait]
impl DataSourceHandler for UserKubeconfigDataSource {
    fn type_name(&self) -> &'static str {
        "scp_kubernetes_user_kubeconfig"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: KubeconfigConfig = data.decode(self.type_name())?;
        let kubeconfig = ctx
            .client()
            .get_user_kubeconfig(&config.kubernetes_engine_id, &config.kubeconfig_type)
            .await?
            .into_body();

        data.set("kube_config", kubeconfig)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::context::test_support::context_for;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const KUBECONFIG: &str = "apiVersion: v1\nkind: Config\n";

    #[tokio::test]
    async fn test_admin_kubeconfig_lifecycle() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kubernetes-engine/v2/engines/ENGINE-1/kubeconfig"))
            .and(query_param("kubeconfigType", "private"))
            .respond_with(ResponseTemplate::new(200).set_body_string(KUBECONFIG))
            .expect(1)
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({
            "kubernetes_engine_id": "ENGINE-1",
            "kubeconfig_type": "private"
        }));
        let resource = AdminKubeconfigResource;
        resource.create(&ctx, &mut data).await.expect("create");

        let id = data.id().map(str::to_string).expect("id");
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        assert_eq!(data.get_str("kube_config"), Some(KUBECONFIG));

        resource.read(&ctx, &mut data).await.expect("read");
        assert_eq!(data.id(), Some(id.as_str()));

        resource.delete(&ctx, &mut data).await.expect("delete");
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn test_user_kubeconfig_gets_fresh_id_each_read() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/kubernetes-engine/v2/engines/ENGINE-1/kubeconfig/user"))
            .respond_with(ResponseTemplate::new(200).set_body_string(KUBECONFIG))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let config = json!({"kubernetes_engine_id": "ENGINE-1", "kubeconfig_type": "public"});

        let mut first = ResourceData::new(&config);
        UserKubeconfigDataSource.read(&ctx, &mut first).await.expect("read");
        let mut second = ResourceData::new(&config);
        UserKubeconfigDataSource.read(&ctx, &mut second).await.expect("read");

        assert_ne!(first.id(), second.id());
        assert_eq!(second.get_str("kube_config"), Some(KUBECONFIG));
    }

    #[tokio::test]
    async fn test_missing_engine_id_is_rejected() {
        let server = MockServer::start().await;
        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({"kubeconfig_type": "private"}));

        assert!(UserKubeconfigDataSource.read(&ctx, &mut data).await.is_err());
    }
}
