//! Managed Kafka cluster resource and datasource.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{debug, info};
use validator::Validate;

use super::context::ProviderContext;
use super::data::ResourceData;
use super::handler::{DataSourceHandler, ResourceHandler};
use super::states::{DATABASE_PROCESSING_STATES, DELETED_TARGET, KAFKA_SETTLE, RUNNING_TARGET};
use super::validation;
use crate::api::kafka::{
    AkhqInitialConfigRequest, AkhqNodeGroupRequest, AvailabilityZoneConfigRequest, BlockStorage,
    BlockStorageRequest, BrokerInitialConfigRequest, BrokerNodeGroupRequest, BrokerNodeRequest,
    CreateKafkaClusterRequest, KafkaClusterDetail, KafkaInitialConfigRequest,
    ZookeeperInitialConfigRequest, ZookeeperNodeGroupRequest, ZookeeperNodeRequest,
};
use crate::api::types::tag_requests;
use crate::api::PageRequest;
use crate::error::{ResourceError, Result};
use crate::poller::{self, Observed, PollDescriptor};

const fn default_broker_port() -> u16 {
    9092
}

const fn default_zookeeper_port() -> u16 {
    2181
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct BrokerNodeConfig {
    #[validate(custom(function = "validation::node_name"))]
    broker_node_name: String,
    #[serde(default)]
    nat_public_ip_id: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct ZookeeperNodeConfig {
    #[validate(custom(function = "validation::node_name"))]
    zookeeper_node_name: String,
    #[serde(default)]
    nat_public_ip_id: String,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
struct BlockStorageConfig {
    #[validate(custom(function = "validation::block_storage_type"))]
    block_storage_type: String,
    #[validate(range(min = 10, max = 5120))]
    block_storage_size: u32,
}

impl From<&BlockStorageConfig> for BlockStorageRequest {
    fn from(b: &BlockStorageConfig) -> Self {
        Self {
            block_storage_type: b.block_storage_type.clone(),
            block_storage_size: b.block_storage_size,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
struct AkhqNodeConfig {
    #[validate(custom(function = "validation::node_name"))]
    akhq_node_name: String,
    #[serde(default)]
    nat_public_ip_id: String,
    #[serde(default)]
    #[validate(custom(function = "validation::availability_zone_name"))]
    akhq_availability_zone_name: String,
}

#[derive(Debug, Deserialize, Validate)]
struct AvailabilityZoneConfig {
    #[validate(custom(function = "validation::availability_zone_deployment_type"))]
    availability_zone_deployment_type: String,
    #[serde(default)]
    #[validate(custom(function = "validation::availability_zone_name"))]
    availability_zone_name: String,
}

#[derive(Debug, Deserialize, Validate)]
struct KafkaClusterConfig {
    #[validate(custom(function = "validation::name_3_to_20_alpha"))]
    kafka_cluster_name: String,
    #[validate(length(min = 1, message = "service_zone_id is required"))]
    service_zone_id: String,
    #[validate(length(min = 1, message = "image_id is required"))]
    image_id: String,
    #[validate(custom(function = "validation::contract_period"))]
    contract_period: String,
    #[validate(length(min = 1, message = "subnet_id is required"))]
    subnet_id: String,
    #[validate(length(min = 1, message = "security_group_ids is required"))]
    security_group_ids: Vec<String>,
    #[serde(default)]
    nat_enabled: bool,
    #[validate(length(min = 1, message = "timezone is required"))]
    timezone: String,

    #[validate(custom(function = "validation::lower_alpha_2_to_20"))]
    broker_sasl_account: String,
    #[validate(custom(function = "validation::password"))]
    broker_sasl_password: String,
    #[serde(default = "default_broker_port")]
    #[validate(range(min = 1024))]
    broker_port: u16,
    #[validate(custom(function = "validation::lower_alpha_2_to_20"))]
    zookeeper_sasl_account: String,
    #[validate(custom(function = "validation::password"))]
    zookeeper_sasl_password: String,
    #[serde(default = "default_zookeeper_port")]
    #[validate(range(min = 1024))]
    zookeeper_port: u16,

    #[validate(length(min = 1, message = "broker_server_type is required"))]
    broker_server_type: String,
    #[validate(length(min = 1, max = 10), nested)]
    broker_nodes: Vec<BrokerNodeConfig>,
    #[validate(length(equal = 1), nested)]
    broker_block_storages: Vec<BlockStorageConfig>,

    #[serde(default)]
    zookeeper_server_type: String,
    #[serde(default)]
    #[validate(length(equal = 3), nested)]
    zookeeper_nodes: Option<Vec<ZookeeperNodeConfig>>,
    #[serde(default)]
    #[validate(length(equal = 1), nested)]
    zookeeper_block_storages: Option<Vec<BlockStorageConfig>>,

    akhq_enabled: bool,
    #[serde(default)]
    #[validate(custom(function = "validation::lower_alpha_2_to_20"))]
    akhq_account: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validation::password"))]
    akhq_password: Option<String>,
    #[serde(default)]
    #[validate(nested)]
    akhq_node: Option<AkhqNodeConfig>,

    #[serde(default)]
    #[validate(nested)]
    availability_zone_config: Option<AvailabilityZoneConfig>,
    #[serde(default)]
    tags: BTreeMap<String, String>,
}

impl KafkaClusterConfig {
    /// Zookeeper group when fully specified, none when fully absent.
    fn zookeeper_group(&self) -> Result<Option<ZookeeperNodeGroupRequest>> {
        let nodes = self.zookeeper_nodes.as_deref().unwrap_or_default();
        let storage = self.zookeeper_block_storages.as_deref().unwrap_or_default();
        let any = !self.zookeeper_server_type.is_empty() || !nodes.is_empty() || !storage.is_empty();
        let all = !self.zookeeper_server_type.is_empty() && !nodes.is_empty() && !storage.is_empty();

        if !any {
            return Ok(None);
        }
        if !all {
            return Err(ResourceError::precondition(
                "zookeeper_server_type, zookeeper_nodes, zookeeper_block_storages are required to use the zookeeper node.",
            )
            .into());
        }

        Ok(Some(ZookeeperNodeGroupRequest {
            server_type: self.zookeeper_server_type.clone(),
            zookeeper_nodes: nodes
                .iter()
                .map(|n| ZookeeperNodeRequest {
                    zookeeper_node_name: n.zookeeper_node_name.clone(),
                    nat_public_ip_id: n.nat_public_ip_id.clone(),
                })
                .collect(),
            block_storage: BlockStorageRequest::from(&storage[0]),
        }))
    }

    /// AKHQ credentials and node when enabled.
    fn akhq(&self) -> Result<Option<(AkhqInitialConfigRequest, AkhqNodeGroupRequest)>> {
        if !self.akhq_enabled {
            return Ok(None);
        }

        match (&self.akhq_account, &self.akhq_password, &self.akhq_node) {
            (Some(account), Some(password), Some(node))
                if !account.is_empty() && !password.is_empty() =>
            {
                Ok(Some((
                    AkhqInitialConfigRequest {
                        akhq_account: account.clone(),
                        akhq_password: password.clone(),
                    },
                    AkhqNodeGroupRequest {
                        akhq_node_name: node.akhq_node_name.clone(),
                        nat_public_ip_id: node.nat_public_ip_id.clone(),
                        akhq_availability_zone_name: node.akhq_availability_zone_name.clone(),
                    },
                )))
            }
            _ => Err(ResourceError::precondition(
                "akhq_account, akhq_password, akhq_node are required to enable the AKHQ.",
            )
            .into()),
        }
    }

    fn into_request(
        self,
        zookeeper: Option<ZookeeperNodeGroupRequest>,
        akhq: Option<(AkhqInitialConfigRequest, AkhqNodeGroupRequest)>,
    ) -> CreateKafkaClusterRequest {
        let (akhq_initial_config, akhq_node_group) = akhq.unzip();
        // Exactly one entry after validation.
        let broker_storage = BlockStorageRequest::from(&self.broker_block_storages[0]);

        CreateKafkaClusterRequest {
            kafka_initial_config: KafkaInitialConfigRequest {
                broker_initial_config: BrokerInitialConfigRequest {
                    broker_sasl_account: self.broker_sasl_account,
                    broker_sasl_password: self.broker_sasl_password,
                    broker_port: self.broker_port,
                },
                zookeeper_initial_config: ZookeeperInitialConfigRequest {
                    zookeeper_sasl_account: self.zookeeper_sasl_account,
                    zookeeper_sasl_password: self.zookeeper_sasl_password,
                    zookeeper_port: self.zookeeper_port,
                },
                akhq_initial_config,
            },
            broker_node_group: BrokerNodeGroupRequest {
                server_type: self.broker_server_type,
                broker_nodes: self
                    .broker_nodes
                    .into_iter()
                    .map(|n| BrokerNodeRequest {
                        broker_node_name: n.broker_node_name,
                        nat_public_ip_id: n.nat_public_ip_id,
                    })
                    .collect(),
                block_storage: broker_storage,
            },
            zookeeper_node_group: zookeeper,
            akhq_enabled: self.akhq_enabled,
            akhq_node_group,
            availability_zone_config: self.availability_zone_config.map(|az| {
                AvailabilityZoneConfigRequest {
                    availability_zone_deployment_type: az.availability_zone_deployment_type,
                    availability_zone_name: az.availability_zone_name,
                }
            }),
            tags: tag_requests(&self.tags),
            kafka_cluster_name: self.kafka_cluster_name,
            service_zone_id: self.service_zone_id,
            image_id: self.image_id,
            timezone: self.timezone,
            contract_period: self.contract_period,
            security_group_ids: self.security_group_ids,
            subnet_id: self.subnet_id,
            nat_enabled: self.nat_enabled,
        }
    }
}

/// `scp_kafka_cluster`: a managed Kafka cluster.
#[derive(Debug, Default)]
pub struct KafkaClusterResource;

#[async_trait]
impl ResourceHandler for KafkaClusterResource {
    fn type_name(&self) -> &'static str {
        "scp_kafka_cluster"
    }

    async fn create(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let config: KafkaClusterConfig = data.decode(self.type_name())?;
        let zookeeper = config.zookeeper_group()?;
        let akhq = config.akhq()?;

        let project = ctx.client().get_project_info().await?.into_body();
        if project.block_id_of(&config.service_zone_id).is_none() {
            return Err(ResourceError::not_found("current service block not found").into());
        }

        let name = config.kafka_cluster_name.clone();
        info!("Creating kafka cluster {name}");
        ctx.client()
            .create_kafka_cluster(&config.into_request(zookeeper, akhq))
            .await?;

        ctx.settle(KAFKA_SETTLE).await;

        // The create answer carries no cluster id; look it up by name.
        let list = ctx
            .client()
            .list_kafka_clusters(Some(&name), &PageRequest::new(0, 1000))
            .await?
            .into_body();
        let Some(found) = list.contents.into_iter().next() else {
            return Err(ResourceError::not_found("no pending create found").into());
        };
        if found.kafka_cluster_id.is_empty() {
            return Err(ResourceError::not_found("kafka cluster id not found").into());
        }

        let id = found.kafka_cluster_id;
        data.set_id(id.clone());

        wait_for_kafka(ctx, &id, RUNNING_TARGET, true).await?;
        info!("Kafka cluster {name} is running as {id}");

        self.read(ctx, data).await
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let Some(id) = data.id().map(str::to_string) else {
            return Ok(());
        };

        let detail = match ctx.client().get_kafka_cluster(&id).await {
            Ok(response) => response.into_body(),
            Err(e) if e.is_not_found() => {
                debug!("Kafka cluster {id} is gone");
                data.clear_id();
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        if detail.broker_node_group.broker_nodes.is_empty() {
            return Err(ResourceError::not_found("Kafka is not found").into());
        }
        apply_detail(data, &detail)
    }

    async fn update(&self, _ctx: &ProviderContext, _data: &mut ResourceData) -> Result<()> {
        Err(ResourceError::unsupported(
            self.type_name(),
            "Kafka cluster attributes cannot be changed in place",
        )
        .into())
    }

    async fn delete(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let id = data.require_id(self.type_name())?;

        info!("Deleting kafka cluster {id}");
        match ctx.client().delete_kafka_cluster(&id).await {
            Ok(_) => {}
            Err(e) if e.is_not_found() => debug!("Kafka cluster {id} already deleted"),
            Err(e) => return Err(e),
        }

        wait_for_kafka(ctx, &id, DELETED_TARGET, false).await?;
        data.clear_id();
        Ok(())
    }
}

fn apply_detail(data: &mut ResourceData, detail: &KafkaClusterDetail) -> Result<()> {
    data.set("kafka_cluster_name", &detail.kafka_cluster_name)?;
    data.set("kafka_cluster_state", &detail.kafka_cluster_state)?;
    data.set("service_zone_id", &detail.service_zone_id)?;
    data.set("image_id", &detail.image_id)?;
    if let Some(contract) = &detail.contract {
        data.set("contract_period", &contract.contract_period)?;
    }
    data.set("vpc_id", &detail.vpc_id)?;
    data.set("subnet_id", &detail.subnet_id)?;
    data.set("security_group_ids", &detail.security_group_ids)?;
    data.set("timezone", &detail.timezone)?;

    let initial = &detail.kafka_initial_config;
    data.set("broker_sasl_account", &initial.broker_initial_config.broker_sasl_account)?;
    data.set("broker_port", initial.broker_initial_config.broker_port)?;
    if let Some(zookeeper) = &initial.zookeeper_initial_config {
        data.set("zookeeper_sasl_account", &zookeeper.zookeeper_sasl_account)?;
        data.set("zookeeper_port", zookeeper.zookeeper_port)?;
    }

    let brokers = &detail.broker_node_group;
    data.set("broker_server_type", &brokers.server_type)?;
    let nodes: Vec<_> = brokers
        .broker_nodes
        .iter()
        .map(|n| {
            json!({
                "broker_node_name": n.broker_node_name,
                "availability_zone_name": n.availability_zone_name,
            })
        })
        .collect();
    data.set("broker_nodes", nodes)?;
    data.set("broker_block_storages", data_storages(&brokers.block_storages))?;

    if let Some(group) = &detail.zookeeper_node_group {
        data.set("zookeeper_server_type", &group.server_type)?;
        let nodes: Vec<_> = group
            .zookeeper_nodes
            .iter()
            .map(|n| {
                json!({
                    "zookeeper_node_name": n.zookeeper_node_name,
                    "availability_zone_name": n.availability_zone_name,
                })
            })
            .collect();
        data.set("zookeeper_nodes", nodes)?;
        data.set("zookeeper_block_storages", data_storages(&group.block_storages))?;
    }

    if let Some(akhq) = &detail.akhq_node_group {
        if let Some(credentials) = &initial.akhq_initial_config {
            data.set("akhq_account", &credentials.akhq_account)?;
            data.set("akhq_port", credentials.akhq_port)?;
        }
        data.set(
            "akhq_node",
            json!({
                "akhq_node_name": akhq.akhq_node_name,
                "akhq_availability_zone_name": akhq.availability_zone_name,
                "akhq_server_type": akhq.server_type,
            }),
        )?;
    }
    Ok(())
}

/// Data disks of a node group, without the OS disk.
fn data_storages(storages: &[BlockStorage]) -> Vec<serde_json::Value> {
    storages
        .iter()
        .filter(|s| !s.is_os())
        .map(|s| {
            json!({
                "block_storage_type": s.block_storage_type,
                "block_storage_size": s.block_storage_size,
                "block_storage_group_id": s.block_storage_group_id,
            })
        })
        .collect()
}

async fn wait_for_kafka(
    ctx: &ProviderContext,
    id: &str,
    target: &'static [&'static str],
    error_on_not_found: bool,
) -> Result<Option<KafkaClusterDetail>> {
    let descriptor = PollDescriptor::new(
        format!("kafka cluster {id}"),
        DATABASE_PROCESSING_STATES,
        target,
    )
    .error_on_not_found(error_on_not_found);

    poller::wait(&descriptor, ctx.policy(), move || async move {
        let detail = ctx.client().get_kafka_cluster(id).await?.into_body();
        let state = detail.kafka_cluster_state.clone();
        Ok(Observed::new(detail, state))
    })
    .await
}

#[derive(Debug, Deserialize, Validate)]
struct KafkaLookup {
    #[validate(length(min = 1, message = "kafka_cluster_id is required"))]
    kafka_cluster_id: String,
}

/// `scp_kafka_cluster` datasource: one cluster in full.
#[derive(Debug, Default)]
pub struct KafkaClusterDataSource;

#[async_trait]
impl DataSourceHandler for KafkaClusterDataSource {
    fn type_name(&self) -> &'static str {
        "scp_kafka_cluster"
    }

    async fn read(&self, ctx: &ProviderContext, data: &mut ResourceData) -> Result<()> {
        let lookup: KafkaLookup = data.decode(self.type_name())?;
        let detail = ctx
            .client()
            .get_kafka_cluster(&lookup.kafka_cluster_id)
            .await?
            .into_body();

        if detail.broker_node_group.broker_nodes.is_empty() {
            return Err(ResourceError::not_found("no server found").into());
        }

        data.set_all(&detail)?;
        data.set_id(uuid::Uuid::new_v4().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::context::test_support::context_for;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, Respond, ResponseTemplate};

    const BASE: &str = "/kafka/v3/kafka/clusters";

    fn cluster_config() -> serde_json::Value {
        json!({
            "kafka_cluster_name": "orders",
            "service_zone_id": "ZONE-1",
            "image_id": "IMAGE-1",
            "contract_period": "None",
            "subnet_id": "SUBNET-1",
            "security_group_ids": ["SG-1"],
            "timezone": "Asia/Seoul",
            "broker_sasl_account": "broker",
            "broker_sasl_password": "Broker#2024",
            "zookeeper_sasl_account": "keeper",
            "zookeeper_sasl_password": "Keeper#2024",
            "broker_server_type": "db1v2m4",
            "broker_nodes": [{"broker_node_name": "broker-01"}],
            "broker_block_storages": [{"block_storage_type": "SSD", "block_storage_size": 100}],
            "akhq_enabled": false
        })
    }

    fn detail(state: &str) -> serde_json::Value {
        json!({
            "kafkaClusterId": "KAFKA-1",
            "kafkaClusterName": "orders",
            "kafkaClusterState": state,
            "brokerNodeGroup": {
                "serverType": "db1v2m4",
                "brokerNodes": [{"brokerNodeName": "broker-01", "availabilityZoneName": "AZ1"}],
                "blockStorages": [
                    {"blockStorageRoleType": "OS", "blockStorageSize": 50},
                    {"blockStorageRoleType": "DATA", "blockStorageType": "SSD", "blockStorageSize": 100}
                ]
            },
            "kafkaInitialConfig": {"brokerInitialConfig": {"brokerSaslAccount": "broker", "brokerPort": 9092}}
        })
    }

    /// Answers with the given states in order, repeating the last one.
    struct StateSequence {
        states: Vec<&'static str>,
        calls: Arc<AtomicUsize>,
    }

    impl Respond for StateSequence {
        fn respond(&self, _request: &wiremock::Request) -> ResponseTemplate {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            let state = self.states[n.min(self.states.len() - 1)];
            ResponseTemplate::new(200).set_body_json(detail(state))
        }
    }

    async fn mount_project(server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/project/v3/projects/PROJECT-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "projectId": "PROJECT-test",
                "serviceZones": [{"serviceZoneId": "ZONE-1", "blockId": "BLOCK-1"}]
            })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_create_waits_until_running() {
        let server = MockServer::start().await;
        mount_project(&server).await;
        Mock::given(method("POST"))
            .and(path(BASE))
            .and(body_partial_json(json!({
                "kafkaClusterName": "orders",
                "kafkaInitialConfig": {"brokerInitialConfig": {"brokerPort": 9092}},
                "brokerNodeGroup": {"blockStorage": {"blockStorageType": "SSD", "blockStorageSize": 100}},
                "akhqEnabled": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"requestId": "REQ-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(BASE))
            .and(query_param("kafkaClusterName", "orders"))
            .and(query_param("size", "1000"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contents": [{"kafkaClusterId": "KAFKA-1", "kafkaClusterName": "orders"}],
                "totalCount": 1
            })))
            .mount(&server)
            .await;

        let calls = Arc::new(AtomicUsize::new(0));
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(StateSequence {
                states: vec!["CREATING", "CREATING", "RUNNING"],
                calls: Arc::clone(&calls),
            })
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&cluster_config());
        KafkaClusterResource.create(&ctx, &mut data).await.expect("create");

        // Three polls, then the read-back.
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(data.id(), Some("KAFKA-1"));
        assert_eq!(data.get_str("kafka_cluster_state"), Some("RUNNING"));
        let storages = data.get("broker_block_storages").expect("storages");
        assert_eq!(storages.as_array().map(Vec::len), Some(1));
        assert_eq!(storages[0]["block_storage_type"], "SSD");
    }

    #[tokio::test]
    async fn test_create_keeps_id_when_wait_fails() {
        let server = MockServer::start().await;
        mount_project(&server).await;
        Mock::given(method("POST"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"requestId": "REQ-1"})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(BASE))
            .and(query_param("kafkaClusterName", "orders"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "contents": [{"kafkaClusterId": "KAFKA-1", "kafkaClusterName": "orders"}],
                "totalCount": 1
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(StateSequence {
                states: vec!["CREATING", "ERROR"],
                calls: Arc::new(AtomicUsize::new(0)),
            })
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&cluster_config());
        let err = KafkaClusterResource
            .create(&ctx, &mut data)
            .await
            .expect_err("unexpected state");

        assert!(err.to_string().contains("ERROR"));
        assert_eq!(data.id(), Some("KAFKA-1"));
    }

    #[tokio::test]
    async fn test_partial_zookeeper_group_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut config = cluster_config();
        config["zookeeper_server_type"] = json!("db1v2m4");

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&config);
        let err = KafkaClusterResource
            .create(&ctx, &mut data)
            .await
            .expect_err("partial zookeeper");
        assert!(err.to_string().contains("zookeeper_server_type, zookeeper_nodes"));
    }

    #[tokio::test]
    async fn test_akhq_requires_credentials() {
        let server = MockServer::start().await;
        let mut config = cluster_config();
        config["akhq_enabled"] = json!(true);
        config["akhq_account"] = json!("console");

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&config);
        let err = KafkaClusterResource
            .create(&ctx, &mut data)
            .await
            .expect_err("akhq");
        assert!(err.to_string().contains("required to enable the AKHQ"));
    }

    #[tokio::test]
    async fn test_invalid_fields_are_rejected() {
        let server = MockServer::start().await;
        let ctx = context_for(&server.uri());

        for (field, value) in [
            ("kafka_cluster_name", json!("or")),
            ("broker_port", json!(80)),
            ("contract_period", json!("2 Year")),
            ("broker_nodes", json!([])),
        ] {
            let mut config = cluster_config();
            config[field] = value;
            let mut data = ResourceData::new(&config);
            assert!(
                KafkaClusterResource.create(&ctx, &mut data).await.is_err(),
                "{field} should be rejected"
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_service_zone_fails() {
        let server = MockServer::start().await;
        mount_project(&server).await;

        let mut config = cluster_config();
        config["service_zone_id"] = json!("ZONE-9");

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&config);
        let err = KafkaClusterResource
            .create(&ctx, &mut data)
            .await
            .expect_err("no block");
        assert!(err.to_string().contains("current service block not found"));
    }

    #[tokio::test]
    async fn test_create_without_listed_cluster_fails() {
        let server = MockServer::start().await;
        mount_project(&server).await;
        Mock::given(method("POST"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(BASE))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"contents": []})))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&cluster_config());
        let err = KafkaClusterResource
            .create(&ctx, &mut data)
            .await
            .expect_err("nothing listed");
        assert!(err.to_string().contains("no pending create found"));
    }

    #[tokio::test]
    async fn test_read_without_brokers_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"kafkaClusterId": "KAFKA-1"})),
            )
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&cluster_config());
        data.set_id("KAFKA-1");
        let err = KafkaClusterResource.read(&ctx, &mut data).await.expect_err("no brokers");
        assert!(err.to_string().contains("Kafka is not found"));
    }

    #[tokio::test]
    async fn test_update_is_unsupported() {
        let server = MockServer::start().await;
        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&cluster_config());
        data.set_id("KAFKA-1");

        assert!(KafkaClusterResource.update(&ctx, &mut data).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_waits_for_absence() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail("TERMINATING")))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&cluster_config());
        data.set_id("KAFKA-1");
        KafkaClusterResource.delete(&ctx, &mut data).await.expect("delete");
        assert_eq!(data.id(), None);
    }

    #[tokio::test]
    async fn test_datasource_without_brokers_fails() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({"kafka_cluster_id": "KAFKA-1"}));
        let err = KafkaClusterDataSource.read(&ctx, &mut data).await.expect_err("empty");
        assert!(err.to_string().contains("no server found"));
    }

    #[tokio::test]
    async fn test_datasource_copies_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{BASE}/KAFKA-1")))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail("RUNNING")))
            .mount(&server)
            .await;

        let ctx = context_for(&server.uri());
        let mut data = ResourceData::new(&json!({"kafka_cluster_id": "KAFKA-1"}));
        KafkaClusterDataSource.read(&ctx, &mut data).await.expect("read");

        assert_eq!(data.get_str("kafka_cluster_state"), Some("RUNNING"));
        assert_eq!(
            data.get("broker_node_group").expect("group")["broker_nodes"][0]["broker_node_name"],
            "broker-01"
        );
    }
}
