//! Managed Kafka facade.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::{ApiResponse, ScpClient, push_opt};
use super::types::{AsyncResponse, ListResponse, PageRequest, TagRequest};
use crate::error::Result;

const BASE: &str = "/kafka/v3/kafka/clusters";

/// Broker SASL settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerInitialConfigRequest {
    /// SASL account.
    pub broker_sasl_account: String,
    /// SASL password.
    pub broker_sasl_password: String,
    /// Listener port.
    pub broker_port: u16,
}

/// Zookeeper SASL settings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperInitialConfigRequest {
    /// SASL account.
    pub zookeeper_sasl_account: String,
    /// SASL password.
    pub zookeeper_sasl_password: String,
    /// Client port.
    pub zookeeper_port: u16,
}

/// AKHQ console credentials.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AkhqInitialConfigRequest {
    /// Console account.
    pub akhq_account: String,
    /// Console password.
    pub akhq_password: String,
}

/// Initial credentials of the cluster.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KafkaInitialConfigRequest {
    /// Broker settings.
    pub broker_initial_config: BrokerInitialConfigRequest,
    /// Zookeeper settings.
    pub zookeeper_initial_config: ZookeeperInitialConfigRequest,
    /// AKHQ settings, only when AKHQ is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub akhq_initial_config: Option<AkhqInitialConfigRequest>,
}

/// Block storage of a node group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockStorageRequest {
    /// SSD or HDD.
    pub block_storage_type: String,
    /// Size in GB.
    pub block_storage_size: u32,
}

/// One broker node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerNodeRequest {
    /// Node name.
    pub broker_node_name: String,
    /// Public IP used for NAT.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nat_public_ip_id: String,
}

/// One zookeeper node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperNodeRequest {
    /// Node name.
    pub zookeeper_node_name: String,
    /// Public IP used for NAT.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nat_public_ip_id: String,
}

/// Broker node group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrokerNodeGroupRequest {
    /// Server type of every broker.
    pub server_type: String,
    /// Broker nodes.
    pub broker_nodes: Vec<BrokerNodeRequest>,
    /// Data storage.
    pub block_storage: BlockStorageRequest,
}

/// Zookeeper node group.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZookeeperNodeGroupRequest {
    /// Server type of every zookeeper node.
    pub server_type: String,
    /// Zookeeper nodes.
    pub zookeeper_nodes: Vec<ZookeeperNodeRequest>,
    /// Data storage.
    pub block_storage: BlockStorageRequest,
}

/// AKHQ node.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AkhqNodeGroupRequest {
    /// Node name.
    pub akhq_node_name: String,
    /// Public IP used for NAT.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub nat_public_ip_id: String,
    /// Availability zone.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub akhq_availability_zone_name: String,
}

/// Zone placement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityZoneConfigRequest {
    /// DESIGNATED or UNIFORM.
    pub availability_zone_deployment_type: String,
    /// Zone for designated placement.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub availability_zone_name: String,
}

/// Cluster creation request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateKafkaClusterRequest {
    /// Cluster name.
    pub kafka_cluster_name: String,
    /// Service zone.
    pub service_zone_id: String,
    /// Server image.
    pub image_id: String,
    /// Timezone of the servers.
    pub timezone: String,
    /// Contract period.
    pub contract_period: String,
    /// Security groups.
    pub security_group_ids: Vec<String>,
    /// Subnet.
    pub subnet_id: String,
    /// Whether NAT is used.
    pub nat_enabled: bool,
    /// Initial credentials.
    pub kafka_initial_config: KafkaInitialConfigRequest,
    /// Broker group.
    pub broker_node_group: BrokerNodeGroupRequest,
    /// Optional zookeeper group.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zookeeper_node_group: Option<ZookeeperNodeGroupRequest>,
    /// Whether AKHQ is deployed.
    pub akhq_enabled: bool,
    /// AKHQ node.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub akhq_node_group: Option<AkhqNodeGroupRequest>,
    /// Zone placement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone_config: Option<AvailabilityZoneConfigRequest>,
    /// Creation tags.
    pub tags: Vec<TagRequest>,
}

/// Contract section of a cluster.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct Contract {
    pub contract_period: String,
    pub contract_start_date: String,
    pub contract_end_date: String,
    pub next_contract_period: String,
    pub next_contract_end_date: String,
}

/// Broker credentials as reported.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct BrokerInitialConfig {
    pub broker_sasl_account: String,
    pub broker_port: i64,
}

/// Zookeeper credentials as reported.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct ZookeeperInitialConfig {
    pub zookeeper_sasl_account: String,
    pub zookeeper_port: i64,
}

/// AKHQ credentials as reported.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct AkhqInitialConfig {
    pub akhq_account: String,
    pub akhq_port: i64,
}

/// Initial credentials as reported.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct KafkaInitialConfig {
    pub broker_initial_config: BrokerInitialConfig,
    pub zookeeper_initial_config: Option<ZookeeperInitialConfig>,
    pub akhq_initial_config: Option<AkhqInitialConfig>,
}

/// A block storage attached to a node group.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct BlockStorage {
    pub block_storage_group_id: String,
    pub block_storage_name: String,
    pub block_storage_role_type: String,
    pub block_storage_type: String,
    pub block_storage_size: i64,
}

impl BlockStorage {
    /// Whether this is the operating system disk.
    #[must_use]
    pub fn is_os(&self) -> bool {
        self.block_storage_role_type == "OS"
    }
}

/// A broker node.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct BrokerNode {
    pub broker_node_id: String,
    pub broker_node_name: String,
    pub broker_node_state: String,
    pub subnet_ip_address: String,
    pub availability_zone_name: String,
    pub created_by: String,
    pub created_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
}

/// A zookeeper node.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct ZookeeperNode {
    pub zookeeper_node_id: String,
    pub zookeeper_node_name: String,
    pub zookeeper_node_state: String,
    pub subnet_ip_address: String,
    pub availability_zone_name: String,
    pub created_by: String,
    pub created_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
}

/// Broker node group.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct BrokerNodeGroup {
    pub server_type: String,
    pub node_role_type: String,
    pub broker_nodes: Vec<BrokerNode>,
    pub block_storages: Vec<BlockStorage>,
}

/// Zookeeper node group.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct ZookeeperNodeGroup {
    pub server_type: String,
    pub node_role_type: String,
    pub zookeeper_nodes: Vec<ZookeeperNode>,
    pub block_storages: Vec<BlockStorage>,
}

/// AKHQ node.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct AkhqNodeGroup {
    pub akhq_node_id: String,
    pub akhq_node_name: String,
    pub akhq_node_state: String,
    pub block_storage_group_id: String,
    pub block_storage_name: String,
    pub block_storage_role_type: String,
    pub block_storage_size: i64,
    pub block_storage_type: String,
    pub node_role_type: String,
    pub server_type: String,
    pub subnet_ip_address: String,
    pub availability_zone_name: String,
}

/// Maintenance window.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct Maintenance {
    pub maintenance_start_day_of_week: String,
    pub maintenance_start_time: String,
    pub maintenance_period: i64,
}

/// Cluster detail.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct KafkaClusterDetail {
    pub kafka_cluster_id: String,
    pub kafka_cluster_name: String,
    pub kafka_cluster_state: String,
    pub image_id: String,
    pub timezone: String,
    pub vpc_id: String,
    pub subnet_id: String,
    pub security_group_ids: Vec<String>,
    pub database_version: String,
    pub nat_ip_address: String,
    pub contract: Option<Contract>,
    pub kafka_initial_config: KafkaInitialConfig,
    pub broker_node_group: BrokerNodeGroup,
    pub zookeeper_node_group: Option<ZookeeperNodeGroup>,
    pub akhq_node_group: Option<AkhqNodeGroup>,
    pub maintenance: Option<Maintenance>,
    pub project_id: String,
    pub service_zone_id: String,
    pub block_id: String,
    pub created_by: String,
    pub created_dt: Option<DateTime<Utc>>,
    pub modified_by: String,
    pub modified_dt: Option<DateTime<Utc>>,
}

/// Cluster list item.
#[allow(missing_docs)]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all(serialize = "snake_case", deserialize = "camelCase"), default)]
pub struct KafkaClusterSummary {
    pub kafka_cluster_id: String,
    pub kafka_cluster_name: String,
    pub kafka_cluster_state: String,
    pub service_zone_id: String,
    pub created_by: String,
    pub created_dt: Option<DateTime<Utc>>,
}

impl ScpClient {
    /// Lists Kafka clusters, optionally filtered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn list_kafka_clusters(
        &self,
        kafka_cluster_name: Option<&str>,
        page: &PageRequest,
    ) -> Result<ApiResponse<ListResponse<KafkaClusterSummary>>> {
        let mut query = Vec::new();
        push_opt(&mut query, "kafkaClusterName", kafka_cluster_name);
        page.append_to(&mut query);
        self.get(BASE, &query).await
    }

    /// Gets a Kafka cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the cluster is not found or the API call fails.
    pub async fn get_kafka_cluster(
        &self,
        kafka_cluster_id: &str,
    ) -> Result<ApiResponse<KafkaClusterDetail>> {
        self.get(&format!("{BASE}/{kafka_cluster_id}"), &[]).await
    }

    /// Requests a new Kafka cluster. The answer carries no cluster id.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn create_kafka_cluster(
        &self,
        request: &CreateKafkaClusterRequest,
    ) -> Result<ApiResponse<AsyncResponse>> {
        self.post(BASE, Some(request)).await
    }

    /// Requests deletion of a Kafka cluster.
    ///
    /// # Errors
    ///
    /// Returns an error if the API call fails.
    pub async fn delete_kafka_cluster(
        &self,
        kafka_cluster_id: &str,
    ) -> Result<ApiResponse<Option<AsyncResponse>>> {
        self.delete(&format!("{BASE}/{kafka_cluster_id}")).await
    }
}
