//! Explicit table of the resource and datasource types this provider serves.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::resources::certificate::{
    CertificateDataSource, CertificateResource, CertificatesDataSource,
    SelfSignedCertificateResource,
};
use crate::resources::config_inspection::{
    ConfigInspectionDataSource, ConfigInspectionResource, ConfigInspectionsDataSource,
    DiagnosesDataSource, DiagnosisDataSource, DiagnosisRequestDataSource,
};
use crate::resources::kafka::{KafkaClusterDataSource, KafkaClusterResource};
use crate::resources::kubernetes::{AdminKubeconfigResource, UserKubeconfigDataSource};
use crate::resources::tgw_peering::{
    PeeringActionResource, PeeringDetailDataSource, PeeringResource, PeeringsByGatewayDataSource,
    PeeringsDataSource,
};
use crate::resources::transit_gateway::TransitGatewayResource;
use crate::resources::{DataSourceHandler, ResourceHandler};

/// Handlers by type name.
///
/// Built once and passed by reference; nothing registers itself.
#[derive(Clone, Default)]
pub struct Registry {
    resources: BTreeMap<&'static str, Arc<dyn ResourceHandler>>,
    data_sources: BTreeMap<&'static str, Arc<dyn DataSourceHandler>>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .field("data_sources", &self.data_sources.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every type shipped with the provider.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();

        registry.register_resource(CertificateResource);
        registry.register_resource(SelfSignedCertificateResource);
        registry.register_resource(ConfigInspectionResource);
        registry.register_resource(KafkaClusterResource);
        registry.register_resource(TransitGatewayResource);
        registry.register_resource(PeeringResource);
        registry.register_resource(PeeringActionResource::approve());
        registry.register_resource(PeeringActionResource::reject());
        registry.register_resource(PeeringActionResource::cancel());
        registry.register_resource(AdminKubeconfigResource);

        registry.register_data_source(CertificateDataSource);
        registry.register_data_source(CertificatesDataSource);
        registry.register_data_source(ConfigInspectionDataSource);
        registry.register_data_source(ConfigInspectionsDataSource);
        registry.register_data_source(DiagnosisRequestDataSource);
        registry.register_data_source(DiagnosesDataSource);
        registry.register_data_source(DiagnosisDataSource);
        registry.register_data_source(KafkaClusterDataSource);
        registry.register_data_source(PeeringsDataSource);
        registry.register_data_source(PeeringsByGatewayDataSource);
        registry.register_data_source(PeeringDetailDataSource);
        registry.register_data_source(UserKubeconfigDataSource);

        registry
    }

    /// Adds a resource handler, replacing any handler of the same type.
    pub fn register_resource(&mut self, handler: impl ResourceHandler + 'static) {
        self.resources.insert(handler.type_name(), Arc::new(handler));
    }

    /// Adds a datasource handler, replacing any handler of the same type.
    pub fn register_data_source(&mut self, handler: impl DataSourceHandler + 'static) {
        self.data_sources.insert(handler.type_name(), Arc::new(handler));
    }

    /// The resource handler for a type name.
    #[must_use]
    pub fn resource(&self, type_name: &str) -> Option<Arc<dyn ResourceHandler>> {
        self.resources.get(type_name).cloned()
    }

    /// The datasource handler for a type name.
    #[must_use]
    pub fn data_source(&self, type_name: &str) -> Option<Arc<dyn DataSourceHandler>> {
        self.data_sources.get(type_name).cloned()
    }

    /// Registered resource type names, sorted.
    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.resources.keys().copied()
    }

    /// Registered datasource type names, sorted.
    pub fn data_source_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.data_sources.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_covers_every_type() {
        let registry = Registry::builtin();

        assert_eq!(registry.resource_types().count(), 10);
        assert_eq!(registry.data_source_types().count(), 12);
        assert!(registry.resource("scp_transit_gateway_peering_approve").is_some());
        assert!(registry.data_source("scp_config_inspection_diagnoses").is_some());
    }

    #[test]
    fn test_resource_and_datasource_namespaces_are_separate() {
        let registry = Registry::builtin();

        // Same name, different handlers.
        assert!(registry.resource("scp_certificate").is_some());
        assert!(registry.data_source("scp_certificate").is_some());
        assert!(registry.resource("scp_certificates").is_none());
    }

    #[test]
    fn test_unknown_type() {
        assert!(Registry::new().resource("scp_certificate").is_none());
    }
}
