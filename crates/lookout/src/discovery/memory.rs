//! In-memory service directory.

use async_trait::async_trait;
use std::collections::HashMap;

use lookout_common::{DirectoryError, RawService};

use super::DirectoryClient;
use crate::config::MockServiceConfig;

/// Directory serving a fixed set of services, used by the `mock` cluster mode
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    namespaces: HashMap<String, Vec<RawService>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a service to `namespace`, after the ones already there
    pub fn with_service(mut self, namespace: &str, service: RawService) -> Self {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .push(service);
        self
    }

    pub fn from_mock_services(services: &[MockServiceConfig]) -> Self {
        services.iter().fold(Self::new(), |directory, service| {
            directory.with_service(
                &service.namespace,
                RawService::new(service.name.clone()).with_ports(service.ports.clone()),
            )
        })
    }
}

#[async_trait]
impl DirectoryClient for StaticDirectory {
    async fn list_services(&self, namespace: &str) -> Result<Vec<RawService>, DirectoryError> {
        Ok(self.namespaces.get(namespace).cloned().unwrap_or_default())
    }
}
