//! Service directory backed by the Kubernetes API.

use async_trait::async_trait;
use k8s_openapi::api::core::v1::Service;
use kube::api::ListParams;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Api, Client, Config};
use std::path::Path;

use lookout_common::{DirectoryError, RawService};

use super::DirectoryClient;
use crate::config::ClusterMode;

/// Lists `v1/Service` objects through the Kubernetes API server
pub struct KubernetesDirectory {
    client: Client,
}

impl KubernetesDirectory {
    /// Connect with the service account of the pod we run in
    pub fn in_cluster() -> Result<Self, DirectoryError> {
        let config = Config::incluster().map_err(|e| connect_error(ClusterMode::In, e))?;
        Self::from_config(ClusterMode::In, config)
    }

    /// Connect with a kubeconfig file, or the default one when `path` is unset
    pub async fn from_kubeconfig(path: Option<&Path>) -> Result<Self, DirectoryError> {
        let options = KubeConfigOptions::default();
        let config = match path {
            Some(path) => {
                let kubeconfig =
                    Kubeconfig::read_from(path).map_err(|e| connect_error(ClusterMode::Out, e))?;
                Config::from_custom_kubeconfig(kubeconfig, &options)
                    .await
                    .map_err(|e| connect_error(ClusterMode::Out, e))?
            }
            None => Config::from_kubeconfig(&options)
                .await
                .map_err(|e| connect_error(ClusterMode::Out, e))?,
        };
        Self::from_config(ClusterMode::Out, config)
    }

    fn from_config(mode: ClusterMode, config: Config) -> Result<Self, DirectoryError> {
        let cluster_url = config.cluster_url.to_string();
        let client = Client::try_from(config).map_err(|e| connect_error(mode, e))?;
        tracing::info!(mode = %mode, cluster_url = %cluster_url, "Kubernetes client created");
        Ok(Self { client })
    }
}

#[async_trait]
impl DirectoryClient for KubernetesDirectory {
    async fn list_services(&self, namespace: &str) -> Result<Vec<RawService>, DirectoryError> {
        let api: Api<Service> = Api::namespaced(self.client.clone(), namespace);
        let services = api
            .list(&ListParams::default())
            .await
            .map_err(|e| DirectoryError::List {
                namespace: namespace.to_string(),
                message: e.to_string(),
            })?;

        Ok(services.items.into_iter().filter_map(raw_service).collect())
    }
}

fn connect_error(mode: ClusterMode, error: impl std::fmt::Display) -> DirectoryError {
    DirectoryError::Connect {
        mode: mode.to_string(),
        message: error.to_string(),
    }
}

/// Reduce a Kubernetes service to its name and ports
fn raw_service(service: Service) -> Option<RawService> {
    let name = service.metadata.name?;
    let ports = service
        .spec
        .and_then(|spec| spec.ports)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|port| u16::try_from(port.port).ok())
        .collect();

    Some(RawService { name, ports })
}
