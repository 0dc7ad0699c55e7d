//! Kubernetes service discovery.
//!
//! Lists services per configured namespace through a [`DirectoryClient`] and
//! turns the ones that survive exclusion into endpoint definitions.

mod engine;
mod kubernetes;
mod memory;
mod worker;

pub use engine::discover;
pub use kubernetes::KubernetesDirectory;
pub use memory::StaticDirectory;
pub use worker::rediscovery_worker;

use async_trait::async_trait;
use lookout_common::{DirectoryError, RawService};

use crate::config::{ClusterMode, DiscoveryConfig};

/// A service directory that can list the services of a namespace
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// List services in `namespace`, in the directory's native order
    async fn list_services(&self, namespace: &str) -> Result<Vec<RawService>, DirectoryError>;
}

/// Create the directory client for the configured cluster mode
pub async fn connect(config: &DiscoveryConfig) -> Result<Box<dyn DirectoryClient>, DirectoryError> {
    let client: Box<dyn DirectoryClient> = match config.cluster_mode {
        ClusterMode::In => Box::new(KubernetesDirectory::in_cluster()?),
        ClusterMode::Out => {
            Box::new(KubernetesDirectory::from_kubeconfig(config.kubeconfig.as_deref()).await?)
        }
        ClusterMode::Mock => Box::new(StaticDirectory::from_mock_services(&config.mock_services)),
    };
    tracing::debug!(mode = %config.cluster_mode, "Service directory client ready");
    Ok(client)
}
