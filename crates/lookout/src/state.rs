//! Application state and shared resources.

use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

use crate::config::AppConfig;
use crate::discovery;
use lookout_common::{DirectoryError, EndpointCatalog, HealthRegistry, HealthStatus};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,

    /// Aggregate health, written by the check scheduler and read by `/health`
    pub health: Arc<HealthRegistry>,

    /// Endpoints currently handed to the check scheduler
    pub catalog: Arc<RwLock<EndpointCatalog>>,

    /// Held for a whole discovery pass so refreshes never interleave
    refresh_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        let health = Arc::new(HealthRegistry::new().with_json(config.health.json));

        Self {
            config: Arc::new(config),
            health,
            catalog: Arc::new(RwLock::new(EndpointCatalog::default())),
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Snapshot of the current endpoint catalog
    pub async fn catalog(&self) -> EndpointCatalog {
        self.catalog.read().await.clone()
    }

    /// Run discovery and replace the catalog with static + discovered endpoints
    ///
    /// On error the previous catalog stays in place. Concurrent callers run
    /// one after another, so the last pass to start is the last to write.
    pub async fn refresh_endpoints(&self) -> Result<EndpointCatalog, DirectoryError> {
        let _refresh = self.refresh_lock.lock().await;

        let discovered = discovery::discover(&self.config.discovery).await?;
        let catalog = EndpointCatalog::new(self.config.static_endpoints(), discovered);

        *self.catalog.write().await = catalog.clone();

        tracing::info!(
            endpoints = catalog.len(),
            discovered = catalog.discovered,
            "Endpoint catalog refreshed"
        );

        Ok(catalog)
    }

    /// Update the aggregate health status
    pub fn set_status(&self, status: HealthStatus) {
        let previous = self.health.set_status(status);
        if previous != status {
            tracing::info!(from = %previous, to = %status, "Aggregate health status changed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{NamespaceConfig, StaticEndpointConfig};
    use std::time::Duration;

    fn static_endpoint(name: &str) -> StaticEndpointConfig {
        StaticEndpointConfig {
            name: name.to_string(),
            url: format!("https://{name}.example.org"),
            interval_secs: 60,
            conditions: Vec::new(),
            mqtt: None,
            redis: None,
            ssh: None,
        }
    }

    #[tokio::test]
    async fn test_refresh_without_discovery_keeps_static_endpoints() {
        let mut config = AppConfig::default();
        config.endpoints = vec![static_endpoint("site")];
        let state = AppState::new(config);

        let catalog = state.refresh_endpoints().await.unwrap();

        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.discovered, 0);
        assert_eq!(state.catalog().await.endpoints[0].name, "site");
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_catalog() {
        let mut config = AppConfig::default();
        config.endpoints = vec![static_endpoint("site")];
        let state = AppState::new(config.clone());
        state.refresh_endpoints().await.unwrap();

        // Out-of-cluster mode against a kubeconfig that does not exist
        config.discovery.auto_discover = true;
        config.discovery.cluster_mode = crate::config::ClusterMode::Out;
        config.discovery.kubeconfig = Some("/nonexistent/kubeconfig".into());
        config.discovery.namespaces = vec![NamespaceConfig {
            name: "default".to_string(),
            ..Default::default()
        }];
        let failing = AppState {
            config: Arc::new(config),
            ..state.clone()
        };

        let err = failing.refresh_endpoints().await.unwrap_err();
        assert!(matches!(err, DirectoryError::Connect { .. }));
        assert_eq!(state.catalog().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_waits_for_pass_in_progress() {
        let mut config = AppConfig::default();
        config.endpoints = vec![static_endpoint("site")];
        let state = AppState::new(config);

        let in_progress = state.refresh_lock.lock().await;
        let pending = tokio::spawn({
            let state = state.clone();
            async move { state.refresh_endpoints().await }
        });

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert!(!pending.is_finished());
        assert!(state.catalog().await.is_empty());

        drop(in_progress);
        let catalog = pending.await.unwrap().unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(state.catalog().await.len(), 1);
    }

    #[test]
    fn test_status_shared_with_registry() {
        let mut config = AppConfig::default();
        config.health.json = true;
        let state = AppState::new(config);

        assert!(state.health.uses_json());
        state.set_status(HealthStatus::Down);
        assert_eq!(state.health.status(), HealthStatus::Down);
    }
}
