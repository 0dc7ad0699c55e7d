//! Discovery pass: namespaces in, endpoint definitions out.

use std::time::Duration;
use tracing::{debug, info, trace, warn};

use lookout_common::constants::{CLUSTER_LOCAL_SUFFIX, DISCOVERED_URL_SCHEME};
use lookout_common::{DirectoryError, EndpointDefinition, RawService};

use super::{DirectoryClient, connect};
use crate::config::{DiscoveryConfig, NamespaceConfig, NamespaceErrorPolicy};

/// Run one discovery pass against the configured cluster
///
/// Returns an empty list without contacting the cluster when auto-discovery
/// is disabled.
pub async fn discover(config: &DiscoveryConfig) -> Result<Vec<EndpointDefinition>, DirectoryError> {
    if !config.auto_discover {
        debug!("Auto-discovery disabled");
        return Ok(Vec::new());
    }

    let client = connect(config).await?;
    discover_with(client.as_ref(), config).await
}

/// Run one discovery pass against `client`
///
/// Output follows namespace declaration order, then the directory's order
/// within each namespace.
pub async fn discover_with(
    client: &dyn DirectoryClient,
    config: &DiscoveryConfig,
) -> Result<Vec<EndpointDefinition>, DirectoryError> {
    let template = &config.service_template;
    let mut endpoints = Vec::new();

    for namespace in &config.namespaces {
        let services = match list_namespace(client, &namespace.name, config.list_timeout()).await {
            Ok(services) => services,
            Err(e) if config.on_namespace_error == NamespaceErrorPolicy::Skip => {
                warn!(namespace = %namespace.name, error = %e, "Skipping namespace");
                continue;
            }
            Err(e) => return Err(e),
        };

        debug!(
            namespace = %namespace.name,
            services = services.len(),
            "Listed namespace services"
        );

        for service in services {
            if is_excluded(&service.name, namespace, &config.excluded_service_suffixes) {
                trace!(namespace = %namespace.name, service = %service.name, "Service excluded");
                continue;
            }

            endpoints.push(EndpointDefinition {
                url: service_url(&service, namespace),
                name: service.name,
                interval: template.interval(),
                conditions: template.conditions.clone(),
            });
        }
    }

    info!(
        namespaces = config.namespaces.len(),
        endpoints = endpoints.len(),
        "Service discovery complete"
    );

    Ok(endpoints)
}

async fn list_namespace(
    client: &dyn DirectoryClient,
    namespace: &str,
    timeout: Duration,
) -> Result<Vec<RawService>, DirectoryError> {
    tokio::time::timeout(timeout, client.list_services(namespace))
        .await
        .map_err(|_| DirectoryError::Timeout {
            namespace: namespace.to_string(),
            timeout_secs: timeout.as_secs(),
        })?
}

/// Suffix match against the raw service name, plus the namespace's exact names
fn is_excluded(name: &str, namespace: &NamespaceConfig, excluded_suffixes: &[String]) -> bool {
    excluded_suffixes.iter().any(|suffix| name.ends_with(suffix.as_str()))
        || namespace.excluded_services.iter().any(|excluded| excluded == name)
}

/// Health check URL of a discovered service
///
/// `http://<name><hostname_suffix>[:<port>]/<target_path>`; the port is the
/// service's first one and only appears for cluster-local suffixes without an
/// explicit port.
pub fn service_url(service: &RawService, namespace: &NamespaceConfig) -> String {
    let suffix = namespace.hostname_suffix.as_str();
    let port = match service.ports.first() {
        Some(port) if !suffix.contains(':') && suffix.ends_with(CLUSTER_LOCAL_SUFFIX) => {
            format!(":{port}")
        }
        _ => String::new(),
    };
    let path = namespace.target_path.as_str();
    let separator = if path.starts_with('/') { "" } else { "/" };

    format!(
        "{DISCOVERED_URL_SCHEME}://{}{suffix}{port}{separator}{path}",
        service.name
    )
}
