//! Configuration management for Lookout.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use lookout_common::constants::{
    DEFAULT_CHECK_INTERVAL_SECS, DEFAULT_LISTEN_ADDR, DEFAULT_LIST_TIMEOUT_SECS,
};
use lookout_common::{
    EndpointDefinition, LookoutError, MqttConfig, ProtocolConfig, RedisConfig, SshConfig, Validate,
};

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// HTTP listen address
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Health endpoint configuration
    #[serde(default)]
    pub health: HealthConfig,

    /// Kubernetes service discovery
    #[serde(default)]
    pub discovery: DiscoveryConfig,

    /// Statically configured endpoints
    #[serde(default)]
    pub endpoints: Vec<StaticEndpointConfig>,
}

/// Health endpoint configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HealthConfig {
    /// Render the health status as JSON instead of raw text
    #[serde(default)]
    pub json: bool,
}

/// How the service directory client connects to the cluster
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterMode {
    /// Service account of the pod Lookout runs in
    #[default]
    In,
    /// Kubeconfig file
    Out,
    /// In-memory directory seeded from `mock_services`
    Mock,
}

impl fmt::Display for ClusterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Mock => "mock",
        })
    }
}

/// What a discovery pass does when one namespace cannot be listed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NamespaceErrorPolicy {
    /// Abort the pass and return the error
    #[default]
    FailFast,
    /// Log the error and continue with the next namespace
    Skip,
}

/// Kubernetes service discovery configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DiscoveryConfig {
    /// Discover services to monitor
    #[serde(default)]
    pub auto_discover: bool,

    #[serde(default)]
    pub cluster_mode: ClusterMode,

    /// Kubeconfig path for `out` mode (default inference when unset)
    #[serde(default)]
    pub kubeconfig: Option<PathBuf>,

    /// Namespaces to scan, in order
    #[serde(default)]
    pub namespaces: Vec<NamespaceConfig>,

    /// Services whose name ends with any of these are ignored
    #[serde(default)]
    pub excluded_service_suffixes: Vec<String>,

    /// Interval and conditions applied to every discovered endpoint
    #[serde(default)]
    pub service_template: ServiceTemplate,

    #[serde(default)]
    pub on_namespace_error: NamespaceErrorPolicy,

    /// Deadline for listing one namespace
    #[serde(default = "default_list_timeout")]
    pub list_timeout_secs: u64,

    /// Re-run discovery periodically (disabled when unset)
    #[serde(default)]
    pub rediscovery_interval_secs: Option<u64>,

    /// Services served by the `mock` cluster mode
    #[serde(default)]
    pub mock_services: Vec<MockServiceConfig>,
}

impl DiscoveryConfig {
    pub fn list_timeout(&self) -> Duration {
        Duration::from_secs(self.list_timeout_secs)
    }

    pub fn rediscovery_interval(&self) -> Option<Duration> {
        self.rediscovery_interval_secs.map(Duration::from_secs)
    }
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            auto_discover: false,
            cluster_mode: ClusterMode::default(),
            kubeconfig: None,
            namespaces: Vec::new(),
            excluded_service_suffixes: Vec::new(),
            service_template: ServiceTemplate::default(),
            on_namespace_error: NamespaceErrorPolicy::default(),
            list_timeout_secs: default_list_timeout(),
            rediscovery_interval_secs: None,
            mock_services: Vec::new(),
        }
    }
}

/// One namespace to discover services from
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamespaceConfig {
    pub name: String,

    /// Appended to each service name to form the host, e.g. `.default.svc`
    #[serde(default)]
    pub hostname_suffix: String,

    /// Health check path appended after the host
    #[serde(default)]
    pub target_path: String,

    /// Exact service names to skip in this namespace
    #[serde(default)]
    pub excluded_services: Vec<String>,
}

/// Template for discovered endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceTemplate {
    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default)]
    pub conditions: Vec<String>,
}

impl ServiceTemplate {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ServiceTemplate {
    fn default() -> Self {
        Self {
            interval_secs: default_interval(),
            conditions: Vec::new(),
        }
    }
}

/// A service listed by the `mock` directory
#[derive(Debug, Clone, Deserialize)]
pub struct MockServiceConfig {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub ports: Vec<u16>,
}

/// A statically configured endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct StaticEndpointConfig {
    pub name: String,
    pub url: String,

    #[serde(default = "default_interval")]
    pub interval_secs: u64,

    #[serde(default)]
    pub conditions: Vec<String>,

    #[serde(default)]
    pub mqtt: Option<MqttConfig>,

    #[serde(default)]
    pub redis: Option<RedisConfig>,

    #[serde(default)]
    pub ssh: Option<SshConfig>,
}

impl StaticEndpointConfig {
    /// Protocol section of this endpoint; at most one may be set
    pub fn protocol(&self) -> Result<Option<ProtocolConfig>, LookoutError> {
        let mut sections = [
            self.mqtt.clone().map(ProtocolConfig::Mqtt),
            self.redis.clone().map(ProtocolConfig::Redis),
            self.ssh.clone().map(ProtocolConfig::Ssh),
        ]
        .into_iter()
        .flatten();

        let protocol = sections.next();
        if sections.next().is_some() {
            return Err(LookoutError::Config(format!(
                "endpoint '{}' configures more than one protocol",
                self.name
            )));
        }
        Ok(protocol)
    }

    pub fn definition(&self) -> EndpointDefinition {
        EndpointDefinition {
            name: self.name.clone(),
            url: self.url.clone(),
            interval: Duration::from_secs(self.interval_secs),
            conditions: self.conditions.clone(),
        }
    }
}

// Default value functions
fn default_listen_addr() -> String { DEFAULT_LISTEN_ADDR.to_string() }
fn default_interval() -> u64 { DEFAULT_CHECK_INTERVAL_SECS }
fn default_list_timeout() -> u64 { DEFAULT_LIST_TIMEOUT_SECS }

impl AppConfig {
    /// Load configuration from file, with CLI overrides, and validate it
    pub fn load(config_path: &str, args: &super::Args) -> Result<Self> {
        let mut config = if Path::new(config_path).exists() {
            let settings = config::Config::builder()
                .add_source(config::File::with_name(config_path))
                .build()
                .context("Failed to load config file")?;

            settings
                .try_deserialize()
                .context("Failed to parse config")?
        } else {
            // Use defaults if config file doesn't exist
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Self::default()
        };

        // Apply CLI overrides
        if let Some(ref listen) = args.listen {
            config.listen_addr = listen.clone();
        }
        if args.health_json {
            config.health.json = true;
        }

        config.validate()?;

        Ok(config)
    }

    /// Reject configuration the service must not start with
    pub fn validate(&self) -> Result<(), LookoutError> {
        for endpoint in &self.endpoints {
            if endpoint.name.is_empty() {
                return Err(LookoutError::Config("endpoint without a name".to_string()));
            }
            if endpoint.url.is_empty() {
                return Err(LookoutError::Config(format!(
                    "endpoint '{}' has no url",
                    endpoint.name
                )));
            }
            if endpoint.interval_secs == 0 {
                return Err(LookoutError::Config(format!(
                    "endpoint '{}' interval_secs must be greater than 0",
                    endpoint.name
                )));
            }
            if let Some(protocol) = endpoint.protocol()? {
                protocol.validate().map_err(|source| {
                    tracing::error!(
                        endpoint = %endpoint.name,
                        protocol = %source.protocol(),
                        field = source.field(),
                        "Invalid endpoint configuration"
                    );
                    LookoutError::Validation {
                        endpoint: endpoint.name.clone(),
                        source,
                    }
                })?;
            }
        }

        let discovery = &self.discovery;
        if discovery.service_template.interval_secs == 0 {
            return Err(LookoutError::Config(
                "discovery.service_template.interval_secs must be greater than 0".to_string(),
            ));
        }
        if discovery.auto_discover {
            if discovery.namespaces.iter().any(|ns| ns.name.is_empty()) {
                return Err(LookoutError::Config(
                    "discovery namespace without a name".to_string(),
                ));
            }
            if discovery.list_timeout_secs == 0 {
                return Err(LookoutError::Config(
                    "discovery.list_timeout_secs must be greater than 0".to_string(),
                ));
            }
            if discovery.rediscovery_interval_secs == Some(0) {
                return Err(LookoutError::Config(
                    "discovery.rediscovery_interval_secs must be greater than 0".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Endpoint definitions of the statically configured endpoints
    pub fn static_endpoints(&self) -> Vec<EndpointDefinition> {
        self.endpoints.iter().map(StaticEndpointConfig::definition).collect()
    }

    #[cfg(test)]
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(contents, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(config)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            health: HealthConfig::default(),
            discovery: DiscoveryConfig::default(),
            endpoints: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lookout_common::{Protocol, ValidationError};

    const FULL_CONFIG: &str = r#"
listen_addr = "127.0.0.1:9000"

[health]
json = true

[discovery]
auto_discover = true
cluster_mode = "mock"
excluded_service_suffixes = ["-canary"]
on_namespace_error = "skip"
rediscovery_interval_secs = 300

[discovery.service_template]
interval_secs = 30
conditions = ["[STATUS] == 200"]

[[discovery.namespaces]]
name = "ns1"
hostname_suffix = ".svc"
target_path = "health"
excluded_services = ["kube-dns"]

[[discovery.mock_services]]
namespace = "ns1"
name = "api-prod"
ports = [8080]

[[endpoints]]
name = "broker"
url = "tcp://broker:1883"
mqtt = { topic = "lookout/health" }
"#;

    #[test]
    fn test_parse_full_config() {
        let config = AppConfig::from_toml(FULL_CONFIG).unwrap();

        assert_eq!(config.listen_addr, "127.0.0.1:9000");
        assert!(config.health.json);

        let discovery = &config.discovery;
        assert!(discovery.auto_discover);
        assert_eq!(discovery.cluster_mode, ClusterMode::Mock);
        assert_eq!(discovery.on_namespace_error, NamespaceErrorPolicy::Skip);
        assert_eq!(discovery.list_timeout_secs, DEFAULT_LIST_TIMEOUT_SECS);
        assert_eq!(discovery.rediscovery_interval(), Some(Duration::from_secs(300)));
        assert_eq!(discovery.service_template.interval(), Duration::from_secs(30));
        assert_eq!(discovery.namespaces[0].excluded_services, ["kube-dns"]);
        assert_eq!(discovery.mock_services[0].ports, [8080]);

        let endpoint = &config.endpoints[0];
        assert_eq!(endpoint.interval_secs, DEFAULT_CHECK_INTERVAL_SECS);
        assert_eq!(
            endpoint.protocol().unwrap().map(|p| p.protocol()),
            Some(Protocol::Mqtt)
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_when_sections_missing() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.listen_addr, DEFAULT_LISTEN_ADDR);
        assert!(!config.health.json);
        assert!(!config.discovery.auto_discover);
        assert_eq!(config.discovery.cluster_mode, ClusterMode::In);
        assert_eq!(
            config.discovery.on_namespace_error,
            NamespaceErrorPolicy::FailFast
        );
        assert!(config.endpoints.is_empty());
    }

    #[test]
    fn test_invalid_protocol_section_is_rejected() {
        let config = AppConfig::from_toml(
            r#"
[[endpoints]]
name = "cache"
url = "redis://cache:6379"
redis = { use_tls = true, database_index = 2 }
"#,
        )
        .unwrap();

        match config.validate() {
            Err(LookoutError::Validation { endpoint, source }) => {
                assert_eq!(endpoint, "cache");
                assert_eq!(
                    source,
                    ValidationError::MissingPassword {
                        protocol: Protocol::Redis
                    }
                );
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_multiple_protocol_sections_are_rejected() {
        let config = AppConfig::from_toml(
            r#"
[[endpoints]]
name = "mixed"
url = "tcp://mixed:1"
mqtt = { topic = "t" }
ssh = { username = "u", password = "p" }
"#,
        )
        .unwrap();

        assert!(matches!(config.validate(), Err(LookoutError::Config(_))));
    }

    #[test]
    fn test_zero_durations_are_rejected() {
        let mut config = AppConfig::default();
        config.discovery.auto_discover = true;
        config.discovery.list_timeout_secs = 0;
        assert!(config.validate().is_err());

        config.discovery.list_timeout_secs = 5;
        config.discovery.rediscovery_interval_secs = Some(0);
        assert!(config.validate().is_err());

        config.discovery.rediscovery_interval_secs = Some(60);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_check_intervals_are_rejected() {
        let template = AppConfig::from_toml(
            r#"
[discovery.service_template]
interval_secs = 0
"#,
        )
        .unwrap();
        assert_eq!(template.discovery.service_template.interval(), Duration::ZERO);
        match template.validate() {
            Err(LookoutError::Config(message)) => {
                assert!(message.contains("service_template.interval_secs"))
            }
            other => panic!("expected config error, got {other:?}"),
        }

        let endpoint = AppConfig::from_toml(
            r#"
[[endpoints]]
name = "site"
url = "https://site.example.org"
interval_secs = 0
"#,
        )
        .unwrap();
        match endpoint.validate() {
            Err(LookoutError::Config(message)) => assert!(message.contains("'site'")),
            other => panic!("expected config error, got {other:?}"),
        }
    }

    #[test]
    fn test_static_endpoint_definitions() {
        let config = AppConfig::from_toml(FULL_CONFIG).unwrap();
        let endpoints = config.static_endpoints();
        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].name, "broker");
        assert_eq!(endpoints[0].url, "tcp://broker:1883");
        assert_eq!(endpoints[0].interval, Duration::from_secs(60));
    }
}
