//! Core types shared across Lookout components.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Aggregate health of the monitored system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HealthStatus {
    #[default]
    Up,
    Down,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
        }
    }

    /// Returns the HTTP status code this status is served with
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Up => 200,
            Self::Down => 500,
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A service as reported by the service directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawService {
    /// Service name, unique within its namespace
    pub name: String,

    /// Exposed ports, in declaration order
    #[serde(default)]
    pub ports: Vec<u16>,
}

impl RawService {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ports: Vec::new(),
        }
    }

    pub fn with_ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }
}

/// A monitored endpoint handed to the check scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDefinition {
    /// Endpoint name (the service name for discovered endpoints)
    pub name: String,

    /// Fully qualified URL to check
    pub url: String,

    /// Time between two checks
    #[serde(rename = "interval_secs", with = "duration_secs")]
    pub interval: Duration,

    /// Conditions a check result must satisfy, e.g. `[STATUS] == 200`
    pub conditions: Vec<String>,
}

/// The current set of endpoints, replaced whole on every refresh
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointCatalog {
    pub endpoints: Vec<EndpointDefinition>,

    /// Number of endpoints that came from discovery
    pub discovered: usize,

    /// Timestamp of the last refresh (Unix epoch seconds)
    pub refreshed_at: i64,
}

impl EndpointCatalog {
    /// Build a catalog from static endpoints followed by discovered ones
    pub fn new(
        static_endpoints: Vec<EndpointDefinition>,
        discovered: Vec<EndpointDefinition>,
    ) -> Self {
        let discovered_count = discovered.len();
        let mut endpoints = static_endpoints;
        endpoints.extend(discovered);
        Self {
            endpoints,
            discovered: discovered_count,
            refreshed_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_status_strings_and_codes() {
        assert_eq!(HealthStatus::default(), HealthStatus::Up);
        assert_eq!(HealthStatus::Up.to_string(), "Up");
        assert_eq!(HealthStatus::Down.to_string(), "Down");
        assert_eq!(HealthStatus::Up.status_code(), 200);
        assert_eq!(HealthStatus::Down.status_code(), 500);

        let parsed: HealthStatus = serde_json::from_str("\"Down\"").unwrap();
        assert_eq!(parsed, HealthStatus::Down);
    }

    #[test]
    fn test_endpoint_interval_serialized_as_seconds() {
        let endpoint = EndpointDefinition {
            name: "api".to_string(),
            url: "http://api.svc/health".to_string(),
            interval: Duration::from_secs(30),
            conditions: vec!["[STATUS] == 200".to_string()],
        };
        let json = serde_json::to_value(&endpoint).unwrap();
        assert_eq!(json["interval_secs"], 30);
        assert_eq!(json["url"], "http://api.svc/health");
    }

    #[test]
    fn test_catalog_keeps_static_endpoints_first() {
        let endpoint = |name: &str| EndpointDefinition {
            name: name.to_string(),
            url: format!("http://{}/health", name),
            interval: Duration::from_secs(60),
            conditions: Vec::new(),
        };
        let catalog = EndpointCatalog::new(vec![endpoint("static")], vec![endpoint("a"), endpoint("b")]);

        let names: Vec<_> = catalog.endpoints.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["static", "a", "b"]);
        assert_eq!(catalog.discovered, 2);
        assert_eq!(catalog.len(), 3);
        assert!(catalog.refreshed_at > 0);
    }
}
