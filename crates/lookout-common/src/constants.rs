//! Shared constants for Lookout components.

/// Default Lookout HTTP listen address
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config/lookout.toml";

/// Default interval between checks of one endpoint (1 minute)
pub const DEFAULT_CHECK_INTERVAL_SECS: u64 = 60;

/// Deadline for listing the services of one namespace
pub const DEFAULT_LIST_TIMEOUT_SECS: u64 = 10;

/// Hostname suffix of cluster-local service DNS names.
/// Discovered URLs under this suffix get the service's first port appended.
pub const CLUSTER_LOCAL_SUFFIX: &str = ".svc.cluster.local";

/// Scheme used for every discovered endpoint URL
pub const DISCOVERED_URL_SCHEME: &str = "http";

/// HTTP content types
pub mod content_types {
    /// JSON body
    pub const APPLICATION_JSON: &str = "application/json";
}
