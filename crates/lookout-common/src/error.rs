//! Common error types for Lookout components.

use thiserror::Error;

use crate::protocol::Protocol;

/// A protocol-specific endpoint configuration is missing a required field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Topic-based endpoint configured without a topic
    #[error("you must specify a topic for each {protocol} endpoint")]
    MissingTopic { protocol: Protocol },

    /// Endpoint configured without a username where one is required
    #[error("you must specify a username for each {protocol} endpoint")]
    MissingUsername { protocol: Protocol },

    /// Password-based endpoint configured without a password
    #[error("you must specify a password for each {protocol} endpoint")]
    MissingPassword { protocol: Protocol },
}

impl ValidationError {
    /// Protocol whose configuration was rejected
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::MissingTopic { protocol }
            | Self::MissingUsername { protocol }
            | Self::MissingPassword { protocol } => *protocol,
        }
    }

    /// Name of the missing configuration field
    pub fn field(&self) -> &'static str {
        match self {
            Self::MissingTopic { .. } => "topic",
            Self::MissingUsername { .. } => "username",
            Self::MissingPassword { .. } => "password",
        }
    }
}

/// Failure reported by the service directory during discovery
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The directory client could not be constructed for the cluster mode
    #[error("Unable to connect to service directory in '{mode}' mode: {message}")]
    Connect { mode: String, message: String },

    /// Listing the services of a namespace failed
    #[error("Failed to list services in namespace '{namespace}': {message}")]
    List { namespace: String, message: String },

    /// Listing the services of a namespace exceeded its deadline
    #[error("Listing services in namespace '{namespace}' timed out after {timeout_secs}s")]
    Timeout { namespace: String, timeout_secs: u64 },
}

impl DirectoryError {
    /// Namespace the failure belongs to, if it is namespace-scoped
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Connect { .. } => None,
            Self::List { namespace, .. } | Self::Timeout { namespace, .. } => Some(namespace),
        }
    }
}

/// Common errors across Lookout components
#[derive(Debug, Error)]
pub enum LookoutError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A statically configured endpoint failed protocol validation
    #[error("Invalid endpoint '{endpoint}': {source}")]
    Validation {
        endpoint: String,
        #[source]
        source: ValidationError,
    },

    /// Service directory error
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl LookoutError {
    /// Returns the HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Config(_) => 500,
            Self::Validation { .. } => 400,
            Self::Directory(_) => 503,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_names_protocol_and_field() {
        let err = ValidationError::MissingTopic {
            protocol: Protocol::Mqtt,
        };
        assert_eq!(err.protocol(), Protocol::Mqtt);
        assert_eq!(err.field(), "topic");
        assert_eq!(err.to_string(), "you must specify a topic for each MQTT endpoint");

        let err = LookoutError::Validation {
            endpoint: "cache".to_string(),
            source: ValidationError::MissingPassword {
                protocol: Protocol::Redis,
            },
        };
        assert_eq!(
            err.to_string(),
            "Invalid endpoint 'cache': you must specify a password for each Redis endpoint"
        );
        assert_eq!(err.status_code(), 400);
    }

    #[test]
    fn test_directory_error_namespace() {
        let err = DirectoryError::Timeout {
            namespace: "default".to_string(),
            timeout_secs: 5,
        };
        assert_eq!(err.namespace(), Some("default"));

        let err = LookoutError::from(DirectoryError::Connect {
            mode: "in".to_string(),
            message: "no service account".to_string(),
        });
        assert_eq!(err.status_code(), 503);
    }
}
