//! Protocol-specific endpoint configuration.
//!
//! Every supported protocol is one variant of [`ProtocolConfig`]. Each variant
//! enforces its own required fields through [`Validate`], which the config
//! loader calls once per endpoint before any check runs.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ValidationError;

/// Rejects incomplete endpoint configuration
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Protocols with dedicated endpoint configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Mqtt,
    Redis,
    Ssh,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mqtt => "MQTT",
            Self::Redis => "Redis",
            Self::Ssh => "SSH",
        })
    }
}

/// Topic-based (MQTT) endpoint configuration
///
/// Username and password are optional: the broker may accept the host-level
/// default identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttConfig {
    #[serde(default)]
    pub topic: String,

    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing)]
    pub password: String,
}

impl Validate for MqttConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.topic.is_empty() {
            return Err(ValidationError::MissingTopic {
                protocol: Protocol::Mqtt,
            });
        }
        Ok(())
    }
}

/// Password-based (Redis) endpoint configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedisConfig {
    #[serde(default, skip_serializing)]
    pub password: String,

    #[serde(default)]
    pub use_tls: bool,

    /// Logical database selected after connecting
    #[serde(default)]
    pub database_index: u32,
}

impl Validate for RedisConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.password.is_empty() {
            return Err(ValidationError::MissingPassword {
                protocol: Protocol::Redis,
            });
        }
        Ok(())
    }
}

/// SSH endpoint configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SshConfig {
    #[serde(default)]
    pub username: String,

    #[serde(default, skip_serializing)]
    pub password: String,
}

impl Validate for SshConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.username.is_empty() {
            return Err(ValidationError::MissingUsername {
                protocol: Protocol::Ssh,
            });
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingPassword {
                protocol: Protocol::Ssh,
            });
        }
        Ok(())
    }
}

/// Closed set of protocol configurations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProtocolConfig {
    Mqtt(MqttConfig),
    Redis(RedisConfig),
    Ssh(SshConfig),
}

impl ProtocolConfig {
    pub fn protocol(&self) -> Protocol {
        match self {
            Self::Mqtt(_) => Protocol::Mqtt,
            Self::Redis(_) => Protocol::Redis,
            Self::Ssh(_) => Protocol::Ssh,
        }
    }
}

impl Validate for ProtocolConfig {
    fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::Mqtt(config) => config.validate(),
            Self::Redis(config) => config.validate(),
            Self::Ssh(config) => config.validate(),
        }
    }
}
