//! # Lookout Common
//!
//! Shared types, validation contracts, and state used across Lookout components.
//!
//! ## Modules
//! - `types` - Core data structures (HealthStatus, EndpointDefinition, RawService)
//! - `protocol` - Per-protocol endpoint configuration and its validation
//! - `health` - The aggregate health registry
//! - `error` - Common error types
//! - `constants` - Shared configuration constants

pub mod constants;
pub mod error;
pub mod health;
pub mod protocol;
pub mod types;

pub use error::{DirectoryError, LookoutError, ValidationError};
pub use health::{HealthRegistry, RenderedStatus};
pub use protocol::{MqttConfig, Protocol, ProtocolConfig, RedisConfig, SshConfig, Validate};
pub use types::*;
