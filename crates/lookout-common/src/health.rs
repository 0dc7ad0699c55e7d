//! Aggregate health registry.
//!
//! Holds the single current [`HealthStatus`] of the monitored system. The check
//! scheduler overwrites it while status requests read and render it, possibly
//! from other threads, so the value lives in one atomic word.

use std::sync::atomic::{AtomicU8, Ordering};

use crate::constants::content_types::APPLICATION_JSON;
use crate::types::HealthStatus;

const UP: u8 = 0;
const DOWN: u8 = 1;

fn encode(status: HealthStatus) -> u8 {
    match status {
        HealthStatus::Up => UP,
        HealthStatus::Down => DOWN,
    }
}

fn decode(raw: u8) -> HealthStatus {
    match raw {
        UP => HealthStatus::Up,
        _ => HealthStatus::Down,
    }
}

/// Response computed for one status request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatus {
    /// HTTP status code
    pub code: u16,
    pub body: String,
    /// Content type to set, `None` leaves the server default in place
    pub content_type: Option<&'static str>,
}

/// Process-wide aggregate health, shared by handle (`Arc<HealthRegistry>`)
#[derive(Debug)]
pub struct HealthRegistry {
    status: AtomicU8,
    use_json: bool,
}

impl HealthRegistry {
    /// Create a registry reporting `Up`, rendering raw text
    pub fn new() -> Self {
        Self {
            status: AtomicU8::new(UP),
            use_json: false,
        }
    }

    /// Configure whether responses are rendered as JSON or raw text
    pub fn with_json(mut self, use_json: bool) -> Self {
        self.use_json = use_json;
        self
    }

    pub fn uses_json(&self) -> bool {
        self.use_json
    }

    /// Overwrite the current status, returning the previous one
    pub fn set_status(&self, status: HealthStatus) -> HealthStatus {
        decode(self.status.swap(encode(status), Ordering::AcqRel))
    }

    /// Current status
    pub fn status(&self) -> HealthStatus {
        decode(self.status.load(Ordering::Acquire))
    }

    /// Render the current status for an HTTP response
    pub fn render(&self) -> RenderedStatus {
        let status = self.status();
        if self.use_json {
            RenderedStatus {
                code: status.status_code(),
                body: serde_json::json!({ "status": status.as_str() }).to_string(),
                content_type: Some(APPLICATION_JSON),
            }
        } else {
            RenderedStatus {
                code: status.status_code(),
                body: status.as_str().to_string(),
                content_type: None,
            }
        }
    }
}

impl Default for HealthRegistry {
    fn default() -> Self {
        Self::new()
    }
}
