//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{session::Role, state::SessionStatus};

/// Response to a local control command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionStatus>,
}

impl ApiResponse {
    pub fn new(status: &str, message: String, session: Option<SessionStatus>) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
            session,
        }
    }

    /// Command took effect
    pub fn ok(message: String, session: SessionStatus) -> Self {
        Self::new("ok", message, Some(session))
    }

    /// Command was a no-op in the current session state
    pub fn rejected(message: String, session: SessionStatus) -> Self {
        Self::new("rejected", message, Some(session))
    }

    /// Session driver is gone
    pub fn unavailable(message: String) -> Self {
        Self::new("error", message, None)
    }
}

/// Status response with daemon metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub session: SessionStatus,
    pub client_id: String,
    pub role: Role,
    pub uptime: String,
    pub port: u16,
    pub host: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
