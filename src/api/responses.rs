//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::{SyncSettings, TimerSnapshot};

/// Response for timer control and settings endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ApiResponse {
    /// Create a new API response
    pub fn new(status: &str, message: String) -> Self {
        Self {
            status: status.to_string(),
            message,
            timestamp: Utc::now(),
        }
    }

    /// Create an accepted response
    pub fn accepted(message: String) -> Self {
        Self::new("accepted", message)
    }

    /// Create an applied response
    pub fn applied(message: String) -> Self {
        Self::new("applied", message)
    }

    /// Create an error response
    pub fn error(message: String) -> Self {
        Self::new("error", message)
    }
}

/// Timer status response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    pub running: bool,
    pub elapsed: String,
    pub first_rotation_secs: u32,
    pub repeat_interval_secs: u32,
    pub uptime: String,
    pub port: u16,
    pub host: String,
}

impl StatusResponse {
    pub fn new(
        snapshot: TimerSnapshot,
        settings: SyncSettings,
        uptime: String,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            running: snapshot.running,
            elapsed: snapshot.elapsed_formatted,
            first_rotation_secs: settings.first_rotation,
            repeat_interval_secs: settings.repeat_interval,
            uptime,
            port,
            host,
        }
    }
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
