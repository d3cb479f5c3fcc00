//! Response DTOs for the scheduler API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::scheduler::{TaskConfig, TaskStatus};

/// Response body for GET /scheduler/config
#[derive(Debug, Clone, Serialize)]
pub struct ConfigResponse {
    /// The persisted task configuration
    pub config: TaskConfig,
    /// Live status of the task
    pub status: TaskStatus,
}

impl ConfigResponse {
    /// Creates a new ConfigResponse
    pub fn new(config: TaskConfig, status: TaskStatus) -> Self {
        Self { config, status }
    }
}

/// Acknowledgement body for state-changing operations
/// (POST /scheduler/config, POST /scheduler/execute/clear-all-backups)
#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    /// Whether the operation was accepted
    pub success: bool,
    /// Human-readable outcome message
    pub message: String,
}

impl AckResponse {
    /// Creates a successful acknowledgement
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
