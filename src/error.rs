//! Error types for the backup sweeper
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Scheduler Error Enum ==
/// Unified error type for the scheduler and cleanup pipeline.
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// Malformed cron trigger expression, rejected before persistence
    #[error("Invalid cron expression: {0}")]
    InvalidExpression(String),

    /// Persisted configuration document could not be read or parsed
    #[error("Failed to read configuration: {0}")]
    ConfigRead(String),

    /// Persisted configuration document could not be written
    #[error("Failed to write configuration: {0}")]
    ConfigWrite(String),

    /// Timer could not be armed for a task
    #[error("Failed to start task: {0}")]
    TaskStart(String),

    /// Per-user cleanup failure (isolated, never aborts the overall run)
    #[error("Cleanup failed for user '{user}': {reason}")]
    Clean { user: String, reason: String },

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for SchedulerError {
    fn into_response(self) -> Response {
        let status = match &self {
            SchedulerError::InvalidExpression(_) => StatusCode::BAD_REQUEST,
            SchedulerError::ConfigRead(_)
            | SchedulerError::ConfigWrite(_)
            | SchedulerError::TaskStart(_)
            | SchedulerError::Clean { .. }
            | SchedulerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "message": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the backup sweeper.
pub type Result<T> = std::result::Result<T, SchedulerError>;
