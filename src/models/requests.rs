//! Request DTOs for the scheduler API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::scheduler::TaskConfig;

/// Request body for saving the task configuration (POST /scheduler/config)
///
/// # Fields
/// - `enabled`: Whether the scheduled cleanup should run
/// - `cron_expression`: Cron trigger expression; required when enabling
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveConfigRequest {
    /// Whether the scheduled cleanup should run
    pub enabled: bool,
    /// Cron trigger expression
    #[serde(default)]
    pub cron_expression: Option<String>,
}

impl SaveConfigRequest {
    /// Converts the request body into the persisted configuration shape.
    pub fn into_config(self) -> TaskConfig {
        TaskConfig {
            enabled: self.enabled,
            cron_expression: self.cron_expression.unwrap_or_default(),
        }
    }
}
