//! API Handlers
//!
//! HTTP request handlers for each scheduler endpoint. These are thin
//! marshaling shims over the scheduler facade; administrator authorization
//! is enforced by the surrounding deployment, not here.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{extract::State, Json};

use crate::cleanup::CleanupRunner;
use crate::error::Result;
use crate::models::{AckResponse, ConfigResponse, HealthResponse, SaveConfigRequest};
use crate::scheduler::{ConfigStore, Scheduler, TaskStatus, CLEAR_ALL_BACKUPS_TASK};
use crate::users::FsUserDirectory;

/// Application state shared across all handlers.
///
/// Owns the scheduler facade; no global singleton is involved, so tests can
/// build isolated instances freely.
#[derive(Clone)]
pub struct AppState {
    /// The scheduling core
    pub scheduler: Arc<Scheduler>,
}

impl AppState {
    /// Creates a new AppState over an already-built scheduler.
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self { scheduler }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Wires the config store and the filesystem user directory, then builds
    /// the scheduler, which starts the persisted schedule if one is enabled.
    pub async fn from_config(config: &crate::config::Config) -> Self {
        let store = ConfigStore::new(config.config_file.clone());
        let resolver = Arc::new(FsUserDirectory::new(config.data_root.clone()));
        let runner = Arc::new(CleanupRunner::new(resolver));
        let scheduler = Arc::new(Scheduler::new(store, runner).await);
        Self::new(scheduler)
    }
}

/// Handler for GET /scheduler/config
///
/// Returns the persisted configuration together with the task's live status.
pub async fn get_config_handler(State(state): State<AppState>) -> Json<ConfigResponse> {
    let config = state.scheduler.get_config();
    let status = state.scheduler.get_status(CLEAR_ALL_BACKUPS_TASK).await;
    Json(ConfigResponse::new(config, status))
}

/// Handler for POST /scheduler/config
///
/// Validates, persists, and applies the configuration change. Responds 400
/// when enabling with a missing or invalid expression, 500 when persistence
/// or timer start fails.
pub async fn save_config_handler(
    State(state): State<AppState>,
    Json(req): Json<SaveConfigRequest>,
) -> Result<Json<AckResponse>> {
    let config = req.into_config();
    state.scheduler.save_config(&config).await?;
    Ok(Json(AckResponse::ok("Scheduler configuration saved")))
}

/// Handler for GET /scheduler/status
///
/// Returns the status of every known task.
pub async fn status_handler(
    State(state): State<AppState>,
) -> Json<HashMap<String, TaskStatus>> {
    Json(state.scheduler.status_all().await)
}

/// Handler for POST /scheduler/execute/clear-all-backups
///
/// Starts an asynchronous manual cleanup run and returns immediately; the
/// caller is told the run started, never how it ended.
pub async fn execute_handler(State(state): State<AppState>) -> Json<AckResponse> {
    state.scheduler.trigger_manually();
    Json(AckResponse::ok("Backup cleanup run started"))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
