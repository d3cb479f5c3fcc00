//! API Module
//!
//! HTTP handlers and routing for the scheduler's admin REST API.
//!
//! # Endpoints
//! - `GET /scheduler/config` - Persisted config plus live status
//! - `POST /scheduler/config` - Validate, persist, and apply a config change
//! - `GET /scheduler/status` - Status of every known task
//! - `POST /scheduler/execute/clear-all-backups` - Start a manual cleanup run
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
