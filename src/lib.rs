//! Backup Sweeper - A cron-scheduled backup maintenance service
//!
//! Clears per-user backup data on a recurring schedule, persists its own
//! configuration inside a shared YAML document, and exposes admin controls
//! over HTTP.

pub mod api;
pub mod cleanup;
pub mod config;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod users;

pub use api::AppState;
pub use config::Config;
pub use scheduler::{Scheduler, CLEAR_ALL_BACKUPS_TASK};
