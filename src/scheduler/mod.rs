//! Scheduler Module
//!
//! Recurring-task core: the registry of live cron timers, the persisted
//! configuration store, and the facade the HTTP layer talks to.

mod facade;
mod registry;
mod store;

pub use facade::{validate_expression, Scheduler, CLEAR_ALL_BACKUPS_TASK};
pub use registry::{TaskKind, TaskRegistry, TaskStatus};
pub use store::{ConfigStore, TaskConfig};
