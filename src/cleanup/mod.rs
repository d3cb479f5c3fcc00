//! Cleanup Module
//!
//! The destructive side of the scheduler: measuring, clearing, and reporting
//! on per-user backup directories.
//!
//! # Components
//! - Directory sizer: recursive byte/file accounting
//! - Backup cleaner: clears one user's backup directory
//! - Cleanup runner: sweeps all users with failure isolation

mod cleaner;
mod runner;
mod sizer;

pub use cleaner::BackupCleaner;
pub use runner::{CleanupResult, CleanupRunner, UserError};
pub use sizer::dir_size;
