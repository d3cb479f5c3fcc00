//! Cleanup Runner
//!
//! Sweeps every known user's backup directory in one sequential pass,
//! isolating per-user failures and aggregating totals for reporting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{error, info, warn};

use crate::cleanup::BackupCleaner;
use crate::users::UserDirectory;

// == Cleanup Result ==
/// Aggregate outcome of one cleanup run. Created fresh per execution,
/// discarded after reporting.
#[derive(Debug, Clone, Default)]
pub struct CleanupResult {
    /// Number of users iterated, successful or not
    pub users_processed: usize,
    /// Files deleted across all successful per-user cleanups
    pub total_files_deleted: u64,
    /// Bytes freed across all successful per-user cleanups
    pub total_bytes_freed: u64,
    /// Per-user failures, in iteration order
    pub per_user_errors: Vec<UserError>,
}

/// A single user's cleanup failure.
#[derive(Debug, Clone)]
pub struct UserError {
    /// The user whose cleanup failed
    pub user: String,
    /// Description of the underlying failure
    pub error: String,
}

// == Cleanup Runner ==
/// Runs the clear-all-backups routine over every known user.
///
/// Both the cron timer and the manual-trigger endpoint execute through
/// [`CleanupRunner::try_run`], so overlapping triggers share one
/// single-flight guard.
pub struct CleanupRunner {
    resolver: Arc<dyn UserDirectory>,
    cleaner: BackupCleaner,
    running: AtomicBool,
}

impl CleanupRunner {
    /// Creates a runner over the given user-directory resolver.
    pub fn new(resolver: Arc<dyn UserDirectory>) -> Self {
        let cleaner = BackupCleaner::new(resolver.clone());
        Self {
            resolver,
            cleaner,
            running: AtomicBool::new(false),
        }
    }

    /// Runs a full sweep unless another run is already in flight.
    ///
    /// Returns `None` when skipped. The guard is released when the run
    /// finishes, including on panic.
    pub fn try_run(&self) -> Option<CleanupResult> {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("Cleanup run already in progress, skipping trigger");
            return None;
        }

        let _guard = RunGuard(&self.running);
        Some(self.run_all())
    }

    /// Sweeps all users sequentially, never aborting early.
    ///
    /// A failure for one user is recorded in `per_user_errors` and processing
    /// continues with the next user. Totals only include successful cleanups.
    pub fn run_all(&self) -> CleanupResult {
        let users = match self.resolver.list_users() {
            Ok(users) => users,
            Err(e) => {
                error!("Cleanup run aborted: cannot enumerate users: {}", e);
                return CleanupResult::default();
            }
        };

        info!("Starting backup cleanup for {} users", users.len());
        let mut result = CleanupResult::default();

        for user in users {
            result.users_processed += 1;
            match self.cleaner.clean(&user) {
                Ok((bytes, files)) => {
                    info!(
                        "Cleared backups for '{}': {} files, {} bytes",
                        user, files, bytes
                    );
                    result.total_bytes_freed += bytes;
                    result.total_files_deleted += files;
                }
                Err(e) => {
                    error!("Backup cleanup failed for '{}': {}", user, e);
                    result.per_user_errors.push(UserError {
                        user,
                        error: e.to_string(),
                    });
                }
            }
        }

        info!(
            "Backup cleanup finished: {} users, {} files deleted, {} bytes freed, {} errors",
            result.users_processed,
            result.total_files_deleted,
            result.total_bytes_freed,
            result.per_user_errors.len()
        );
        result
    }
}

/// Clears the single-flight flag when a run ends, panics included.
struct RunGuard<'a>(&'a AtomicBool);

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
