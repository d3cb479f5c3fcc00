//! Backup Cleaner
//!
//! Destroys the contents of a single user's backup directory, leaving the
//! directory itself in place (empty) afterwards.

use std::fs;
use std::sync::Arc;

use crate::cleanup::dir_size;
use crate::error::SchedulerError;
use crate::users::UserDirectory;

// == Backup Cleaner ==
/// Clears one user's backup directory at a time.
pub struct BackupCleaner {
    resolver: Arc<dyn UserDirectory>,
}

impl BackupCleaner {
    /// Creates a cleaner using the given user-directory resolver.
    pub fn new(resolver: Arc<dyn UserDirectory>) -> Self {
        Self { resolver }
    }

    /// Deletes the contents of the user's backup directory and recreates it empty.
    ///
    /// Returns `(bytes_freed, files_deleted)`. A missing backup directory is not
    /// an error and yields `(0, 0)`. Any measurement, removal, or recreation
    /// failure is reported with the user id attached so the caller can isolate
    /// it from sibling users.
    ///
    /// # Arguments
    /// * `user_id` - The user whose backups are cleared
    pub fn clean(&self, user_id: &str) -> Result<(u64, u64), SchedulerError> {
        let backup_dir = self.resolver.backup_dir(user_id);

        if !backup_dir.exists() {
            return Ok((0, 0));
        }

        let (bytes, files) = dir_size(&backup_dir).map_err(|e| SchedulerError::Clean {
            user: user_id.to_string(),
            reason: format!("failed to measure {:?}: {}", backup_dir, e),
        })?;

        fs::remove_dir_all(&backup_dir).map_err(|e| SchedulerError::Clean {
            user: user_id.to_string(),
            reason: format!("failed to remove {:?}: {}", backup_dir, e),
        })?;

        // The directory survives a cleanup, only its contents are destroyed
        fs::create_dir_all(&backup_dir).map_err(|e| SchedulerError::Clean {
            user: user_id.to_string(),
            reason: format!("failed to recreate {:?}: {}", backup_dir, e),
        })?;

        Ok((bytes, files))
    }
}
