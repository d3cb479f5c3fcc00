//! User Directory Module
//!
//! Resolves user identifiers to their on-disk backup locations. The trait is
//! the seam between the scheduler core and the surrounding user management;
//! tests substitute their own implementations.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Resolves users and their backup directories.
pub trait UserDirectory: Send + Sync {
    /// Returns the identifiers of all known users.
    fn list_users(&self) -> Result<Vec<String>>;

    /// Returns the backup directory for a user. The path is not required to exist.
    fn backup_dir(&self, user_id: &str) -> PathBuf;
}

/// Filesystem-backed user directory.
///
/// Each immediate subdirectory of the data root is a user; a user's backups
/// live under `<data_root>/<user>/backups`.
#[derive(Debug, Clone)]
pub struct FsUserDirectory {
    data_root: PathBuf,
}

impl FsUserDirectory {
    /// Creates a resolver rooted at the given data directory.
    pub fn new(data_root: impl Into<PathBuf>) -> Self {
        Self {
            data_root: data_root.into(),
        }
    }
}

impl UserDirectory for FsUserDirectory {
    fn list_users(&self) -> Result<Vec<String>> {
        if !self.data_root.exists() {
            return Ok(Vec::new());
        }

        let mut users = Vec::new();
        let entries = fs::read_dir(&self.data_root)
            .with_context(|| format!("cannot read data root {:?}", self.data_root))?;
        for entry in entries {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                if let Some(name) = entry.file_name().to_str() {
                    users.push(name.to_string());
                }
            }
        }

        // Stable ordering keeps per-run logs and aggregates deterministic
        users.sort();
        Ok(users)
    }

    fn backup_dir(&self, user_id: &str) -> PathBuf {
        self.data_root.join(user_id).join("backups")
    }
}
