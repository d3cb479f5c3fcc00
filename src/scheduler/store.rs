//! Config Store
//!
//! Reads and writes the scheduler's section of the shared YAML configuration
//! document, round-tripping unrelated document content unchanged.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::error::{Result, SchedulerError};

/// Top-level document key holding all scheduled task sections.
const TASKS_KEY: &str = "scheduledTasks";
/// Sub-section key for the clear-all-backups task.
const CLEAR_ALL_BACKUPS_KEY: &str = "clearAllBackups";

// == Task Config ==
/// Persisted configuration for the clear-all-backups task.
///
/// Invariant: never persisted with `enabled=true` and an unparsable
/// expression; validation happens before [`ConfigStore::save`] is called.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskConfig {
    /// Whether the scheduled task should run
    pub enabled: bool,
    /// Cron trigger expression; empty only while disabled
    #[serde(default)]
    pub cron_expression: String,
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            cron_expression: String::new(),
        }
    }
}

// == Config Store ==
/// Persists the scheduler's sub-section of the YAML configuration document.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Creates a store over the given document path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads the persisted task configuration.
    ///
    /// A missing document or missing sub-section means "never configured" and
    /// yields `Ok(None)`. An unreadable or unparsable document is an error;
    /// the caller decides how to degrade.
    pub fn load(&self) -> Result<Option<TaskConfig>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(SchedulerError::ConfigRead(format!(
                    "cannot read {:?}: {}",
                    self.path, e
                )))
            }
        };

        let doc: Value = serde_yaml::from_str(&raw).map_err(|e| {
            SchedulerError::ConfigRead(format!("cannot parse {:?}: {}", self.path, e))
        })?;

        let section = match doc.get(TASKS_KEY).and_then(|t| t.get(CLEAR_ALL_BACKUPS_KEY)) {
            Some(section) => section,
            None => return Ok(None),
        };

        let config: TaskConfig = serde_yaml::from_value(section.clone()).map_err(|e| {
            SchedulerError::ConfigRead(format!(
                "malformed {}.{} section: {}",
                TASKS_KEY, CLEAR_ALL_BACKUPS_KEY, e
            ))
        })?;

        Ok(Some(config))
    }

    /// Persists the task configuration, replacing only the scheduler's
    /// sub-section and preserving all unrelated document content.
    ///
    /// The document is written to a temporary file in the same directory and
    /// renamed into place, so a concurrent reader never observes a
    /// half-written document.
    pub fn save(&self, config: &TaskConfig) -> Result<()> {
        let mut doc = match fs::read_to_string(&self.path) {
            Ok(raw) => serde_yaml::from_str(&raw).map_err(|e| {
                // Refuse to clobber a document we cannot parse; unrelated
                // content would be lost silently
                SchedulerError::ConfigRead(format!("cannot parse {:?}: {}", self.path, e))
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Value::Mapping(Mapping::new()),
            Err(e) => {
                return Err(SchedulerError::ConfigRead(format!(
                    "cannot read {:?}: {}",
                    self.path, e
                )))
            }
        };

        let root = doc.as_mapping_mut().ok_or_else(|| {
            SchedulerError::ConfigWrite(format!("{:?}: document root is not a mapping", self.path))
        })?;

        let tasks = root
            .entry(Value::String(TASKS_KEY.to_string()))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        let tasks = tasks.as_mapping_mut().ok_or_else(|| {
            SchedulerError::ConfigWrite(format!("{:?}: '{}' is not a mapping", self.path, TASKS_KEY))
        })?;

        let section = serde_yaml::to_value(config)
            .map_err(|e| SchedulerError::ConfigWrite(format!("cannot serialize config: {}", e)))?;
        tasks.insert(Value::String(CLEAR_ALL_BACKUPS_KEY.to_string()), section);

        let rendered = serde_yaml::to_string(&doc)
            .map_err(|e| SchedulerError::ConfigWrite(format!("cannot serialize document: {}", e)))?;

        write_atomic(&self.path, &rendered)
            .map_err(|e| SchedulerError::ConfigWrite(format!("cannot write {:?}: {}", self.path, e)))
    }
}

/// Writes `content` via a temp file in the target directory plus rename.
fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let tmp_name = format!(
        ".{}.tmp-{}",
        path.file_name().and_then(|n| n.to_str()).unwrap_or("config"),
        std::process::id()
    );
    let tmp_path = path
        .parent()
        .map(|p| p.join(&tmp_name))
        .unwrap_or_else(|| PathBuf::from(&tmp_name));

    fs::write(&tmp_path, content)?;
    fs::rename(&tmp_path, path)
}
