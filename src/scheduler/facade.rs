//! Scheduler Facade
//!
//! Wires the config store, task registry, and cleanup runner together and
//! exposes the operations the HTTP layer calls. Owned explicitly by the
//! application state rather than living behind a global singleton.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use croner::Cron;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

use crate::cleanup::CleanupRunner;
use crate::error::{Result, SchedulerError};
use crate::scheduler::{ConfigStore, TaskConfig, TaskRegistry, TaskStatus};

/// Name the clear-all-backups task is registered under.
pub const CLEAR_ALL_BACKUPS_TASK: &str = "clearAllBackups";

// == Scheduler ==
/// Facade over the scheduling core.
///
/// Construction loads the persisted configuration and arms the timer when the
/// task is enabled; a stale or invalid persisted expression is logged and
/// ignored rather than crashing startup.
pub struct Scheduler {
    registry: Arc<RwLock<TaskRegistry>>,
    store: ConfigStore,
    runner: Arc<CleanupRunner>,
}

impl Scheduler {
    /// Builds the scheduler and applies the persisted configuration.
    ///
    /// A config read failure degrades to "not configured": no timer is
    /// started on ambiguous state.
    pub async fn new(store: ConfigStore, runner: Arc<CleanupRunner>) -> Self {
        let scheduler = Self {
            registry: Arc::new(RwLock::new(TaskRegistry::new())),
            store,
            runner,
        };

        match scheduler.store.load() {
            Ok(Some(config)) if config.enabled => {
                info!(
                    "Persisted schedule found, starting task with expression '{}'",
                    config.cron_expression
                );
                if let Err(e) = scheduler.start_task(&config.cron_expression).await {
                    error!("Persisted schedule could not be started: {}", e);
                }
            }
            Ok(_) => info!("Scheduled backup cleanup not configured, timer not started"),
            Err(e) => warn!(
                "Cannot load scheduler configuration, treating as not configured: {}",
                e
            ),
        }

        scheduler
    }

    /// Returns the persisted configuration, defaulting to disabled when the
    /// document is absent or unreadable.
    pub fn get_config(&self) -> TaskConfig {
        match self.store.load() {
            Ok(Some(config)) => config,
            Ok(None) => TaskConfig::default(),
            Err(e) => {
                warn!("Cannot read scheduler configuration: {}", e);
                TaskConfig::default()
            }
        }
    }

    /// Returns the live status for a task, defaulting to not-scheduled.
    pub async fn get_status(&self, name: &str) -> TaskStatus {
        self.registry
            .read()
            .await
            .status(name)
            .unwrap_or_else(TaskStatus::unscheduled)
    }

    /// Snapshot of all task statuses. The clear-all-backups task is always
    /// present, reported as unscheduled when its timer is not armed.
    pub async fn status_all(&self) -> HashMap<String, TaskStatus> {
        let mut statuses = self.registry.read().await.status_all();
        statuses
            .entry(CLEAR_ALL_BACKUPS_TASK.to_string())
            .or_insert_with(TaskStatus::unscheduled);
        statuses
    }

    /// Validates, persists, and applies a configuration change, in that order.
    ///
    /// A rejected expression never reaches the document, and a persisted
    /// change is always applied to the live timer: enabling (re)arms it with
    /// the new expression, disabling stops it.
    pub async fn save_config(&self, config: &TaskConfig) -> Result<()> {
        if config.enabled {
            validate_expression(&config.cron_expression)?;
        }

        self.store.save(config)?;

        if config.enabled {
            self.start_task(&config.cron_expression)
                .await
                .map_err(|e| SchedulerError::TaskStart(e.to_string()))?;
            info!(
                "Scheduled backup cleanup enabled with expression '{}'",
                config.cron_expression
            );
        } else {
            self.registry.write().await.stop(CLEAR_ALL_BACKUPS_TASK);
            info!("Scheduled backup cleanup disabled");
        }

        Ok(())
    }

    /// Kicks off a cleanup run without waiting for it.
    ///
    /// The caller learns that a run was requested, not that it finished;
    /// failures (and overlap skips) surface only in the logs.
    pub fn trigger_manually(&self) {
        info!("Manual backup cleanup triggered");
        let runner = self.runner.clone();
        tokio::spawn(async move {
            runner.try_run();
        });
    }

    /// Stops every scheduled task; called from the shutdown path.
    pub async fn shutdown(&self) {
        info!("Stopping all scheduled tasks");
        self.registry.write().await.stop_all();
    }

    /// Arms the cron timer with a callback that spawns a guarded run per fire.
    async fn start_task(&self, cron_expression: &str) -> Result<()> {
        let runner = self.runner.clone();
        let callback = move || {
            let runner = runner.clone();
            tokio::spawn(async move {
                runner.try_run();
            });
        };

        self.registry
            .write()
            .await
            .start(CLEAR_ALL_BACKUPS_TASK, cron_expression, callback)
    }
}

/// Checks a cron trigger expression without arming anything.
pub fn validate_expression(cron_expression: &str) -> Result<()> {
    if cron_expression.trim().is_empty() {
        return Err(SchedulerError::InvalidExpression(
            "cron expression is required when enabling the task".to_string(),
        ));
    }
    Cron::from_str(cron_expression)
        .map(|_| ())
        .map_err(|e| SchedulerError::InvalidExpression(format!("'{}': {}", cron_expression, e)))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::FsUserDirectory;
    use std::fs;
    use std::time::Duration;

    fn build_parts(dir: &tempfile::TempDir) -> (ConfigStore, Arc<CleanupRunner>) {
        let store = ConfigStore::new(dir.path().join("config.yml"));
        let resolver = Arc::new(FsUserDirectory::new(dir.path().join("data")));
        let runner = Arc::new(CleanupRunner::new(resolver));
        (store, runner)
    }

    #[tokio::test]
    async fn test_boot_without_config_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);

        let scheduler = Scheduler::new(store, runner).await;
        let status = scheduler.get_status(CLEAR_ALL_BACKUPS_TASK).await;
        assert!(!status.enabled);
        assert!(!status.running);
    }

    #[tokio::test]
    async fn test_boot_with_disabled_config_starts_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);
        store
            .save(&TaskConfig {
                enabled: false,
                cron_expression: String::new(),
            })
            .unwrap();

        let scheduler = Scheduler::new(store, runner).await;
        let status = scheduler.get_status(CLEAR_ALL_BACKUPS_TASK).await;
        assert!(!status.enabled);
        assert!(!status.running);
    }

    #[tokio::test]
    async fn test_boot_with_enabled_config_arms_timer() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);
        store
            .save(&TaskConfig {
                enabled: true,
                cron_expression: "0 3 * * *".to_string(),
            })
            .unwrap();

        let scheduler = Scheduler::new(store, runner).await;
        let status = scheduler.get_status(CLEAR_ALL_BACKUPS_TASK).await;
        assert!(status.enabled);
        assert!(status.running);
        assert_eq!(status.cron_expression, "0 3 * * *");

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_boot_with_stale_invalid_expression_degrades() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);
        // Bypass validation by writing the section directly
        fs::write(
            dir.path().join("config.yml"),
            "scheduledTasks:\n  clearAllBackups:\n    enabled: true\n    cronExpression: garbage\n",
        )
        .unwrap();

        let scheduler = Scheduler::new(store, runner).await;
        let status = scheduler.get_status(CLEAR_ALL_BACKUPS_TASK).await;
        assert!(!status.running);
    }

    #[tokio::test]
    async fn test_save_config_enable_then_disable() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);
        let scheduler = Scheduler::new(store, runner).await;

        scheduler
            .save_config(&TaskConfig {
                enabled: true,
                cron_expression: "0 3 * * *".to_string(),
            })
            .await
            .unwrap();
        let status = scheduler.get_status(CLEAR_ALL_BACKUPS_TASK).await;
        assert!(status.enabled);
        assert!(status.running);

        scheduler
            .save_config(&TaskConfig {
                enabled: false,
                cron_expression: String::new(),
            })
            .await
            .unwrap();
        let status = scheduler.get_status(CLEAR_ALL_BACKUPS_TASK).await;
        assert!(!status.enabled);
        assert!(!status.running);
    }

    #[tokio::test]
    async fn test_save_config_rejects_empty_expression_when_enabling() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);
        let scheduler = Scheduler::new(store, runner).await;

        // Persist a valid config first, then try to corrupt it
        scheduler
            .save_config(&TaskConfig {
                enabled: true,
                cron_expression: "0 3 * * *".to_string(),
            })
            .await
            .unwrap();

        let result = scheduler
            .save_config(&TaskConfig {
                enabled: true,
                cron_expression: String::new(),
            })
            .await;
        assert!(matches!(result, Err(SchedulerError::InvalidExpression(_))));

        // The previously persisted config is untouched
        let config = scheduler.get_config();
        assert!(config.enabled);
        assert_eq!(config.cron_expression, "0 3 * * *");

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_save_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);
        let scheduler = Scheduler::new(store, runner).await;

        let config = TaskConfig {
            enabled: true,
            cron_expression: "15 2 * * 1".to_string(),
        };
        scheduler.save_config(&config).await.unwrap();
        assert_eq!(scheduler.get_config(), config);

        scheduler.shutdown().await;
    }

    #[tokio::test]
    async fn test_trigger_manually_clears_backups() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);

        let backups = dir.path().join("data").join("alice").join("backups");
        fs::create_dir_all(&backups).unwrap();
        fs::write(backups.join("dump.tar"), vec![0u8; 128]).unwrap();

        let scheduler = Scheduler::new(store, runner).await;
        scheduler.trigger_manually();

        // Fire-and-forget: give the spawned run a moment to finish
        tokio::time::sleep(Duration::from_millis(300)).await;
        assert!(backups.exists());
        assert_eq!(fs::read_dir(&backups).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_status_all_always_lists_the_task() {
        let dir = tempfile::tempdir().unwrap();
        let (store, runner) = build_parts(&dir);
        let scheduler = Scheduler::new(store, runner).await;

        let statuses = scheduler.status_all().await;
        assert!(statuses.contains_key(CLEAR_ALL_BACKUPS_TASK));
        assert!(!statuses[CLEAR_ALL_BACKUPS_TASK].running);
    }

    #[test]
    fn test_validate_expression() {
        assert!(validate_expression("0 3 * * *").is_ok());
        assert!(validate_expression("*/5 * * * *").is_ok());
        assert!(validate_expression("").is_err());
        assert!(validate_expression("every day at 3").is_err());
        assert!(validate_expression("99 99 * * *").is_err());
    }
}
