//! Task Registry
//!
//! In-memory map from task name to its live timer handle. Owns the task
//! lifecycle: start, stop, stop-all, status query.

use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;

use chrono::Utc;
use croner::Cron;
use serde::Serialize;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{Result, SchedulerError};

// == Task Kind ==
/// The recurring task types known to the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskKind {
    ClearAllBackups,
}

// == Task Status ==
/// Point-in-time view of a task, derived from its handle. Never stored.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    /// Whether the task is enabled
    pub enabled: bool,
    /// The cron trigger expression the timer was armed with
    pub cron_expression: String,
    /// Task type
    pub kind: TaskKind,
    /// Whether the timer task is currently alive
    pub running: bool,
}

impl TaskStatus {
    /// Status reported for a task that was never started.
    pub fn unscheduled() -> Self {
        Self {
            enabled: false,
            cron_expression: String::new(),
            kind: TaskKind::ClearAllBackups,
            running: false,
        }
    }
}

// == Task Handle ==
/// Live representation of a started recurring task. Exactly one handle may
/// exist per task name; starting again replaces the prior handle.
struct TaskHandle {
    cron_expression: String,
    enabled: bool,
    kind: TaskKind,
    timer: JoinHandle<()>,
}

impl TaskHandle {
    fn status(&self) -> TaskStatus {
        TaskStatus {
            enabled: self.enabled,
            cron_expression: self.cron_expression.clone(),
            kind: self.kind,
            running: !self.timer.is_finished(),
        }
    }
}

// == Task Registry ==
/// Registry of running cron timers, keyed by task name.
///
/// Each timer is a tokio task that sleeps until the next cron occurrence and
/// then fires its callback without waiting for the triggered work to finish.
#[derive(Default)]
pub struct TaskRegistry {
    tasks: HashMap<String, TaskHandle>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates the expression and arms a cron timer for `name`.
    ///
    /// An existing handle with the same name is stopped first. The callback
    /// fires on every cron occurrence; it is expected to spawn its own work so
    /// the timer loop never blocks on an execution. Returns once the timer is
    /// armed, not once anything has run.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    /// * `name` - Task name the handle is registered under
    /// * `cron_expression` - Five-field cron trigger expression
    /// * `callback` - Invoked on each timer fire
    pub fn start(
        &mut self,
        name: &str,
        cron_expression: &str,
        callback: impl Fn() + Send + Sync + 'static,
    ) -> Result<()> {
        let cron = Cron::from_str(cron_expression)
            .map_err(|e| SchedulerError::InvalidExpression(format!("'{}': {}", cron_expression, e)))?;

        // Replace-on-start: tear down any prior handle for this name
        self.stop(name);

        let task_name = name.to_string();
        let timer = tokio::spawn(async move {
            loop {
                let now = Utc::now();
                let next = match cron.find_next_occurrence(&now, false) {
                    Ok(next) => next,
                    Err(e) => {
                        error!("Timer for '{}' cannot compute next occurrence: {}", task_name, e);
                        break;
                    }
                };

                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                debug!("Task '{}' sleeping until {} ({:?})", task_name, next, wait);
                tokio::time::sleep(wait).await;

                info!("Task '{}' fired", task_name);
                callback();
            }
        });

        self.tasks.insert(
            name.to_string(),
            TaskHandle {
                cron_expression: cron_expression.to_string(),
                enabled: true,
                kind: TaskKind::ClearAllBackups,
                timer,
            },
        );

        info!("Task '{}' scheduled with expression '{}'", name, cron_expression);
        Ok(())
    }

    /// Halts the timer for `name` and removes the handle. No-op when absent.
    pub fn stop(&mut self, name: &str) {
        if let Some(handle) = self.tasks.remove(name) {
            handle.timer.abort();
            info!("Task '{}' stopped", name);
        }
    }

    /// Stops every registered task; used at shutdown.
    pub fn stop_all(&mut self) {
        let names: Vec<String> = self.tasks.keys().cloned().collect();
        for name in names {
            self.stop(&name);
        }
    }

    /// Returns the status for `name`, or `None` when no handle exists.
    pub fn status(&self, name: &str) -> Option<TaskStatus> {
        self.tasks.get(name).map(TaskHandle::status)
    }

    /// Snapshot of every registered task's status.
    pub fn status_all(&self) -> HashMap<String, TaskStatus> {
        self.tasks
            .iter()
            .map(|(name, handle)| (name.clone(), handle.status()))
            .collect()
    }

    /// Number of registered tasks.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no task is registered.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_start_valid_expression() {
        let mut registry = TaskRegistry::new();
        registry.start("clearAllBackups", "0 3 * * *", || {}).unwrap();

        let status = registry.status("clearAllBackups").unwrap();
        assert!(status.enabled);
        assert!(status.running);
        assert_eq!(status.cron_expression, "0 3 * * *");
        assert_eq!(status.kind, TaskKind::ClearAllBackups);
    }

    #[tokio::test]
    async fn test_start_invalid_expression() {
        let mut registry = TaskRegistry::new();
        let result = registry.start("clearAllBackups", "not a cron", || {});

        assert!(matches!(result, Err(SchedulerError::InvalidExpression(_))));
        assert!(registry.status("clearAllBackups").is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_start_empty_expression() {
        let mut registry = TaskRegistry::new();
        let result = registry.start("clearAllBackups", "", || {});
        assert!(matches!(result, Err(SchedulerError::InvalidExpression(_))));
    }

    #[tokio::test]
    async fn test_start_replaces_existing_handle() {
        let mut registry = TaskRegistry::new();
        registry.start("clearAllBackups", "0 3 * * *", || {}).unwrap();
        registry.start("clearAllBackups", "30 4 * * *", || {}).unwrap();

        assert_eq!(registry.len(), 1);
        let status = registry.status("clearAllBackups").unwrap();
        assert_eq!(status.cron_expression, "30 4 * * *");
    }

    #[tokio::test]
    async fn test_stop_unknown_name_is_noop() {
        let mut registry = TaskRegistry::new();
        registry.stop("does-not-exist");
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_stop_removes_handle() {
        let mut registry = TaskRegistry::new();
        registry.start("clearAllBackups", "0 3 * * *", || {}).unwrap();
        registry.stop("clearAllBackups");

        assert!(registry.status("clearAllBackups").is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_stop_all() {
        let mut registry = TaskRegistry::new();
        registry.start("taskA", "0 3 * * *", || {}).unwrap();
        registry.start("taskB", "0 4 * * *", || {}).unwrap();
        registry.stop_all();

        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_status_all_snapshot() {
        let mut registry = TaskRegistry::new();
        registry.start("taskA", "0 3 * * *", || {}).unwrap();
        registry.start("taskB", "0 4 * * *", || {}).unwrap();

        let statuses = registry.status_all();
        assert_eq!(statuses.len(), 2);
        assert!(statuses["taskA"].running);
        assert!(statuses["taskB"].running);
    }

    #[tokio::test]
    async fn test_timer_stays_armed() {
        let mut registry = TaskRegistry::new();
        registry.start("clearAllBackups", "* * * * *", || {}).unwrap();

        // The timer loop should still be sleeping towards the next occurrence
        tokio::time::sleep(Duration::from_millis(100)).await;
        let status = registry.status("clearAllBackups").unwrap();
        assert!(status.running);

        registry.stop_all();
    }
}
