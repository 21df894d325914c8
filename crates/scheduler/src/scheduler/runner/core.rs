use taskfan_core::SchedulerConfig;
use tracing::debug;

use crate::scheduler::task::{SchedulerError, Task, TaskId};
use crate::scheduler::types::RunOutcome;

/// Run-once concurrent task scheduler.
///
/// Build it, register tasks with [`Scheduler::add_task`], then call
/// [`Scheduler::run`] exactly once. Every task gets its own OS thread and
/// all of them start together; `run` blocks until each one has finished
/// and recorded its [`TaskResult`](crate::TaskResult).
///
/// There is no concurrency cap and no timeout: a task that never returns
/// keeps `run` blocked forever, and very large task counts spawn that many
/// threads.
pub struct Scheduler {
    pub(super) config: SchedulerConfig,
    /// Tasks awaiting `run`, indexed by `TaskId`. Drained when `run` starts.
    pub(super) tasks: Vec<Task>,
    /// Number of tasks ever registered.
    pub(super) task_count: usize,
    /// Set once `run` has completed.
    pub(super) outcome: Option<RunOutcome>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            tasks: Vec::new(),
            task_count: 0,
            outcome: None,
        }
    }

    /// Register a task and return its id (its registration index).
    ///
    /// Fails with [`SchedulerError::AlreadyRan`] once `run` has been called.
    pub fn add_task(&mut self, task: impl Into<Task>) -> Result<TaskId, SchedulerError> {
        if self.has_run() {
            return Err(SchedulerError::AlreadyRan);
        }

        let task = task.into();
        let id = self.task_count;
        debug!(task_id = id, label = task.label().unwrap_or(""), "Registered task");
        self.tasks.push(task);
        self.task_count += 1;
        Ok(id)
    }

    /// Register a labelled task. See [`Scheduler::add_task`].
    pub fn add_named_task<F>(
        &mut self,
        label: impl Into<String>,
        body: F,
    ) -> Result<TaskId, SchedulerError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.add_task(Task::named(label, body))
    }

    /// Number of tasks registered, including ones already executed.
    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn has_run(&self) -> bool {
        self.outcome.is_some()
    }

    /// Results and run span, available once `run` has returned.
    pub fn outcome(&self) -> Option<&RunOutcome> {
        self.outcome.as_ref()
    }

    /// Take ownership of the outcome. The scheduler stays spent.
    pub fn into_outcome(self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }
}
