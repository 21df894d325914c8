use std::fmt;

use serde::Serialize;

/// Registration index of a task within one scheduler (0-based).
pub type TaskId = usize;

/// Error type for scheduler misuse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchedulerError {
    #[error("Scheduler already ran; create a new scheduler to run more tasks")]
    AlreadyRan,
}

/// Why a task did not complete normally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "message", rename_all = "snake_case")]
pub enum TaskFailure {
    /// The task body panicked; carries the panic message.
    #[error("task execution raised an exception: {0}")]
    Panicked(String),
    /// The OS refused to start the task's thread; the body never ran.
    #[error("failed to spawn task thread: {0}")]
    SpawnFailed(String),
}

/// A unit of work the scheduler can execute: no inputs, no outputs.
///
/// Any `FnOnce() + Send + 'static` closure converts into a `Task`, so
/// `scheduler.add_task(|| ...)` works directly.
pub struct Task {
    label: Option<String>,
    body: Box<dyn FnOnce() + Send + 'static>,
}

impl Task {
    pub fn new<F>(body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            label: None,
            body: Box::new(body),
        }
    }

    /// A task with a human-readable label for logs and reports.
    pub fn named<F>(label: impl Into<String>, body: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self {
            label: Some(label.into()),
            body: Box::new(body),
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub(crate) fn into_parts(self) -> (Option<String>, Box<dyn FnOnce() + Send + 'static>) {
        (self.label, self.body)
    }
}

impl<F> From<F> for Task
where
    F: FnOnce() + Send + 'static,
{
    fn from(body: F) -> Self {
        Task::new(body)
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}
