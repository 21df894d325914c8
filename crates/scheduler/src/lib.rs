pub mod report;
pub mod scheduler;

pub use report::{JsonReporter, ReportError, Reporter, TextReporter, reporter_for};
pub use scheduler::{
    RunMetrics, RunOutcome, Scheduler, SchedulerError, Task, TaskFailure, TaskId, TaskResult,
};
pub use taskfan_core::{ReportFormat, SchedulerConfig};
