//! Run-once concurrent task scheduler.
//!
//! A [`Scheduler`] takes any number of [`Task`]s, runs each on its own
//! thread, contains panics to the task that raised them, and records one
//! [`TaskResult`] per task. Results are appended under a single mutex and
//! `run` waits on a counting latch, so once it returns the outcome is
//! complete and no longer shared with any thread.

pub mod clock;
pub mod collector;
pub mod latch;
pub mod metrics;
pub mod runner;
pub mod task;
pub mod types;

pub use clock::RunClock;
pub use collector::{ResultCollector, SharedResultCollector};
pub use latch::{CompletionGuard, CompletionLatch};
pub use metrics::RunMetrics;
pub use runner::Scheduler;
pub use task::{SchedulerError, Task, TaskFailure, TaskId};
pub use types::{RunOutcome, TaskResult};
