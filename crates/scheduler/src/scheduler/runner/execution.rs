use std::sync::Arc;
use std::thread;

use tracing::{error, info, info_span, Span};
use uuid::Uuid;

use crate::scheduler::clock::RunClock;
use crate::scheduler::collector::{ResultCollector, SharedResultCollector};
use crate::scheduler::latch::CompletionLatch;
use crate::scheduler::task::{SchedulerError, Task, TaskFailure, TaskId};
use crate::scheduler::types::{RunOutcome, TaskResult};

use super::isolation::execute_isolated;
use super::Scheduler;

impl Scheduler {
    /// Execute every registered task concurrently and block until all finish.
    ///
    /// Each task runs on its own thread behind a fault barrier, so a
    /// panicking task is recorded as failed and never disturbs the others.
    /// Afterwards [`Scheduler::outcome`] holds exactly one result per task.
    ///
    /// May be called once. A second call returns
    /// [`SchedulerError::AlreadyRan`] and runs nothing.
    pub fn run(&mut self) -> Result<(), SchedulerError> {
        if self.has_run() {
            return Err(SchedulerError::AlreadyRan);
        }

        let tasks = std::mem::take(&mut self.tasks);
        let run_id = Uuid::new_v4();
        let span = info_span!("run", %run_id);
        let _entered = span.enter();

        let task_count = tasks.len();
        let clock = RunClock::start();
        let collector = ResultCollector::with_capacity(task_count);
        let latch = CompletionLatch::new(task_count);

        info!(tasks = task_count, "Run starting");

        for (task_id, task) in tasks.into_iter().enumerate() {
            self.dispatch(task_id, task, clock, &collector, &latch, &span);
        }

        latch.wait();
        let run_end = clock.now();

        let outcome = RunOutcome::new(run_id, clock.origin(), run_end, collector.drain());
        info!(
            tasks = outcome.task_count(),
            failed = outcome.failed().count(),
            wall_ms = outcome.wall_time().as_millis() as u64,
            "Run finished"
        );
        self.outcome = Some(outcome);
        Ok(())
    }

    /// Start one task on its own thread.
    ///
    /// The completion guard travels inside the thread closure and is
    /// dropped after the result has been pushed. If the thread cannot be
    /// spawned the closure is dropped unrun, which releases the guard, and
    /// a failed result is recorded here instead.
    fn dispatch(
        &self,
        task_id: TaskId,
        task: Task,
        clock: RunClock,
        collector: &SharedResultCollector,
        latch: &Arc<CompletionLatch>,
        span: &Span,
    ) {
        let (label, body) = task.into_parts();
        let completion = latch.guard();
        let sink = Arc::clone(collector);
        let thread_span = span.clone();
        let thread_label = label.clone();

        let mut builder = thread::Builder::new().name(self.config.thread_name(task_id));
        if let Some(size) = self.config.stack_size() {
            builder = builder.stack_size(size);
        }

        let spawned = builder.spawn(move || {
            let _completion = completion;
            let _entered = thread_span.enter();
            let result = execute_isolated(task_id, thread_label, body, &clock);
            sink.push(result);
        });

        if let Err(e) = spawned {
            error!(task_id, error = %e, "Failed to spawn task thread");
            let now = clock.now();
            collector.push(TaskResult::finished(
                task_id,
                label,
                now,
                now,
                Some(TaskFailure::SpawnFailed(e.to_string())),
            ));
        }
    }
}
