use std::time::Duration;

use serde::Serialize;
use uuid::Uuid;

use super::task::TaskId;
use super::types::{RunOutcome, TaskResult};

/// Aggregate statistics over one finished run.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub run_id: Uuid,
    pub total_tasks: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Wall-clock span of the whole run.
    pub wall_time: Duration,
    /// Sum of every task's duration.
    pub busy_time: Duration,
    /// Mean task duration (zero for an empty run).
    pub mean_task_duration: Duration,
    /// Slowest task and its duration.
    pub longest_task: Option<(TaskId, Duration)>,
    /// `busy_time / wall_time`: roughly how many tasks ran at once.
    pub concurrency_ratio: f64,
}

impl RunMetrics {
    pub fn from_outcome(outcome: &RunOutcome) -> Self {
        let mut metrics = Self::empty(outcome.run_id(), outcome.wall_time());
        for result in outcome.results() {
            metrics.record(result);
        }
        metrics
    }

    fn empty(run_id: Uuid, wall_time: Duration) -> Self {
        Self {
            run_id,
            total_tasks: 0,
            succeeded: 0,
            failed: 0,
            wall_time,
            busy_time: Duration::ZERO,
            mean_task_duration: Duration::ZERO,
            longest_task: None,
            concurrency_ratio: 0.0,
        }
    }

    /// Fold one task result into the aggregate.
    fn record(&mut self, result: &TaskResult) {
        let duration = result.duration();
        self.total_tasks += 1;
        if result.success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.busy_time += duration;

        // Incremental mean: new_avg = prev_avg + (duration - prev_avg) / count
        self.mean_task_duration = if self.total_tasks == 1 {
            duration
        } else {
            let prev_nanos = self.mean_task_duration.as_nanos() as f64;
            let cur_nanos = duration.as_nanos() as f64;
            let avg_nanos = prev_nanos + (cur_nanos - prev_nanos) / self.total_tasks as f64;
            Duration::from_nanos(avg_nanos as u64)
        };

        if self.longest_task.map_or(true, |(_, longest)| duration > longest) {
            self.longest_task = Some((result.task_id(), duration));
        }

        if !self.wall_time.is_zero() {
            self.concurrency_ratio = self.busy_time.as_secs_f64() / self.wall_time.as_secs_f64();
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.total_tasks == 0 {
            1.0
        } else {
            self.succeeded as f64 / self.total_tasks as f64
        }
    }
}
