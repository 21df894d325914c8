use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::clock::span_between;
use super::task::{TaskFailure, TaskId};

/// Outcome of executing one task. Never mutated once appended to a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskResult {
    task_id: TaskId,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<String>,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    duration: Duration,
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<TaskFailure>,
}

fn serialize_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(d.as_nanos() as f64 / 1_000_000.0)
}

impl TaskResult {
    /// Build a finished result. `error` decides `success`; `duration` is
    /// derived from the two timestamps.
    pub(crate) fn finished(
        task_id: TaskId,
        label: Option<String>,
        start_time: DateTime<Utc>,
        end_time: DateTime<Utc>,
        error: Option<TaskFailure>,
    ) -> Self {
        Self {
            task_id,
            label,
            start_time,
            end_time,
            duration: span_between(start_time, end_time),
            success: error.is_none(),
            error,
        }
    }

    pub fn task_id(&self) -> TaskId {
        self.task_id
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        self.end_time
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn error(&self) -> Option<&TaskFailure> {
        self.error.as_ref()
    }
}

/// Everything a finished run exposes: results plus the outer run span.
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    run_id: Uuid,
    run_start: DateTime<Utc>,
    run_end: DateTime<Utc>,
    /// Completion order.
    results: Vec<TaskResult>,
}

impl RunOutcome {
    pub(crate) fn new(
        run_id: Uuid,
        run_start: DateTime<Utc>,
        run_end: DateTime<Utc>,
        results: Vec<TaskResult>,
    ) -> Self {
        Self {
            run_id,
            run_start,
            run_end,
            results,
        }
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn run_start(&self) -> DateTime<Utc> {
        self.run_start
    }

    pub fn run_end(&self) -> DateTime<Utc> {
        self.run_end
    }

    /// Total wall-clock span of the run.
    pub fn wall_time(&self) -> Duration {
        span_between(self.run_start, self.run_end)
    }

    /// Results in the order tasks finished. Use `task_id` to correlate.
    pub fn results(&self) -> &[TaskResult] {
        &self.results
    }

    /// Results sorted by `task_id`.
    pub fn results_by_id(&self) -> Vec<&TaskResult> {
        let mut sorted: Vec<&TaskResult> = self.results.iter().collect();
        sorted.sort_by_key(|r| r.task_id);
        sorted
    }

    pub fn result(&self, task_id: TaskId) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.task_id == task_id)
    }

    pub fn task_count(&self) -> usize {
        self.results.len()
    }

    pub fn failed(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| !r.success)
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: i64) -> DateTime<Utc> {
        DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::milliseconds(ms)
    }

    #[test]
    fn success_derived_from_error() {
        let ok = TaskResult::finished(0, None, at(0), at(10), None);
        assert!(ok.success());
        assert!(ok.error().is_none());

        let failed = TaskResult::finished(
            1,
            Some("flaky".to_string()),
            at(0),
            at(10),
            Some(TaskFailure::Panicked("boom".to_string())),
        );
        assert!(!failed.success());
        assert_eq!(failed.label(), Some("flaky"));
        assert_eq!(failed.error(), Some(&TaskFailure::Panicked("boom".to_string())));
    }

    #[test]
    fn duration_is_span_of_timestamps() {
        let r = TaskResult::finished(0, None, at(100), at(350), None);
        assert_eq!(r.duration(), Duration::from_millis(250));
        assert_eq!(r.end_time() - r.start_time(), chrono::Duration::milliseconds(250));
    }

    #[test]
    fn outcome_sorting_and_lookup() {
        let outcome = RunOutcome::new(
            Uuid::new_v4(),
            at(0),
            at(1000),
            vec![
                TaskResult::finished(2, None, at(10), at(20), None),
                TaskResult::finished(0, None, at(10), at(30), None),
                TaskResult::finished(
                    1,
                    None,
                    at(10),
                    at(40),
                    Some(TaskFailure::Panicked("x".into())),
                ),
            ],
        );

        let ids: Vec<TaskId> = outcome.results_by_id().iter().map(|r| r.task_id()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
        assert_eq!(outcome.results()[0].task_id(), 2);
        assert_eq!(outcome.result(1).map(|r| r.success()), Some(false));
        assert!(outcome.result(7).is_none());
        assert_eq!(outcome.failed().count(), 1);
        assert!(!outcome.all_succeeded());
        assert_eq!(outcome.wall_time(), Duration::from_secs(1));
    }

    #[test]
    fn result_json_shape() {
        let failure = TaskFailure::Panicked("boom".into());
        let r = TaskResult::finished(3, None, at(0), at(5), Some(failure));
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["task_id"], 3);
        assert_eq!(json["success"], false);
        assert_eq!(json["duration_ms"], 5.0);
        assert_eq!(json["error"]["kind"], "panicked");
        assert!(json.get("label").is_none());
    }
}
