use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use tracing::{debug, warn};

use crate::scheduler::clock::RunClock;
use crate::scheduler::task::{TaskFailure, TaskId};
use crate::scheduler::types::TaskResult;

/// Run one task body behind a fault barrier and record its outcome.
///
/// A panic in `body` is caught here and becomes a failed [`TaskResult`];
/// it never unwinds past this function. A normal return is a success.
pub(super) fn execute_isolated(
    task_id: TaskId,
    label: Option<String>,
    body: Box<dyn FnOnce() + Send + 'static>,
    clock: &RunClock,
) -> TaskResult {
    let start_time = clock.now();
    debug!(task_id, "Task started");

    let error = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(()) => None,
        Err(payload) => {
            let message = panic_message(payload.as_ref());
            warn!(task_id, panic = %message, "Task panicked");
            Some(TaskFailure::Panicked(message))
        }
    };

    let end_time = clock.now();
    let result = TaskResult::finished(task_id, label, start_time, end_time, error);
    debug!(
        task_id,
        success = result.success(),
        duration_ms = result.duration().as_millis() as u64,
        "Task finished"
    );
    result
}

/// Best-effort text of a panic payload.
pub(super) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
