//! Human and machine readable summaries of a finished run.
//!
//! Reporters only read a [`RunOutcome`]; they never mutate it.

use std::fmt::Write as _;

use serde::Serialize;
use taskfan_core::ReportFormat;

use crate::scheduler::{RunMetrics, RunOutcome, TaskResult};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Renders a finished run.
pub trait Reporter {
    fn render(&self, outcome: &RunOutcome) -> Result<String, ReportError>;
}

/// Pick the reporter for a configured format.
pub fn reporter_for(format: ReportFormat) -> Box<dyn Reporter> {
    match format {
        ReportFormat::Text => Box::new(TextReporter),
        ReportFormat::Json => Box::new(JsonReporter { pretty: true }),
    }
}

// ── Text ──────────────────────────────────────────────────────

/// Plain-text summary, one line per task in id order.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextReporter;

impl Reporter for TextReporter {
    fn render(&self, outcome: &RunOutcome) -> Result<String, ReportError> {
        let mut out = String::new();

        writeln!(out, "=== Task Run Summary ===")?;
        writeln!(out, "Run id:      {}", outcome.run_id())?;
        writeln!(out, "Total tasks: {}", outcome.task_count())?;
        writeln!(out, "Failed:      {}", outcome.failed().count())?;
        writeln!(out, "Total time:  {:?}", outcome.wall_time())?;
        writeln!(out, "Start time:  {}", outcome.run_start().format(TIMESTAMP_FORMAT))?;
        writeln!(out, "End time:    {}", outcome.run_end().format(TIMESTAMP_FORMAT))?;

        writeln!(out)?;
        writeln!(out, "--- Task Details ---")?;
        for result in outcome.results_by_id() {
            write_task_line(&mut out, result)?;
        }

        Ok(out)
    }
}

fn write_task_line(out: &mut String, result: &TaskResult) -> std::fmt::Result {
    write!(out, "Task {}", result.task_id())?;
    if let Some(label) = result.label() {
        write!(out, " ({})", label)?;
    }
    let status = if result.success() { "succeeded" } else { "failed" };
    write!(out, ": {}, took {:?}", status, result.duration())?;
    if let Some(error) = result.error() {
        write!(out, ", error: {}", error)?;
    }
    writeln!(out)
}

// ── JSON ──────────────────────────────────────────────────────

/// JSON document with the run span, aggregate metrics, and per-task results.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonReporter {
    pub pretty: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    run_id: uuid::Uuid,
    run_start: chrono::DateTime<chrono::Utc>,
    run_end: chrono::DateTime<chrono::Utc>,
    metrics: RunMetrics,
    results: Vec<&'a TaskResult>,
}

impl Reporter for JsonReporter {
    fn render(&self, outcome: &RunOutcome) -> Result<String, ReportError> {
        let report = JsonReport {
            run_id: outcome.run_id(),
            run_start: outcome.run_start(),
            run_end: outcome.run_end(),
            metrics: RunMetrics::from_outcome(outcome),
            results: outcome.results_by_id(),
        };
        let rendered = if self.pretty {
            serde_json::to_string_pretty(&report)?
        } else {
            serde_json::to_string(&report)?
        };
        Ok(rendered)
    }
}
