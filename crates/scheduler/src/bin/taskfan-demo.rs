//! taskfan-demo — runs a small mixed workload through the scheduler.
//!
//! Registers three sleeping tasks (500/300/700 ms) and one that panics
//! after 200 ms, runs them concurrently, and prints the run report. The
//! whole run should take about as long as the slowest task.

use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing::{debug, info};

use taskfan_core::{Config, ReportFormat, SchedulerConfig};
use taskfan_scheduler::{Scheduler, reporter_for};

// ── CLI ─────────────────────────────────────────────────────────────

/// Concurrent task scheduler demo.
#[derive(Parser, Debug)]
#[command(name = "taskfan-demo", version, about)]
struct Cli {
    /// Report format: text or json (overrides config).
    #[arg(long)]
    format: Option<ReportFormat>,

    /// Multiplier applied to every task's sleep time.
    #[arg(long, env = "TASKFAN_TIME_SCALE", default_value_t = 1.0)]
    time_scale: f64,

    /// Optional TOML config file (defaults come from the environment).
    #[arg(long)]
    config: Option<PathBuf>,
}

fn scaled(ms: u64, scale: f64) -> Duration {
    Duration::from_secs_f64(ms as f64 / 1000.0 * scale)
}

/// Whether `thread` is one of the scheduler's execution threads.
fn is_task_thread(thread: Option<&str>, task_prefix: &str) -> bool {
    thread.is_some_and(|name| name.starts_with(task_prefix))
}

/// Route panics on task threads to `tracing`; everything else goes to the
/// hook that was installed before.
fn install_task_panic_hook(config: &SchedulerConfig) {
    let task_prefix = config.thread_name(0).trim_end_matches('0').to_string();
    let previous = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let current = thread::current();
        if is_task_thread(current.name(), &task_prefix) {
            debug!(thread = current.name().unwrap_or("?"), "{}", info);
        } else {
            previous(info);
        }
    }));
}

// ── main ────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    taskfan_core::load_dotenv();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::from_toml_file(path)
            .with_context(|| format!("failed to load config: {}", path.display()))?,
        None => Config::from_env(),
    };
    if let Some(format) = cli.format {
        config.report_format = format;
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Panics inside tasks are recovered by the scheduler; keep the default
    // hook from printing them over the report.
    install_task_panic_hook(&config.scheduler);

    if !(cli.time_scale.is_finite() && cli.time_scale >= 0.0) {
        bail!("--time-scale must be a non-negative number, got {}", cli.time_scale);
    }
    config.log_summary();

    let scale = cli.time_scale;
    let mut scheduler = Scheduler::new(config.scheduler.clone());
    for (label, ms) in [("task-1", 500), ("task-2", 300), ("task-3", 700)] {
        scheduler.add_named_task(label, move || {
            thread::sleep(scaled(ms, scale));
            info!(label, "task complete");
        })?;
    }
    scheduler.add_named_task("task-with-error", move || {
        thread::sleep(scaled(200, scale));
        panic!("simulated task failure");
    })?;

    info!(tasks = scheduler.task_count(), "starting tasks");
    scheduler.run()?;

    let outcome = scheduler
        .outcome()
        .context("scheduler finished without an outcome")?;
    let report = reporter_for(config.report_format).render(outcome)?;
    println!("{}", report);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_task_threads_are_routed_to_tracing() {
        let config = SchedulerConfig::default();
        let prefix = config.thread_name(0).trim_end_matches('0').to_string();
        assert_eq!(prefix, "task-");

        assert!(is_task_thread(Some("task-0"), &prefix));
        assert!(is_task_thread(Some("task-12"), &prefix));
        assert!(!is_task_thread(Some("main"), &prefix));
        assert!(!is_task_thread(Some("tasks"), &prefix));
        assert!(!is_task_thread(None, &prefix));
    }

    #[test]
    fn format_flag_ignores_report_format_env() {
        // TASKFAN_REPORT_FORMAT is read by Config::from_env only.
        std::env::set_var("TASKFAN_REPORT_FORMAT", "json");
        let cli = Cli::try_parse_from(["taskfan-demo"]).unwrap();
        assert!(cli.format.is_none());

        let cli = Cli::try_parse_from(["taskfan-demo", "--format", "json"]).unwrap();
        assert_eq!(cli.format, Some(ReportFormat::Json));
    }
}
