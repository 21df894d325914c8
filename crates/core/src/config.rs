use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Load .env file (silently ignores if missing).
pub fn load_dotenv() {
    dotenvy::dotenv().ok();
}

fn env_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

// ── Report format ─────────────────────────────────────────────

/// Output format for run reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for ReportFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "txt" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(CoreError::InvalidValue {
                key: "report_format".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str("text"),
            Self::Json => f.write_str("json"),
        }
    }
}

// ── Scheduler config ──────────────────────────────────────────

/// Settings for the threads the scheduler spawns, one per task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Execution threads are named `{prefix}-{task_id}`.
    #[serde(default = "default_thread_name_prefix")]
    pub thread_name_prefix: String,
    /// Stack size for each execution thread. 0 = platform default.
    #[serde(default)]
    pub stack_size_bytes: usize,
}

fn default_thread_name_prefix() -> String {
    "task".to_string()
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: default_thread_name_prefix(),
            stack_size_bytes: 0,
        }
    }
}

impl SchedulerConfig {
    /// Thread name for the execution context of `task_id`.
    ///
    /// NUL bytes are stripped: `std::thread::Builder` panics on them.
    pub fn thread_name(&self, task_id: usize) -> String {
        let prefix: String = self.thread_name_prefix.chars().filter(|&c| c != '\0').collect();
        format!("{}-{}", prefix, task_id)
    }

    /// Reject values the OS thread API cannot accept.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.thread_name_prefix.contains('\0') {
            return Err(CoreError::InvalidValue {
                key: "scheduler.thread_name_prefix".to_string(),
                value: self.thread_name_prefix.clone(),
            });
        }
        Ok(())
    }

    /// Stack size override, if one is configured.
    pub fn stack_size(&self) -> Option<usize> {
        (self.stack_size_bytes > 0).then_some(self.stack_size_bytes)
    }
}

// ── Top-level config ──────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub report_format: ReportFormat,
    /// `tracing_subscriber::EnvFilter` directive.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler: SchedulerConfig::default(),
            report_format: ReportFormat::default(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Build config from environment variables (call `load_dotenv()` first).
    ///
    /// Reads `TASKFAN_THREAD_PREFIX`, `TASKFAN_STACK_SIZE`,
    /// `TASKFAN_REPORT_FORMAT` and `TASKFAN_LOG`. Unparseable values are
    /// logged and replaced by their defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(env_opt)
    }

    /// Build config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let thread_name_prefix = match lookup("TASKFAN_THREAD_PREFIX") {
            Some(raw) if raw.contains('\0') => {
                tracing::warn!(value = ?raw, "invalid TASKFAN_THREAD_PREFIX, using default");
                defaults.scheduler.thread_name_prefix
            }
            Some(raw) => raw,
            None => defaults.scheduler.thread_name_prefix,
        };

        let stack_size_bytes = match lookup("TASKFAN_STACK_SIZE") {
            Some(raw) => raw.trim().parse::<usize>().unwrap_or_else(|_| {
                tracing::warn!(value = %raw, "invalid TASKFAN_STACK_SIZE, using platform default");
                0
            }),
            None => 0,
        };

        let report_format = match lookup("TASKFAN_REPORT_FORMAT") {
            Some(raw) => raw.parse::<ReportFormat>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "falling back to text reports");
                ReportFormat::Text
            }),
            None => defaults.report_format,
        };

        Self {
            scheduler: SchedulerConfig {
                thread_name_prefix,
                stack_size_bytes,
            },
            report_format,
            log_filter: lookup("TASKFAN_LOG").unwrap_or(defaults.log_filter),
        }
    }

    /// Load config from a TOML file. Missing sections take their defaults.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        config.scheduler.validate()?;
        Ok(config)
    }

    /// Print a summary for startup logs.
    pub fn log_summary(&self) {
        tracing::info!("Config loaded:");
        tracing::info!("  scheduler:   thread_prefix={}, stack_size={}",
            self.scheduler.thread_name_prefix,
            self.scheduler.stack_size().map_or("default".to_string(), |s| s.to_string()));
        tracing::info!("  report:      format={}", self.report_format);
        tracing::info!("  log:         filter={}", self.log_filter);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.scheduler.thread_name_prefix, "task");
        assert_eq!(config.scheduler.stack_size(), None);
        assert_eq!(config.report_format, ReportFormat::Text);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn empty_lookup_matches_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
    }

    #[test]
    fn lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TASKFAN_THREAD_PREFIX", "worker"),
            ("TASKFAN_STACK_SIZE", "65536"),
            ("TASKFAN_REPORT_FORMAT", "JSON"),
            ("TASKFAN_LOG", "debug"),
        ]));
        assert_eq!(config.scheduler.thread_name(3), "worker-3");
        assert_eq!(config.scheduler.stack_size(), Some(65536));
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.log_filter, "debug");
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("TASKFAN_STACK_SIZE", "big"),
            ("TASKFAN_REPORT_FORMAT", "yaml"),
        ]));
        assert_eq!(config.scheduler.stack_size_bytes, 0);
        assert_eq!(config.report_format, ReportFormat::Text);
    }

    #[test]
    fn report_format_parse() {
        assert_eq!(" Text ".parse::<ReportFormat>().unwrap(), ReportFormat::Text);
        assert_eq!("json".parse::<ReportFormat>().unwrap(), ReportFormat::Json);
        assert!(matches!(
            "xml".parse::<ReportFormat>(),
            Err(CoreError::InvalidValue { .. })
        ));
    }

    #[test]
    fn toml_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "report_format = \"json\"\n\n[scheduler]\nstack_size_bytes = 1048576"
        )
        .unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.report_format, ReportFormat::Json);
        assert_eq!(config.scheduler.thread_name_prefix, "task");
        assert_eq!(config.scheduler.stack_size(), Some(1_048_576));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn toml_file_rejects_nul_in_thread_prefix() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[scheduler]\nthread_name_prefix = \"x\\u0000y\"").unwrap();
        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidValue { ref key, .. } if key == "scheduler.thread_name_prefix"
        ));
    }

    #[test]
    fn nul_thread_prefix_from_lookup_falls_back() {
        let config = Config::from_lookup(lookup_from(&[("TASKFAN_THREAD_PREFIX", "a\0b")]));
        assert_eq!(config.scheduler.thread_name_prefix, "task");
        assert!(config.scheduler.validate().is_ok());
    }

    #[test]
    fn thread_name_strips_nul() {
        let config = SchedulerConfig {
            thread_name_prefix: "a\0b".to_string(),
            stack_size_bytes: 0,
        };
        assert!(config.validate().is_err());
        assert_eq!(config.thread_name(7), "ab-7");
    }

    #[test]
    fn toml_file_missing() {
        let err = Config::from_toml_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn toml_file_malformed() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "report_format = ").unwrap();
        let err = Config::from_toml_file(file.path()).unwrap_err();
        assert!(matches!(err, CoreError::Toml(_)));
    }
}
