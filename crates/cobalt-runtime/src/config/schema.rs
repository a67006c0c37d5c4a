//! Configuration schema.
//!
//! Every section has a full set of defaults, so an empty file (or no file)
//! is a valid configuration.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! format = "pretty"
//!
//! [logging.filters]
//! cobalt_framework = "trace"
//!
//! [workers]
//! size = 8
//! queue_capacity = 512
//! queue_full = "drop_oldest"
//!
//! [commands]
//! sync_on_start = true
//! sync_group = 81384788765712384
//!
//! [shutdown]
//! grace_period_ms = 5000
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use cobalt_core::{GroupId, SyncTarget};
use cobalt_framework::{PoolConfig, QueueFullPolicy};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CobaltConfig {
    pub logging: LoggingConfig,
    pub workers: WorkerConfig,
    pub commands: CommandsConfig,
    pub shutdown: ShutdownConfig,
}

// =============================================================================
// Logging
// =============================================================================

/// Severity threshold for log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line format of log output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` without it.
    Json,
}

/// Where log output goes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Which span lifecycle events are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpanEventConfig {
    pub new: bool,
    pub enter: bool,
    pub exit: bool,
    pub close: bool,
}

/// How often the log file is rolled over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    pub span_events: SpanEventConfig,
    pub thread_ids: bool,
    /// Include source file and line in each record.
    pub file_location: bool,
    /// Log file for `output = "file"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    pub rotation: LogRotation,
    /// Rotated files kept on disk.
    pub max_files: u32,
    /// Per-target level overrides, e.g. `cobalt_framework = "trace"`.
    pub filters: HashMap<String, LogLevel>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            span_events: SpanEventConfig::default(),
            thread_ids: false,
            file_location: false,
            file_path: None,
            rotation: LogRotation::Never,
            max_files: 5,
            filters: HashMap::new(),
        }
    }
}

// =============================================================================
// Workers
// =============================================================================

/// Worker pool for threaded commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Number of workers; `0` disables the pool and runs threaded commands
    /// inline.
    pub size: usize,
    pub queue_capacity: usize,
    pub queue_full: QueueFullPolicy,
}

impl WorkerConfig {
    /// Pool settings, or `None` when the pool is disabled.
    pub fn to_pool_config(&self) -> Option<PoolConfig> {
        (self.size > 0).then_some(PoolConfig {
            workers: self.size,
            queue_capacity: self.queue_capacity,
            policy: self.queue_full,
        })
    }
}

impl Default for WorkerConfig {
    fn default() -> Self {
        let pool = PoolConfig::default();
        Self {
            size: pool.workers,
            queue_capacity: pool.queue_capacity,
            queue_full: pool.policy,
        }
    }
}

// =============================================================================
// Commands
// =============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommandsConfig {
    /// Publish the command set every time the runtime starts.
    pub sync_on_start: bool,
    /// Publish to one group instead of globally.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync_group: Option<GroupId>,
}

impl CommandsConfig {
    pub fn sync_target(&self) -> SyncTarget {
        self.sync_group.map_or(SyncTarget::Global, SyncTarget::Group)
    }
}

// =============================================================================
// Shutdown
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How long in-flight handlers may run after a shutdown signal.
    pub grace_period_ms: u64,
}

impl ShutdownConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 10_000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_pool() {
        let workers = WorkerConfig {
            size: 0,
            ..Default::default()
        };
        assert_eq!(workers.to_pool_config(), None);

        let workers = WorkerConfig {
            size: 3,
            queue_capacity: 7,
            queue_full: QueueFullPolicy::Reject,
        };
        let pool = workers.to_pool_config().unwrap();
        assert_eq!(pool.workers, 3);
        assert_eq!(pool.queue_capacity, 7);
        assert_eq!(pool.policy, QueueFullPolicy::Reject);
    }

    #[test]
    fn test_sync_target() {
        assert_eq!(CommandsConfig::default().sync_target(), SyncTarget::Global);

        let commands = CommandsConfig {
            sync_on_start: true,
            sync_group: Some(GroupId::new(42)),
        };
        assert_eq!(commands.sync_target(), SyncTarget::Group(GroupId::new(42)));
    }
}
