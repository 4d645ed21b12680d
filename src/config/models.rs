use crate::buffer::MEMORY_LOCATION;
use crate::humanize::HumanDuration;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::Level;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub buffer: BufferConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Buffer location and retention limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BufferConfig {
    /// Store directory, or `:memory:` for a process-local buffer
    #[serde(default = "default_path")]
    pub path: String,
    /// Newest entries to keep (0 disables the count limit)
    #[serde(default = "default_max_entries")]
    pub max_entries: u64,
    /// Maximum entry age relative to the newest entry (0 disables)
    #[serde(default = "default_max_age")]
    pub max_age: HumanDuration,
}

impl BufferConfig {
    /// Process-local buffer with the given limits
    pub fn in_memory(max_entries: u64, max_age: Duration) -> Self {
        Self {
            path: MEMORY_LOCATION.to_string(),
            max_entries,
            max_age: HumanDuration(max_age),
        }
    }

    pub fn is_ephemeral(&self) -> bool {
        self.path == MEMORY_LOCATION
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            max_entries: default_max_entries(),
            max_age: default_max_age(),
        }
    }
}

fn default_path() -> String {
    "data/logbuf".to_string()
}

fn default_max_entries() -> u64 {
    1000
}

fn default_max_age() -> HumanDuration {
    HumanDuration(Duration::from_secs(5 * 60))
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Lowest level echoed to stdout by the demo command
    #[serde(default = "default_stdout_level")]
    pub stdout_level: String,
}

impl LoggingConfig {
    /// Parsed `stdout_level`, `None` if it is not a valid level name
    pub fn level(&self) -> Option<Level> {
        self.stdout_level.trim().parse::<Level>().ok()
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            stdout_level: default_stdout_level(),
        }
    }
}

fn default_stdout_level() -> String {
    "info".to_string()
}
