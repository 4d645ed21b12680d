//! Configuration management for logbuf
//!
//! This module provides a layered configuration system that loads settings from:
//! 1. Default values (embedded in structs)
//! 2. TOML configuration file
//! 3. Environment variables (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use logbuf::config::Config;
//!
//! let config = Config::load().expect("Failed to load configuration");
//! println!("Buffer stored at: {}", config.buffer.path);
//! ```
//!
//! # Environment Variables
//!
//! Configuration can be overridden using environment variables with the pattern:
//! `LOGBUF__<section>__<key>`
//!
//! Examples:
//! - `LOGBUF__BUFFER__PATH=:memory:`
//! - `LOGBUF__BUFFER__MAX_ENTRIES=500`
//! - `LOGBUF__BUFFER__MAX_AGE=10m`
//! - `LOGBUF__LOGGING__STDOUT_LEVEL=debug`
//!
//! # Configuration File
//!
//! By default, the configuration is loaded from `config/logbuf.toml`.
//! This can be overridden using the `LOGBUF_CONFIG` environment variable.

mod models;
mod sources;
mod validation;

pub use crate::humanize::HumanDuration;
pub use models::{BufferConfig, Config, LoggingConfig};
pub use validation::ValidationError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Configuration validation failed: {0}")]
    ValidationError(#[from] ValidationError),
}

impl Config {
    /// Load configuration from all sources (file + environment)
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables (`LOGBUF__*`)
    /// 2. TOML file (default: `config/logbuf.toml`)
    /// 3. Default values
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file is malformed or if
    /// validation fails.
    pub fn load() -> Result<Self, ConfigError> {
        let config = sources::load()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific path
    ///
    /// Environment overrides still apply.
    pub fn load_from_path(path: std::path::PathBuf) -> Result<Self, ConfigError> {
        let config = sources::load_from_sources(path)?;
        validation::validate(&config)?;
        Ok(config)
    }
}
