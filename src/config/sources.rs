use super::models::Config;
use config::{ConfigError, Environment, File};
use std::env;
use std::path::PathBuf;

const CONFIG_ENV_VAR: &str = "LOGBUF_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/logbuf.toml";
const ENV_PREFIX: &str = "LOGBUF";
const ENV_SEPARATOR: &str = "__";

/// Config file path: `LOGBUF_CONFIG` if set, else the default location
pub fn config_path() -> PathBuf {
    env::var(CONFIG_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
}

/// Load configuration from multiple sources with priority:
/// 1. Defaults (embedded in structs)
/// 2. TOML file (if exists)
/// 3. Environment variables from .env file (via dotenvy)
/// 4. System environment variables (highest priority)
pub fn load() -> Result<Config, ConfigError> {
    let _ = dotenvy::dotenv();
    load_from_sources(config_path())
}

/// Load configuration from a specific path and environment
pub fn load_from_sources(config_path: PathBuf) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder();

    if config_path.exists() {
        tracing::debug!("Loading configuration from: {}", config_path.display());
        builder = builder.add_source(File::from(config_path).required(false));
    } else {
        tracing::debug!(
            "Configuration file not found at {}, using defaults and environment overrides",
            config_path.display()
        );
    }

    // LOGBUF__BUFFER__MAX_ENTRIES -> buffer.max_entries
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator(ENV_SEPARATOR)
            .try_parsing(true),
    );

    let config = builder.build()?;
    config.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_load_defaults_only() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.buffer.max_entries, 1000);
        assert_eq!(config.logging.stdout_level, "info");
    }

    #[test]
    fn test_load_from_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        let toml_content = r#"
[buffer]
path = ":memory:"
max_entries = 25
max_age = "90s"

[logging]
stdout_level = "warn"
        "#;

        fs::write(&config_path, toml_content).unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert!(config.buffer.is_ephemeral());
        assert_eq!(config.buffer.max_entries, 25);
        assert_eq!(config.buffer.max_age.as_duration(), Duration::from_secs(90));
        assert_eq!(config.logging.stdout_level, "warn");
    }

    #[test]
    fn test_integer_max_age_is_seconds() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[buffer]\nmax_age = 30\n").unwrap();

        let config = load_from_sources(config_path).unwrap();
        assert_eq!(config.buffer.max_age.as_duration(), Duration::from_secs(30));
    }

    #[test]
    fn test_malformed_duration() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("test.toml");

        fs::write(&config_path, "[buffer]\nmax_age = \"soon\"\n").unwrap();

        assert!(load_from_sources(config_path).is_err());
    }
}
