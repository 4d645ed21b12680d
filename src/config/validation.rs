use super::models::Config;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Buffer retention is empty: max_entries and max_age cannot both be zero")]
    EmptyRetention,

    #[error("Buffer path must not be empty")]
    EmptyPath,

    #[error("Invalid logging level '{level}', expected one of trace, debug, info, warn, error")]
    InvalidLevel { level: String },
}

/// Validate the entire configuration
pub fn validate(config: &Config) -> Result<(), ValidationError> {
    validate_buffer(config)?;
    validate_logging(config)?;
    Ok(())
}

/// Ensure the buffer has a location and at least one retention limit
fn validate_buffer(config: &Config) -> Result<(), ValidationError> {
    if config.buffer.path.trim().is_empty() {
        return Err(ValidationError::EmptyPath);
    }

    if config.buffer.max_entries == 0 && config.buffer.max_age.is_zero() {
        return Err(ValidationError::EmptyRetention);
    }

    Ok(())
}

fn validate_logging(config: &Config) -> Result<(), ValidationError> {
    if config.logging.level().is_none() {
        return Err(ValidationError::InvalidLevel {
            level: config.logging.stdout_level.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::humanize::HumanDuration;

    #[test]
    fn test_valid_config() {
        let config = Config::default();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_retention() {
        let mut config = Config::default();
        config.buffer.max_entries = 0;
        config.buffer.max_age = HumanDuration::ZERO;

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyRetention)));
    }

    #[test]
    fn test_single_limit_is_enough() {
        let mut config = Config::default();
        config.buffer.max_entries = 0;
        assert!(validate(&config).is_ok());

        let mut config = Config::default();
        config.buffer.max_age = HumanDuration::ZERO;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_empty_path() {
        let mut config = Config::default();
        config.buffer.path = "  ".to_string();

        let result = validate(&config);
        assert!(matches!(result, Err(ValidationError::EmptyPath)));
    }

    #[test]
    fn test_invalid_level() {
        let mut config = Config::default();
        config.logging.stdout_level = "verbose".to_string();

        let result = validate(&config);
        assert!(matches!(
            result,
            Err(ValidationError::InvalidLevel { ref level }) if level == "verbose"
        ));
    }
}
