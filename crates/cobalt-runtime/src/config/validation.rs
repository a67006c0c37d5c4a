//! Configuration validation.

use super::error::{ConfigError, ConfigResult};
use super::schema::{CobaltConfig, LogOutput, LoggingConfig, WorkerConfig};

/// Validates the entire configuration.
pub fn validate_config(config: &CobaltConfig) -> ConfigResult<()> {
    validate_logging(&config.logging)?;
    validate_workers(&config.workers)?;
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output is \"file\"",
        ));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }

    if let Some(target) = logging.filters.keys().find(|target| target.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "logging.filters has an empty target ('{target}')"
        )));
    }

    Ok(())
}

fn validate_workers(workers: &WorkerConfig) -> ConfigResult<()> {
    // size = 0 disables the pool, so capacity only matters when it is enabled.
    if workers.size > 0 && workers.queue_capacity == 0 {
        return Err(ConfigError::validation(
            "workers.queue_capacity must be greater than 0",
        ));
    }
    Ok(())
}
