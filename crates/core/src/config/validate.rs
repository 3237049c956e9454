use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Reporter tick interval is not 0
/// - Encoder and metadata tool paths are set
/// - Encoder log level is set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.reporter.tick_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "reporter.tick_interval_ms cannot be 0".to_string(),
        ));
    }

    if config.encoder.ffmpeg_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "encoder.ffmpeg_path cannot be empty".to_string(),
        ));
    }

    if config.encoder.log_level.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "encoder.log_level cannot be empty".to_string(),
        ));
    }

    if config.metadata.ytdlp_path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "metadata.ytdlp_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
