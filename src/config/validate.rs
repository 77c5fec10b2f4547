use super::{types::KitchenConfig, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Mailbox and channel sizes are not 0
/// - Retries make at least one attempt
/// - The warning threshold does not come after the urgent one
pub fn validate_config(config: &KitchenConfig) -> Result<(), ConfigError> {
    if config.actor.mailbox_size == 0 {
        return Err(ConfigError::ValidationError(
            "actor.mailbox_size cannot be 0".to_string(),
        ));
    }
    if config.sync.channel_capacity == 0 {
        return Err(ConfigError::ValidationError(
            "sync.channel_capacity cannot be 0".to_string(),
        ));
    }
    if config.feed.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "feed.poll_interval_ms cannot be 0".to_string(),
        ));
    }
    if config.retry.max_attempts == 0 {
        return Err(ConfigError::ValidationError(
            "retry.max_attempts cannot be 0".to_string(),
        ));
    }
    if config.urgency.warning_after_secs > config.urgency.urgent_after_secs {
        return Err(ConfigError::ValidationError(
            "urgency.warning_after_secs cannot exceed urgency.urgent_after_secs".to_string(),
        ));
    }

    Ok(())
}
