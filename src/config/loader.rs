use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::KitchenConfig, validate::validate_config, ConfigError};

/// Load configuration from file with environment variable overrides.
///
/// Nested keys use a double underscore: `KITCHEN_FEED__POLL_INTERVAL_MS=500`.
pub fn load_config(path: &Path) -> Result<KitchenConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    let config: KitchenConfig = Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed("KITCHEN_").split("__"))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    validate_config(&config)?;
    Ok(config)
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<KitchenConfig, ConfigError> {
    let config: KitchenConfig =
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}
