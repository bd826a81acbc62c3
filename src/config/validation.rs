use crate::config::types::Config;
use crate::ConfigError;
use url::Url;

/// Validates a configuration after parsing
///
/// Checks value ranges that the type system cannot express: a zero attempt
/// budget or batch size would stall the engine, and the base URL must be an
/// absolute HTTP(S) URL with a host.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.fetch.max_attempts == 0 {
        return Err(ConfigError::Validation(
            "fetch.max-attempts must be at least 1".to_string(),
        ));
    }

    if config.fetch.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fetch.user-agent must not be empty".to_string(),
        ));
    }

    if config.collector.batch_size == 0 {
        return Err(ConfigError::Validation(
            "collector.batch-size must be at least 1".to_string(),
        ));
    }

    let base = Url::parse(&config.listing.base_url).map_err(|e| {
        ConfigError::Validation(format!(
            "listing.base-url is not a valid URL: {}",
            e
        ))
    })?;

    if base.host_str().is_none() {
        return Err(ConfigError::Validation(
            "listing.base-url must have a host".to_string(),
        ));
    }

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "listing.base-url must be http or https, got: {}",
            base.scheme()
        )));
    }

    Ok(())
}
