//! Configuration validation

use tracing::debug;

use crate::error::{Result, StoreError};

use super::types::StoreConfig;

/// Validate configuration
pub fn validate_config(config: &StoreConfig) -> Result<()> {
    debug!("validating configuration");
    validate_url("api.url", &config.api.url)?;
    validate_url("api.auth_url", &config.api.auth_url)?;

    if config.api.request_timeout_secs == Some(0) {
        return Err(StoreError::Configuration(
            "api.request_timeout_secs must be greater than zero when set".to_string(),
        ));
    }

    if config.polling.interval_secs == 0 {
        return Err(StoreError::Configuration(
            "polling.interval_secs must be greater than zero".to_string(),
        ));
    }

    if config.polling.timeout_secs == Some(0) {
        return Err(StoreError::Configuration(
            "polling.timeout_secs must be greater than zero when set".to_string(),
        ));
    }

    debug!("configuration validation passed");
    Ok(())
}

fn validate_url(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(StoreError::Configuration(format!("{field} cannot be empty")));
    }

    let url = url::Url::parse(value)
        .map_err(|e| StoreError::Configuration(format!("{field} is not a valid URL: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(StoreError::Configuration(format!(
            "{field} must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}
