//! Configuration loading

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, StoreError};

use super::defaults::{config_file_names, API_URL_ENV, AUTH_URL_ENV, POLL_TIMEOUT_ENV};
use super::types::StoreConfig;
use super::validation::validate_config;

/// Load configuration from a file
pub fn load_config(path: &Path) -> Result<StoreConfig> {
    let format = if path.extension().is_some_and(|e| e == "toml") {
        "TOML"
    } else {
        "YAML"
    };
    info!(path = %path.display(), format, "loading config");

    let content = std::fs::read_to_string(path)?;

    let config: StoreConfig = if format == "TOML" {
        toml::from_str(&content)
            .map_err(|e| StoreError::Configuration(format!("{}: {}", path.display(), e)))?
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| StoreError::Configuration(format!("{}: {}", path.display(), e)))?
    };

    validate_config(&config)?;
    debug!(path = %path.display(), "config loaded and validated");
    Ok(config)
}

/// Find configuration file in directory or parent directories.
///
/// The first match wins. Parents are walked until the filesystem root.
pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), "searching for config file");
    let mut current = start_dir.to_path_buf();

    loop {
        for name in config_file_names() {
            let config_path = current.join(name);
            if config_path.exists() {
                info!(path = %config_path.display(), "found config file");
                return Some(config_path);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!("no config file found");
    None
}

/// Load configuration or use defaults when no file exists.
///
/// A file that exists but fails to parse or validate is an error.
pub fn load_config_or_default(dir: &Path) -> Result<(StoreConfig, Option<PathBuf>)> {
    match find_config(dir) {
        Some(path) => {
            let config = load_config(&path)?;
            Ok((config, Some(path)))
        }
        None => {
            debug!(dir = %dir.display(), "no config found, using defaults");
            Ok((StoreConfig::default(), None))
        }
    }
}

/// Apply environment overrides on top of a loaded configuration
pub fn apply_env_overrides(config: &mut StoreConfig) -> Result<()> {
    apply_overrides_with(config, |name| std::env::var(name).ok())
}

/// Apply overrides read through `lookup`, then re-validate
pub fn apply_overrides_with<F>(config: &mut StoreConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.is_empty()) {
        debug!(env = API_URL_ENV, "overriding api.url");
        config.api.url = url;
    }

    if let Some(url) = lookup(AUTH_URL_ENV).filter(|v| !v.is_empty()) {
        debug!(env = AUTH_URL_ENV, "overriding api.auth_url");
        config.api.auth_url = url;
    }

    if let Some(raw) = lookup(POLL_TIMEOUT_ENV).filter(|v| !v.is_empty()) {
        match raw.trim().parse::<u64>() {
            Ok(secs) => config.polling.timeout_secs = Some(secs),
            Err(_) => {
                warn!(env = POLL_TIMEOUT_ENV, value = %raw, "ignoring non-numeric poll timeout");
            }
        }
    }

    validate_config(config)
}
