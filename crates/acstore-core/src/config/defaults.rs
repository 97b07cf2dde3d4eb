//! Default configuration values

/// Public API endpoint of the enterprise store
pub const DEFAULT_API_URL: &str = "https://api.appcircle.io";

/// Endpoint that exchanges personal tokens for access tokens
pub const DEFAULT_AUTH_URL: &str = "https://auth.appcircle.io";

/// Delay between two task status queries
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

/// Environment variable overriding `api.url`
pub const API_URL_ENV: &str = "ACSTORE_API_URL";

/// Environment variable overriding `api.auth_url`
pub const AUTH_URL_ENV: &str = "ACSTORE_AUTH_URL";

/// Environment variable overriding `polling.timeout_secs`
pub const POLL_TIMEOUT_ENV: &str = "ACSTORE_POLL_TIMEOUT";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "acstore.toml";

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "acstore.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_TOML,
        DEFAULT_CONFIG_YAML,
        ".acstore.toml",
        ".acstore.yaml",
    ]
}
