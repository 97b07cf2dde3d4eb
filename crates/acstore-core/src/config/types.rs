//! Configuration types

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::poller::PollOptions;

use super::defaults::{DEFAULT_API_URL, DEFAULT_AUTH_URL, DEFAULT_POLL_INTERVAL_SECS};

/// Root configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Remote endpoints
    pub api: ApiConfig,

    /// Task polling behaviour
    pub polling: PollingConfig,
}

/// Remote endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the store API
    pub url: String,

    /// Base URL of the token exchange service
    pub auth_url: String,

    /// Per-request timeout in seconds (none by default, uploads can be large)
    pub request_timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_API_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            request_timeout_secs: None,
        }
    }
}

/// Task polling behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Seconds between two status queries
    pub interval_secs: u64,

    /// Give up waiting after this many seconds; unbounded when unset
    pub timeout_secs: Option<u64>,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            timeout_secs: None,
        }
    }
}

impl StoreConfig {
    /// Poll options derived from the polling section
    pub fn poll_options(&self) -> PollOptions {
        PollOptions {
            interval: Duration::from_secs(self.polling.interval_secs),
            timeout: self.polling.timeout_secs.map(Duration::from_secs),
        }
    }

    /// Request timeout for the HTTP client, if configured
    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.request_timeout_secs.map(Duration::from_secs)
    }
}
