//! Store settings shared by the publish and validate commands

use std::path::{Path, PathBuf};

use clap::Args;

use acstore_core::config::{
    apply_overrides_with, load_config, load_config_or_default, validate_config,
};
use acstore_core::StoreConfig;

/// Where to find the store and how to wait for it
#[derive(Debug, Default, Args)]
pub struct SettingsArgs {
    /// Configuration file (default: acstore.toml or acstore.yaml, searched upwards)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Override the store API base URL
    #[arg(long)]
    pub api_url: Option<String>,

    /// Override the token exchange base URL
    #[arg(long)]
    pub auth_url: Option<String>,

    /// Seconds between processing status checks
    #[arg(long)]
    pub poll_interval: Option<u64>,

    /// Give up waiting for processing after this many seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl SettingsArgs {
    /// Config file, then environment, then command line flags.
    ///
    /// Returns the effective configuration and the file it came from.
    pub fn load(&self, dir: &Path) -> anyhow::Result<(StoreConfig, Option<PathBuf>)> {
        self.load_with(dir, |name| std::env::var(name).ok())
    }

    fn load_with<F>(
        &self,
        dir: &Path,
        lookup: F,
    ) -> anyhow::Result<(StoreConfig, Option<PathBuf>)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (mut config, path) = match &self.config {
            Some(path) => (load_config(path)?, Some(path.clone())),
            None => load_config_or_default(dir)?,
        };
        apply_overrides_with(&mut config, lookup)?;

        if let Some(url) = &self.api_url {
            config.api.url = url.clone();
        }
        if let Some(url) = &self.auth_url {
            config.api.auth_url = url.clone();
        }
        if let Some(secs) = self.poll_interval {
            config.polling.interval_secs = secs;
        }
        if let Some(secs) = self.timeout {
            config.polling.timeout_secs = Some(secs);
        }

        validate_config(&config)?;
        Ok((config, path))
    }
}
