//! Validate command - check inputs without contacting the store

use clap::Args;
use console::style;
use tracing::info;

use acstore_core::Artifact;

use super::inputs::ReleaseArgs;
use super::settings::SettingsArgs;
use crate::cli::{output, Cli, OutputFormat};

/// Check the build path, token and release fields locally
#[derive(Debug, Args)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub release: ReleaseArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,
}

impl ValidateCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(artifact = %self.release.artifact, "executing validate command");

        let (config, config_path) = self.settings.load(&std::env::current_dir()?)?;
        let inputs = self.release.resolve()?;
        let artifact = Artifact::from_path(&inputs.artifact)?;
        let publishes = !inputs.release.publish_type.is_upload_only();

        match cli.format {
            OutputFormat::Json => {
                let report = serde_json::json!({
                    "valid": true,
                    "artifact": artifact.path().display().to_string(),
                    "platform": artifact.platform(),
                    "publish": publishes,
                    "api_url": config.api.url,
                    "config_path": config_path.map(|p| p.display().to_string()),
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
            OutputFormat::Text => {
                if !cli.quiet {
                    println!("{}", style("Validation Results").bold());
                    println!();
                    let path = artifact.path().display().to_string();
                    println!("{}", output::key_value("Artifact", &path));
                    let platform = artifact.platform().to_string();
                    println!("{}", output::key_value("Platform", &platform));
                    println!("{}", output::key_value("API", &config.api.url));
                    if let Some(path) = config_path {
                        let path = path.display().to_string();
                        println!("{}", output::key_value("Config", &path));
                    }
                    println!();
                    if publishes {
                        output::success("Ready to upload and publish");
                    } else {
                        output::success("Ready to upload (publish type 0, no publish)");
                    }
                }
            }
        }

        Ok(())
    }
}
