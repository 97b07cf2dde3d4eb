//! Publish command - upload, wait for processing, publish

use std::sync::Arc;

use clap::Args;
use console::style;
use indicatif::ProgressBar;
use tracing::{info, warn};

use acstore_core::{AppcircleClient, PublishOutcome, PublishStage, Publisher, StoreConfig};

use super::inputs::{ReleaseArgs, ResolvedInputs};
use super::settings::SettingsArgs;
use crate::cli::{output, Cli, OutputFormat};
use crate::exit_codes;

/// Upload a build to the enterprise store and publish it
#[derive(Debug, Args)]
pub struct PublishCommand {
    #[command(flatten)]
    pub release: ReleaseArgs,

    #[command(flatten)]
    pub settings: SettingsArgs,

    /// Enterprise profile to publish into (default: the most recently updated one)
    #[arg(long, env = "AC_ENT_PROFILE_ID")]
    pub profile_id: Option<String>,

    /// Exit with an error when the upload succeeds but publishing is rejected
    #[arg(long)]
    pub fail_on_publish_error: bool,
}

impl PublishCommand {
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(artifact = %self.release.artifact, "executing publish command");
        let inputs = self.release.resolve()?;
        let (config, _) = self.settings.load(&std::env::current_dir()?)?;

        let runtime = tokio::runtime::Runtime::new()?;
        runtime.block_on(self.execute_async(cli, inputs, config))
    }

    async fn execute_async(
        &self,
        cli: &Cli,
        inputs: ResolvedInputs,
        config: StoreConfig,
    ) -> anyhow::Result<()> {
        let client = AppcircleClient::new(&config)?;

        if cli.shows_text() {
            println!();
            println!(
                "{}",
                style("Publishing to Appcircle Enterprise App Store...").bold()
            );
            let file = style(inputs.artifact.display()).cyan().to_string();
            println!("{}", output::key_value("File", &file));
            println!(
                "{}",
                output::key_value("Publish type", inputs.release.publish_type.as_str())
            );
            println!();
        }

        let spinner = output::spinner(cli.shows_text());
        spinner.set_message("Logging in...");

        let bar = spinner.clone();
        let mut publisher = Publisher::new(Arc::new(client))
            .with_poll_options(config.poll_options())
            .with_progress(move |stage| report_stage(&bar, stage));
        if let Some(id) = self.profile_id.as_deref().filter(|id| !id.trim().is_empty()) {
            publisher = publisher.with_profile_id(id.trim());
        }

        // First Ctrl-C cancels the run, a second one exits immediately
        let cancel = publisher.cancel_token();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_err() {
                return;
            }
            warn!("Interrupted, cancelling");
            cancel.cancel();
            if tokio::signal::ctrl_c().await.is_ok() {
                std::process::exit(exit_codes::CANCELLED);
            }
        });

        let result = publisher
            .run(&inputs.token, &inputs.artifact, &inputs.release)
            .await;
        spinner.finish_and_clear();
        let outcome = result?;

        self.print_outcome(cli, &inputs, &outcome)?;

        if outcome.is_publish_failure() && self.fail_on_publish_error {
            anyhow::bail!("Upload succeeded but the version could not be published");
        }

        Ok(())
    }

    fn print_outcome(
        &self,
        cli: &Cli,
        inputs: &ResolvedInputs,
        outcome: &PublishOutcome,
    ) -> anyhow::Result<()> {
        if cli.format == OutputFormat::Json {
            let report = serde_json::json!({
                "artifact": inputs.artifact.display().to_string(),
                "publish_type": inputs.release.publish_type,
                "result": outcome,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        if cli.quiet {
            return Ok(());
        }

        output::success(&format!(
            "{} uploaded to the Appcircle Enterprise Store successfully.",
            inputs.artifact.display()
        ));

        match outcome {
            PublishOutcome::UploadedAndPublished {
                profile_id,
                version_id,
            } => {
                output::success("App is published.");
                println!("{}", output::key_value("Profile", profile_id));
                println!("{}", output::key_value("Version", version_id));
            }
            PublishOutcome::UploadedOnly => {
                output::info("Publish type is 0, the version was not published");
            }
            PublishOutcome::PublishFailed {
                profile_id,
                version_id,
                status,
                body,
            } => {
                output::warning("Something went wrong. App could not be published.");
                println!("{}", output::key_value("Profile", profile_id));
                println!("{}", output::key_value("Version", version_id));
                println!("{}", output::key_value("Status", &status.to_string()));
                if !body.is_empty() {
                    println!("{}", output::key_value("Response", body));
                }
            }
        }

        Ok(())
    }
}

/// Mirror workflow milestones on the spinner
fn report_stage(bar: &ProgressBar, stage: &PublishStage) {
    match stage {
        PublishStage::Authenticated => {
            bar.println(format!("{} Login is successful.", style("✓").green().bold()));
            bar.set_message("Uploading...");
        }
        PublishStage::Uploaded { task_id } => {
            bar.println(format!("{} Upload accepted", style("✓").green().bold()));
            bar.set_message(format!("Waiting for processing (task {})...", task_id));
        }
        PublishStage::Processed => {
            bar.println(format!("{} Processing completed", style("✓").green().bold()));
            bar.set_message("Finishing...");
        }
        PublishStage::Publishing => {
            bar.set_message("App is publishing. Resolving latest profile and version...");
        }
        PublishStage::Resolved {
            profile_id,
            version_id,
        } => {
            bar.set_message(format!(
                "Publishing version {} of profile {}...",
                version_id, profile_id
            ));
        }
    }
}
