//! Build step inputs shared by the publish and validate commands

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use acstore_core::input::resolve_input;
use acstore_core::{Artifact, PersonalToken, PublishType, ReleaseMetadata};

/// Inputs describing one release.
///
/// Every textual value may be written as `$(NAME)` to read it from the
/// environment variable `NAME`.
#[derive(Debug, Args)]
pub struct ReleaseArgs {
    /// Path to the build (apk, aab or ipa)
    pub artifact: String,

    /// Appcircle personal API token
    #[arg(long, env = "AC_PAT", hide_env_values = true)]
    pub token: Option<String>,

    /// Short release summary shown in the store
    #[arg(long)]
    pub summary: Option<String>,

    /// Release notes
    #[arg(long)]
    pub release_notes: Option<String>,

    /// Path to file containing release notes
    #[arg(long, conflicts_with = "release_notes")]
    pub release_notes_file: Option<PathBuf>,

    /// Publish type code; "0" uploads without publishing
    #[arg(long, env = "AC_PUBLISH_TYPE")]
    pub publish_type: String,
}

/// Inputs after environment substitution and validation
#[derive(Debug, Clone)]
pub struct ResolvedInputs {
    pub token: PersonalToken,
    pub artifact: PathBuf,
    pub release: ReleaseMetadata,
}

impl ReleaseArgs {
    /// Substitute `$(NAME)` references and check required fields
    pub fn resolve(&self) -> anyhow::Result<ResolvedInputs> {
        let token = resolve_input(self.token.as_deref().unwrap_or(""), "Personal API Token")?;

        let artifact = PathBuf::from(resolve_input(&self.artifact, "App Path")?);
        Artifact::platform_for(&artifact)?;

        let publish_type = PublishType::new(resolve_input(&self.publish_type, "Publish Type")?);
        let summary = resolve_optional(self.summary.as_deref(), "Summary")?;
        let release_notes = match &self.release_notes_file {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read release notes from {}", path.display()))?,
            None => resolve_optional(self.release_notes.as_deref(), "Release Notes")?,
        };

        let release = ReleaseMetadata::new(summary, release_notes, publish_type);
        release.validate()?;

        Ok(ResolvedInputs {
            token: PersonalToken::new(token),
            artifact,
            release,
        })
    }
}

fn resolve_optional(value: Option<&str>, field: &str) -> acstore_core::Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => resolve_input(v, field),
        _ => Ok(String::new()),
    }
}
