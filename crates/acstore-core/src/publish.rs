//! Upload, wait and publish workflow

use std::future::Future;
use std::path::Path;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::auth::authenticate;
use crate::error::{Result, StoreError};
use crate::poller::{await_completion, PollOptions};
use crate::resolver::{resolve_latest_version_id, resolve_profile_id};
use crate::traits::EnterpriseStoreApi;
use crate::types::*;
use crate::upload::upload_artifact;

type ProgressFn = Box<dyn Fn(&PublishStage) + Send + Sync>;

/// Drives one publish run against the enterprise store.
///
/// Steps run strictly in sequence and every failure up to and including
/// processing aborts the run. A rejected publish call is reported through
/// [`PublishOutcome::PublishFailed`] instead, since the upload itself
/// cannot be undone.
pub struct Publisher {
    api: Arc<dyn EnterpriseStoreApi>,
    poll: PollOptions,
    cancel: CancellationToken,
    profile_id: Option<String>,
    progress: Option<ProgressFn>,
}

impl Publisher {
    pub fn new(api: Arc<dyn EnterpriseStoreApi>) -> Self {
        Self {
            api,
            poll: PollOptions::default(),
            cancel: CancellationToken::new(),
            profile_id: None,
            progress: None,
        }
    }

    pub fn with_poll_options(mut self, poll: PollOptions) -> Self {
        self.poll = poll;
        self
    }

    /// Use an externally owned cancellation token
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Publish into this profile instead of the most recently updated one
    pub fn with_profile_id(mut self, profile_id: impl Into<String>) -> Self {
        self.profile_id = Some(profile_id.into());
        self
    }

    /// Receive a callback at each milestone
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&PublishStage) + Send + Sync + 'static,
    {
        self.progress = Some(Box::new(progress));
        self
    }

    /// Token that cancels this publisher's runs
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    fn report(&self, stage: PublishStage) {
        if let Some(progress) = &self.progress {
            progress(&stage);
        }
    }

    fn ensure_active(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        Ok(())
    }

    /// Await a store call, abandoning it as soon as the run is cancelled
    async fn guarded<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.ensure_active()?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(StoreError::Cancelled),
            result = call => result,
        }
    }

    /// Upload an artifact, wait for processing and publish the latest version
    #[instrument(skip(self, token, release), fields(publish_type = %release.publish_type))]
    pub async fn run(
        &self,
        token: &PersonalToken,
        artifact_path: &Path,
        release: &ReleaseMetadata,
    ) -> Result<PublishOutcome> {
        let api = self.api.as_ref();

        let artifact = Artifact::from_path(artifact_path)?;
        release.validate()?;

        let session = self.guarded(authenticate(api, token)).await?;
        self.report(PublishStage::Authenticated);

        let task_id = self
            .guarded(upload_artifact(api, &session, &artifact))
            .await?;
        self.report(PublishStage::Uploaded {
            task_id: task_id.clone(),
        });

        await_completion(api, &session, &task_id, &self.poll, &self.cancel).await?;
        info!(
            "{} uploaded to the Appcircle Enterprise Store successfully.",
            artifact.path().display()
        );
        self.report(PublishStage::Processed);

        if release.publish_type.is_upload_only() {
            info!("Publish type is upload only, skipping publish");
            return Ok(PublishOutcome::UploadedOnly);
        }

        info!("App is publishing.");
        self.report(PublishStage::Publishing);

        let profile_id = match &self.profile_id {
            Some(id) => {
                info!(profile = %id, "Using configured enterprise profile");
                id.clone()
            }
            None => self.guarded(resolve_profile_id(api, &session)).await?,
        };
        let version_id = self
            .guarded(resolve_latest_version_id(api, &session, &profile_id))
            .await?;
        self.report(PublishStage::Resolved {
            profile_id: profile_id.clone(),
            version_id: version_id.clone(),
        });

        let response = self
            .guarded(api.publish_version(&session, &profile_id, &version_id, release))
            .await?;

        if response.is_success() {
            info!(profile = %profile_id, version = %version_id, "App is published.");
            Ok(PublishOutcome::UploadedAndPublished {
                profile_id,
                version_id,
            })
        } else {
            warn!(
                status = response.status,
                "Something went wrong. App could not be published."
            );
            Ok(PublishOutcome::PublishFailed {
                profile_id,
                version_id,
                status: response.status,
                body: response.body,
            })
        }
    }
}
