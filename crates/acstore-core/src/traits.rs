//! Transport trait for the enterprise store API

use crate::error::Result;
use crate::types::*;

/// Requests the publish workflow needs from the remote store.
///
/// Each method maps to one HTTP call. Interpretation of the responses
/// (task states, "latest" selection, outcome mapping) lives in the
/// workflow modules, not in implementations of this trait.
#[async_trait::async_trait]
pub trait EnterpriseStoreApi: Send + Sync {
    /// Exchange a personal API token for an access token
    async fn exchange_token(&self, token: &PersonalToken) -> Result<Session>;

    /// Upload an artifact and return the body's `taskId` field, if any
    async fn upload_artifact(&self, session: &Session, artifact: &Artifact)
        -> Result<Option<String>>;

    /// Query the processing state of a task
    async fn task_status(&self, session: &Session, task_id: &str) -> Result<TaskStatus>;

    /// List all enterprise profiles
    async fn list_profiles(&self, session: &Session) -> Result<Vec<ProfileRecord>>;

    /// List all app versions of one profile
    async fn list_app_versions(
        &self,
        session: &Session,
        profile_id: &str,
    ) -> Result<Vec<AppVersionRecord>>;

    /// Mark a version as published.
    ///
    /// Non-200 statuses are returned, not raised.
    async fn publish_version(
        &self,
        session: &Session,
        profile_id: &str,
        version_id: &str,
        release: &ReleaseMetadata,
    ) -> Result<PublishResponse>;
}
