//! Artifact upload

use std::path::Path;

use tracing::{info, instrument};

use crate::error::{Result, StoreError};
use crate::traits::EnterpriseStoreApi;
use crate::types::{Artifact, Session};

/// Validate and upload an artifact, returning the processing task id.
///
/// The extension and existence checks run before any request is made.
#[instrument(skip(api, session), fields(path = %artifact_path.display()))]
pub async fn upload(
    api: &dyn EnterpriseStoreApi,
    session: &Session,
    artifact_path: &Path,
) -> Result<String> {
    let artifact = Artifact::from_path(artifact_path)?;
    upload_artifact(api, session, &artifact).await
}

/// Upload an already validated artifact
pub async fn upload_artifact(
    api: &dyn EnterpriseStoreApi,
    session: &Session,
    artifact: &Artifact,
) -> Result<String> {
    info!(
        "Uploading {} ({}) to the enterprise store",
        artifact.path().display(),
        artifact.platform()
    );

    let task_id = api
        .upload_artifact(session, artifact)
        .await?
        .filter(|id| !id.is_empty())
        .ok_or_else(|| StoreError::Upload {
            status: 200,
            body: "Response did not contain a taskId".to_string(),
        })?;

    info!(task_id = %task_id, "Upload accepted");
    Ok(task_id)
}
