//! Common types for the enterprise store workflow

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Artifact extensions the enterprise store accepts
pub const SUPPORTED_EXTENSIONS: &[&str] = &["apk", "aab", "ipa"];

/// Publish type code that means "upload only, do not publish"
pub const UPLOAD_ONLY_PUBLISH_TYPE: &str = "0";

/// Long-lived personal API token.
///
/// The value is never printed; `Debug` is redacted.
#[derive(Clone)]
pub struct PersonalToken(String);

impl PersonalToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Raw token value, only for building the token exchange request
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for PersonalToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PersonalToken(***)")
    }
}

/// Short-lived access token obtained for a single run.
///
/// Expiry is enforced by the server only.
#[derive(Clone)]
pub struct Session {
    access_token: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
        }
    }

    /// Value for the `Authorization: Bearer` header
    pub fn access_token(&self) -> &str {
        &self.access_token
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"***")
            .finish()
    }
}

/// Target platform inferred from the artifact extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// APK or AAB package
    Android,
    /// IPA package
    Ios,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Android => write!(f, "Android"),
            Platform::Ios => write!(f, "iOS"),
        }
    }
}

/// A validated binary ready for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    path: PathBuf,
    platform: Platform,
}

impl Artifact {
    /// Infer the platform from the file extension without touching the disk
    pub fn platform_for(path: &Path) -> Result<Platform> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "apk" | "aab" => Ok(Platform::Android),
            "ipa" => Ok(Platform::Ios),
            _ => Err(StoreError::Validation(format!(
                "Invalid file extension: {}. For Android, use .apk or .aab. For iOS, use .ipa.",
                path.display()
            ))),
        }
    }

    /// Validate extension and existence of an artifact path
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let platform = Self::platform_for(path)?;

        if !path.is_file() {
            return Err(StoreError::Validation(format!(
                "File not found: {}",
                path.display()
            )));
        }

        Ok(Self {
            path: path.to_path_buf(),
            platform,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// File name used for the multipart part
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("app")
            .to_string()
    }

    /// MIME type sent with the upload
    pub fn mime_type(&self) -> &'static str {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("apk") => {
                "application/vnd.android.package-archive"
            }
            _ => "application/octet-stream",
        }
    }
}

/// Processing state of an upload task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskState {
    /// Still processing
    Waiting = 1,
    /// Terminal failure
    Failed = 2,
    /// Terminal success
    Completed = 3,
}

impl TaskState {
    /// Map the store's numeric `stateValue`
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(TaskState::Waiting),
            2 => Some(TaskState::Failed),
            3 => Some(TaskState::Completed),
            _ => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, TaskState::Waiting)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskState::Waiting => write!(f, "Waiting"),
            TaskState::Failed => write!(f, "Failed"),
            TaskState::Completed => write!(f, "Completed"),
        }
    }
}

/// Task status as returned by the task endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatus {
    #[serde(default)]
    pub task_id: Option<String>,
    #[serde(default)]
    pub state_value: Option<i64>,
    #[serde(default)]
    pub state_name: Option<String>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            task_id: None,
            state_value: Some(state as i64),
            state_name: Some(state.to_string()),
        }
    }
}

/// Enterprise profile entry as listed by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRecord {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub last_binary_received_date: Option<String>,
}

/// App version entry as listed by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppVersionRecord {
    pub id: String,
    #[serde(default)]
    pub update_date: Option<String>,
    #[serde(default)]
    pub create_date: Option<String>,
}

/// Distribution profile with a parsed timestamp
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnterpriseProfile {
    pub id: String,
    pub name: String,
    pub last_binary_received_date: DateTime<FixedOffset>,
}

/// App version with the timestamp used for "latest" selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppVersion {
    pub id: String,
    pub updated_at: DateTime<FixedOffset>,
}

/// Publish type code understood by the store.
///
/// `"0"` suppresses publishing entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PublishType(String);

impl PublishType {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn upload_only() -> Self {
        Self(UPLOAD_ONLY_PUBLISH_TYPE.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_upload_only(&self) -> bool {
        self.0.trim() == UPLOAD_ONLY_PUBLISH_TYPE
    }
}

impl fmt::Display for PublishType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Release metadata passed through unchanged to the publish call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseMetadata {
    pub summary: String,
    pub release_notes: String,
    pub publish_type: PublishType,
}

impl ReleaseMetadata {
    pub fn new(
        summary: impl Into<String>,
        release_notes: impl Into<String>,
        publish_type: PublishType,
    ) -> Self {
        Self {
            summary: summary.into(),
            release_notes: release_notes.into(),
            publish_type,
        }
    }

    /// Check required fields.
    ///
    /// Summary and release notes are only required when the version is
    /// going to be published.
    pub fn validate(&self) -> Result<()> {
        if self.publish_type.as_str().trim().is_empty() {
            return Err(StoreError::Validation(
                "Publish Type cannot be empty".to_string(),
            ));
        }

        if self.publish_type.is_upload_only() {
            return Ok(());
        }

        if self.summary.trim().is_empty() {
            return Err(StoreError::Validation("Summary cannot be empty".to_string()));
        }
        if self.release_notes.trim().is_empty() {
            return Err(StoreError::Validation(
                "Release Notes cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

/// Raw response of the publish call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishResponse {
    pub status: u16,
    pub body: String,
}

impl PublishResponse {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Final result of a publish run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PublishOutcome {
    /// Uploaded, processed and published
    UploadedAndPublished {
        profile_id: String,
        version_id: String,
    },
    /// Uploaded and processed; publishing was not requested
    UploadedOnly,
    /// Upload succeeded but the publish call was rejected
    PublishFailed {
        profile_id: String,
        version_id: String,
        status: u16,
        body: String,
    },
}

impl PublishOutcome {
    /// Whether the publish step itself failed
    pub fn is_publish_failure(&self) -> bool {
        matches!(self, PublishOutcome::PublishFailed { .. })
    }
}

impl fmt::Display for PublishOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublishOutcome::UploadedAndPublished { .. } => write!(f, "Uploaded and published"),
            PublishOutcome::UploadedOnly => write!(f, "Uploaded only"),
            PublishOutcome::PublishFailed { .. } => write!(f, "Publish failed"),
        }
    }
}

/// Milestones reported while a run progresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishStage {
    Authenticated,
    Uploaded { task_id: String },
    Processed,
    Publishing,
    Resolved { profile_id: String, version_id: String },
}
