//! Store error types

use std::time::Duration;

use thiserror::Error;

/// Errors raised while uploading to or publishing on the enterprise store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Bad local input, detected before anything is sent over the network
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Exchanging the personal token for an access token failed
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The artifact upload was rejected by the store
    #[error("Upload failed ({status}): {body}")]
    Upload { status: u16, body: String },

    /// Task status could not be read; treated as a protocol violation
    #[error("Upload status could not be received: {0}")]
    Poll(String),

    /// The store reported the processing task as failed
    #[error("{task_id} id upload request failed with status {state_name}")]
    TaskFailed { task_id: String, state_name: String },

    /// Processing did not finish before the caller's deadline
    #[error("Task {task_id} still processing after {waited:?}")]
    PollTimeout { task_id: String, waited: Duration },

    /// The run was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// A list the store returned had nothing to pick from
    #[error("Not found: {0}")]
    NotFound(String),

    /// A profile or app version carried no usable date
    #[error("{0} has no timestamp to order by")]
    MissingTimestamp(String),

    /// A timestamp could not be parsed as ISO-8601 with offset
    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    /// Non-success response from a store endpoint
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Whether the error was caused by local input rather than the store
    pub fn is_validation(&self) -> bool {
        matches!(self, StoreError::Validation(_))
    }
}

/// Result type for store operations
pub type Result<T> = std::result::Result<T, StoreError>;
