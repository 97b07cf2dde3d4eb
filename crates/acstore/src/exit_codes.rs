//! Exit codes for the CLI

use acstore_core::StoreError;

/// Success
pub const SUCCESS: i32 = 0;

/// General error
pub const ERROR: i32 = 1;

/// Configuration error
pub const CONFIG_ERROR: i32 = 2;

/// Authentication error
pub const AUTH_ERROR: i32 = 3;

/// Upload or processing error
pub const UPLOAD_ERROR: i32 = 4;

/// Validation error
pub const VALIDATION_ERROR: i32 = 5;

/// User cancelled
pub const CANCELLED: i32 = 130;

/// Map an error returned by a command to a process exit code
pub fn for_error(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<StoreError>() {
        Some(StoreError::Validation(_)) => VALIDATION_ERROR,
        Some(StoreError::Configuration(_)) => CONFIG_ERROR,
        Some(StoreError::Auth(_)) => AUTH_ERROR,
        Some(
            StoreError::Upload { .. }
            | StoreError::Poll(_)
            | StoreError::TaskFailed { .. }
            | StoreError::PollTimeout { .. },
        ) => UPLOAD_ERROR,
        Some(StoreError::Cancelled) => CANCELLED,
        _ => ERROR,
    }
}
