//! Task completion polling
//!
//! After upload the store processes the binary asynchronously. The task
//! moves from `Waiting` to either `Failed` or `Completed`; this module
//! re-queries at a fixed interval until one of those terminal states is
//! seen, the optional deadline passes, or the run is cancelled.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::config::DEFAULT_POLL_INTERVAL_SECS;
use crate::error::{Result, StoreError};
use crate::traits::EnterpriseStoreApi;
use crate::types::{Session, TaskState};

/// Polling behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollOptions {
    /// Delay between two status queries
    pub interval: Duration,

    /// Overall deadline; `None` waits indefinitely
    pub timeout: Option<Duration>,
}

impl Default for PollOptions {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            timeout: None,
        }
    }
}

/// Wait until the task reaches `Completed`.
///
/// Returns the number of status queries made.
#[instrument(skip(api, session, options, cancel))]
pub async fn await_completion(
    api: &dyn EnterpriseStoreApi,
    session: &Session,
    task_id: &str,
    options: &PollOptions,
    cancel: &CancellationToken,
) -> Result<u32> {
    let started = Instant::now();
    let deadline = options.timeout.map(|t| started + t);
    let mut polls = 0u32;

    loop {
        if cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            warn!(polls, "Giving up on task {}", task_id);
            return Err(StoreError::PollTimeout {
                task_id: task_id.to_string(),
                waited: started.elapsed(),
            });
        }

        let status = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StoreError::Cancelled),
            status = api.task_status(session, task_id) => status?,
        };
        polls += 1;

        let state_name = status.state_name.ok_or_else(|| {
            StoreError::Poll(format!("task {} response has no stateName", task_id))
        })?;
        let state = status
            .state_value
            .and_then(TaskState::from_value)
            .ok_or_else(|| {
                StoreError::Poll(format!(
                    "task {} has unknown stateValue {:?} ({})",
                    task_id, status.state_value, state_name
                ))
            })?;

        match state {
            TaskState::Completed => {
                info!(polls, "Task {} completed", task_id);
                return Ok(polls);
            }
            TaskState::Failed => {
                return Err(StoreError::TaskFailed {
                    task_id: task_id.to_string(),
                    state_name,
                });
            }
            TaskState::Waiting => {
                debug!(polls, state = %state_name, "Still processing, waiting...");
                let delay = match deadline {
                    Some(d) => options.interval.min(d.saturating_duration_since(Instant::now())),
                    None => options.interval,
                };
                tokio::select! {
                    _ = cancel.cancelled() => return Err(StoreError::Cancelled),
                    _ = tokio::time::sleep(delay) => {}
                }
            }
        }
    }
}
