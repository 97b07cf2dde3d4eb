//! Scripted in-memory store used by unit tests

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Result, StoreError};
use crate::traits::EnterpriseStoreApi;
use crate::types::*;

pub(crate) struct MockApi {
    access_token: Option<String>,
    upload_status: u16,
    upload_delay: Option<Duration>,
    task_id: Option<String>,
    statuses: Mutex<VecDeque<TaskStatus>>,
    profiles: Vec<ProfileRecord>,
    versions: HashMap<String, Vec<AppVersionRecord>>,
    publish_status: u16,
    calls: Mutex<Vec<String>>,
    published: Mutex<Option<(String, String, ReleaseMetadata)>>,
}

impl Default for MockApi {
    fn default() -> Self {
        Self {
            access_token: Some("A1".to_string()),
            upload_status: 200,
            upload_delay: None,
            task_id: Some("X1".to_string()),
            statuses: Mutex::new(VecDeque::new()),
            profiles: Vec::new(),
            versions: HashMap::new(),
            publish_status: 200,
            calls: Mutex::new(Vec::new()),
            published: Mutex::new(None),
        }
    }
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_token(mut self) -> Self {
        self.access_token = None;
        self
    }

    pub fn with_upload_status(mut self, status: u16) -> Self {
        self.upload_status = status;
        self
    }

    /// Hold every upload for `delay` before answering
    pub fn with_upload_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    pub fn with_task_id(mut self, task_id: Option<&str>) -> Self {
        self.task_id = task_id.map(|s| s.to_string());
        self
    }

    pub fn with_states(self, states: &[TaskState]) -> Self {
        let statuses = states.iter().map(|s| TaskStatus::new(*s)).collect();
        self.with_statuses(statuses)
    }

    pub fn with_statuses(self, statuses: Vec<TaskStatus>) -> Self {
        *self.statuses.lock().unwrap() = statuses.into();
        self
    }

    pub fn with_profiles(mut self, profiles: &[(&str, &str)]) -> Self {
        self.profiles = profiles
            .iter()
            .map(|(id, date)| ProfileRecord {
                id: id.to_string(),
                name: Some(format!("Profile {}", id)),
                last_binary_received_date: Some(date.to_string()),
            })
            .collect();
        self
    }

    pub fn push_profile(&mut self, profile: ProfileRecord) {
        self.profiles.push(profile);
    }

    pub fn with_versions(mut self, profile_id: &str, versions: Vec<AppVersionRecord>) -> Self {
        self.versions.insert(profile_id.to_string(), versions);
        self
    }

    pub fn with_publish_status(mut self, status: u16) -> Self {
        self.publish_status = status;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn published(&self) -> Option<(String, String, ReleaseMetadata)> {
        self.published.lock().unwrap().clone()
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }
}

pub(crate) fn version(id: &str, update: Option<&str>, create: Option<&str>) -> AppVersionRecord {
    AppVersionRecord {
        id: id.to_string(),
        update_date: update.map(|s| s.to_string()),
        create_date: create.map(|s| s.to_string()),
    }
}

#[async_trait::async_trait]
impl EnterpriseStoreApi for MockApi {
    async fn exchange_token(&self, _token: &PersonalToken) -> Result<Session> {
        self.record("exchange_token");
        self.access_token
            .as_ref()
            .map(Session::new)
            .ok_or_else(|| StoreError::Auth("HTTP 401: invalid token".to_string()))
    }

    async fn upload_artifact(
        &self,
        _session: &Session,
        _artifact: &Artifact,
    ) -> Result<Option<String>> {
        self.record("upload_artifact");
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay).await;
        }
        if self.upload_status != 200 {
            return Err(StoreError::Upload {
                status: self.upload_status,
                body: "rejected".to_string(),
            });
        }
        Ok(self.task_id.clone())
    }

    async fn task_status(&self, _session: &Session, _task_id: &str) -> Result<TaskStatus> {
        self.record("task_status");
        self.statuses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| StoreError::Poll("no scripted status left".to_string()))
    }

    async fn list_profiles(&self, _session: &Session) -> Result<Vec<ProfileRecord>> {
        self.record("list_profiles");
        Ok(self.profiles.clone())
    }

    async fn list_app_versions(
        &self,
        _session: &Session,
        profile_id: &str,
    ) -> Result<Vec<AppVersionRecord>> {
        self.record("list_app_versions");
        Ok(self.versions.get(profile_id).cloned().unwrap_or_default())
    }

    async fn publish_version(
        &self,
        _session: &Session,
        profile_id: &str,
        version_id: &str,
        release: &ReleaseMetadata,
    ) -> Result<PublishResponse> {
        self.record("publish_version");
        *self.published.lock().unwrap() =
            Some((profile_id.to_string(), version_id.to_string(), release.clone()));
        Ok(PublishResponse {
            status: self.publish_status,
            body: if self.publish_status == 200 {
                String::new()
            } else {
                "publish rejected".to_string()
            },
        })
    }
}
