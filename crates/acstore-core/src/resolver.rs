//! Profile and version resolution
//!
//! The publish call needs the profile that most recently received a binary
//! and, within it, the most recently updated version.

use chrono::{DateTime, FixedOffset};
use tracing::{debug, instrument};

use crate::error::{Result, StoreError};
use crate::traits::EnterpriseStoreApi;
use crate::types::*;

/// Pick the element with the greatest key.
///
/// Elements are sorted by key, newest first, with a stable sort; the first
/// one wins, so equal keys keep their list order.
pub fn pick_latest<T, K, F>(mut items: Vec<T>, key: F) -> Option<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.sort_by(|a, b| key(b).cmp(&key(a)));
    items.into_iter().next()
}

/// Parse an ISO-8601 timestamp carrying an offset
pub fn parse_timestamp(value: &str) -> Result<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(value.trim()).map_err(|e| StoreError::InvalidTimestamp {
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl TryFrom<ProfileRecord> for EnterpriseProfile {
    type Error = StoreError;

    fn try_from(record: ProfileRecord) -> Result<Self> {
        let raw = record
            .last_binary_received_date
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StoreError::MissingTimestamp(record.id.clone()))?;

        Ok(Self {
            last_binary_received_date: parse_timestamp(raw)?,
            name: record.name.unwrap_or_default(),
            id: record.id,
        })
    }
}

impl TryFrom<AppVersionRecord> for AppVersion {
    type Error = StoreError;

    fn try_from(record: AppVersionRecord) -> Result<Self> {
        let raw = [record.update_date.as_deref(), record.create_date.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.is_empty())
            .ok_or_else(|| StoreError::MissingTimestamp(record.id.clone()))?;

        Ok(Self {
            updated_at: parse_timestamp(raw)?,
            id: record.id,
        })
    }
}

/// Id of the profile that most recently received a binary.
///
/// Profiles that never received a binary carry no date and are skipped.
#[instrument(skip_all)]
pub async fn resolve_profile_id(api: &dyn EnterpriseStoreApi, session: &Session) -> Result<String> {
    let records = api.list_profiles(session).await?;
    let total = records.len();

    let profiles = records
        .into_iter()
        .filter(|r| {
            r.last_binary_received_date
                .as_deref()
                .is_some_and(|d| !d.is_empty())
        })
        .map(EnterpriseProfile::try_from)
        .collect::<Result<Vec<_>>>()?;
    debug!(
        count = profiles.len(),
        skipped = total - profiles.len(),
        "Fetched enterprise profiles"
    );

    let latest = pick_latest(profiles, |p| p.last_binary_received_date)
        .ok_or_else(|| StoreError::NotFound("no enterprise profiles".to_string()))?;

    debug!(profile = %latest.id, name = %latest.name, "Selected most recent profile");
    Ok(latest.id)
}

/// Id of the most recently updated version within a profile
#[instrument(skip(api, session))]
pub async fn resolve_latest_version_id(
    api: &dyn EnterpriseStoreApi,
    session: &Session,
    profile_id: &str,
) -> Result<String> {
    let versions = api
        .list_app_versions(session, profile_id)
        .await?
        .into_iter()
        .map(AppVersion::try_from)
        .collect::<Result<Vec<_>>>()?;
    debug!(count = versions.len(), "Fetched app versions");

    let latest = pick_latest(versions, |v| v.updated_at).ok_or_else(|| {
        StoreError::NotFound(format!("no app versions in profile {}", profile_id))
    })?;

    debug!(version = %latest.id, "Selected most recent version");
    Ok(latest.id)
}
