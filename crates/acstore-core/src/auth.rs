//! Personal token authentication

use tracing::{info, instrument};

use crate::error::{Result, StoreError};
use crate::traits::EnterpriseStoreApi;
use crate::types::{PersonalToken, Session};

/// Exchange a personal API token for a session.
///
/// The session is not cached; every run authenticates once.
#[instrument(skip_all)]
pub async fn authenticate(api: &dyn EnterpriseStoreApi, token: &PersonalToken) -> Result<Session> {
    if token.is_empty() {
        return Err(StoreError::Validation(
            "Personal API Token cannot be empty".to_string(),
        ));
    }

    let session = api.exchange_token(token).await?;
    info!("Login is successful.");
    Ok(session)
}
