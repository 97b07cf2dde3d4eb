//! HTTP transport for the Appcircle Enterprise App Store API

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::{debug, info, instrument};

use crate::config::StoreConfig;
use crate::error::{Result, StoreError};
use crate::traits::EnterpriseStoreApi;
use crate::types::*;

/// Multipart field name the upload endpoint expects
const UPLOAD_FIELD: &str = "File";

/// Token exchange response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "accessToken")]
    access_token: String,
}

/// reqwest-backed client for the enterprise store
pub struct AppcircleClient {
    client: Client,
    api_url: String,
    auth_url: String,
}

impl AppcircleClient {
    /// Create a client from configuration
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self::with_client(
            builder.build()?,
            &config.api.url,
            &config.api.auth_url,
        ))
    }

    /// Create a client around an existing reqwest client
    pub fn with_client(client: Client, api_url: &str, auth_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_url: auth_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    fn authorized(&self, method: Method, url: &str, session: &Session) -> RequestBuilder {
        debug!("Enterprise store request: {} {}", method, url);
        self.client
            .request(method, url)
            .header("Authorization", format!("Bearer {}", session.access_token()))
    }

    /// GET a JSON document, raising `Api` on non-success statuses
    async fn get_json<T: DeserializeOwned>(&self, session: &Session, url: &str) -> Result<T> {
        let response = self
            .authorized(Method::GET, url, session)
            .header("Accept", "application/json")
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        if !(200..300).contains(&status) {
            return Err(StoreError::Api {
                status,
                message: body,
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}

/// Drain a response into its status code and body text
async fn read_body(response: Response) -> Result<(u16, String)> {
    let status = response.status().as_u16();
    let body = response.text().await?;
    Ok((status, body))
}

#[async_trait::async_trait]
impl EnterpriseStoreApi for AppcircleClient {
    #[instrument(skip_all)]
    async fn exchange_token(&self, token: &PersonalToken) -> Result<Session> {
        let url = format!("{}/auth/v2/token", self.auth_url);
        debug!("Exchanging personal token at {}", url);

        let response = self
            .client
            .post(&url)
            .header("Accept", "application/json")
            .form(&[("pat", token.expose())])
            .send()
            .await
            .map_err(|e| StoreError::Auth(format!("Token request failed: {}", e)))?;

        let (status, body) = read_body(response)
            .await
            .map_err(|e| StoreError::Auth(format!("Token response could not be read: {}", e)))?;
        if !(200..300).contains(&status) {
            return Err(StoreError::Auth(format!("HTTP {}: {}", status, body)));
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| StoreError::Auth(format!("Invalid token response: {}", e)))?;

        if parsed.access_token.is_empty() {
            return Err(StoreError::Auth(
                "Token response contained an empty access token".to_string(),
            ));
        }

        Ok(Session::new(parsed.access_token))
    }

    #[instrument(skip(self, session), fields(path = %artifact.path().display()))]
    async fn upload_artifact(
        &self,
        session: &Session,
        artifact: &Artifact,
    ) -> Result<Option<String>> {
        let url = self.url("/store/v2/profiles/app-versions");

        let file = tokio::fs::File::open(artifact.path()).await?;
        let size = file.metadata().await?.len();
        info!(size, platform = %artifact.platform(), "Streaming artifact to {}", url);

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, size)
            .file_name(artifact.file_name())
            .mime_str(artifact.mime_type())?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .authorized(Method::POST, &url, session)
            .multipart(form)
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        if status != 200 {
            return Err(StoreError::Upload { status, body });
        }

        let json: serde_json::Value =
            serde_json::from_str(&body).map_err(|_| StoreError::Upload {
                status,
                body: format!("Invalid JSON response: {}", body),
            })?;

        Ok(json
            .get("taskId")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    async fn task_status(&self, session: &Session, task_id: &str) -> Result<TaskStatus> {
        let url = self.url(&format!("/task/v1/tasks/{}", task_id));

        let response = self
            .authorized(Method::GET, &url, session)
            .header("Accept", "application/json")
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        if !(200..300).contains(&status) {
            return Err(StoreError::Poll(format!("HTTP {}: {}", status, body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| StoreError::Poll(format!("Invalid task status response: {}", e)))
    }

    async fn list_profiles(&self, session: &Session) -> Result<Vec<ProfileRecord>> {
        let url = self.url("/store/v2/profiles");
        self.get_json(session, &url).await
    }

    async fn list_app_versions(
        &self,
        session: &Session,
        profile_id: &str,
    ) -> Result<Vec<AppVersionRecord>> {
        let url = self.url(&format!("/store/v2/profiles/{}/app-versions", profile_id));
        self.get_json(session, &url).await
    }

    #[instrument(skip(self, session, release), fields(publish_type = %release.publish_type))]
    async fn publish_version(
        &self,
        session: &Session,
        profile_id: &str,
        version_id: &str,
        release: &ReleaseMetadata,
    ) -> Result<PublishResponse> {
        let url = self.url(&format!(
            "/store/v2/profiles/{}/app-versions/{}",
            profile_id, version_id
        ));

        let response = self
            .authorized(Method::PATCH, &url, session)
            .query(&[("action", "publish")])
            .json(release)
            .send()
            .await?;

        let (status, body) = read_body(response).await?;
        Ok(PublishResponse { status, body })
    }
}
