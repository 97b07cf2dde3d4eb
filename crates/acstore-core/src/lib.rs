//! Enterprise app store publishing for Appcircle
//!
//! This crate uploads mobile binaries to the Appcircle Enterprise App Store,
//! waits for server-side processing and publishes the resulting version.
//!
//! ## Workflow
//!
//! 1. Validate the artifact (`.apk`, `.aab` or `.ipa`) locally
//! 2. Exchange the personal API token for an access token
//! 3. Upload the binary as multipart form data
//! 4. Poll the processing task until it completes or fails
//! 5. Unless the publish type is `"0"`, pick the most recently updated
//!    profile and version and publish it with the release metadata
//!
//! ## Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use acstore_core::{
//!     AppcircleClient, PersonalToken, PublishType, Publisher, ReleaseMetadata, StoreConfig,
//! };
//!
//! let config = StoreConfig::default();
//! let client = AppcircleClient::new(&config)?;
//! let publisher = Publisher::new(Arc::new(client)).with_poll_options(config.poll_options());
//!
//! let release = ReleaseMetadata::new("1.4.0", "Bug fixes", PublishType::new("1"));
//! let outcome = publisher
//!     .run(&PersonalToken::new(token), "app-release.apk".as_ref(), &release)
//!     .await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod input;
pub mod poller;
pub mod publish;
pub mod resolver;
pub mod traits;
pub mod types;
pub mod upload;

#[cfg(test)]
pub(crate) mod testing;

pub use client::AppcircleClient;
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use poller::PollOptions;
pub use publish::Publisher;
pub use traits::EnterpriseStoreApi;
pub use types::*;
