//! Time-limited authorization for direct image uploads to blob storage.

pub mod s3;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

pub use s3::{S3Config, S3Presigner};

/// How long an issued upload URL stays valid.
pub const UPLOAD_URL_TTL: Duration = Duration::from_secs(300);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("invalid upload configuration: {0}")]
    Configuration(String),

    #[error("upload authorization failed: {0}")]
    Signing(String),
}

/// Issues write tokens for blob storage.
#[async_trait]
pub trait UploadAuthorizer: Send + Sync {
    /// Returns a URL that allows a single `PUT` of `content_type` to `key`
    /// until `ttl` elapses.
    async fn authorize_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, UploadError>;
}

/// Storage key for a new image of `event_id`.
pub fn image_key(event_id: Uuid, extension: &str) -> String {
    format!("events/{}/{}.{}", event_id, Uuid::new_v4(), extension)
}
