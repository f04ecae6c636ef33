//! S3 presigned `PUT` URLs through the AWS SDK.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use std::time::Duration;

use super::{UploadAuthorizer, UploadError};

#[derive(Debug, Clone)]
pub struct S3Config {
    pub bucket: String,
    /// Overrides the region resolved by the default provider chain.
    pub region: Option<String>,
    /// Custom endpoint such as `http://localhost:9000`. When set, URLs are
    /// path-style against it instead of virtual-hosted on AWS.
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone)]
pub struct S3Presigner {
    client: Client,
    bucket: String,
}

impl S3Presigner {
    pub fn new(client: Client, bucket: impl Into<String>) -> Result<Self, UploadError> {
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(UploadError::Configuration("bucket is empty".to_string()));
        }
        Ok(Self { client, bucket })
    }

    /// Builds a client from the default credential and region chain
    /// (environment, profile, web identity, container or instance metadata).
    pub async fn from_config(config: &S3Config) -> Result<Self, UploadError> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Self::new(Client::from_conf(builder.build()), config.bucket.clone())
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl UploadAuthorizer for S3Presigner {
    async fn authorize_put(
        &self,
        key: &str,
        content_type: &str,
        ttl: Duration,
    ) -> Result<String, UploadError> {
        let presigning =
            PresigningConfig::expires_in(ttl).map_err(|e| UploadError::Signing(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(presigning)
            .await
            .map_err(|e| UploadError::Signing(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}
