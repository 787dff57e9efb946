//! S3-backed object storage for avatar uploads.

use anyhow::{Context, Result};
use aws_sdk_s3::primitives::ByteStream;
use tracing::info;

use crate::config::StorageConfig;

pub struct Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_url: Option<String>,
}

/// A stored object: the public URL handed to clients and the key used to
/// delete it later
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub url: String,
    pub key: String,
}

impl Storage {
    pub async fn new(config: &StorageConfig) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;

        let client = match &config.endpoint {
            Some(endpoint) => {
                let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                    .endpoint_url(endpoint)
                    .force_path_style(true)
                    .build();
                aws_sdk_s3::Client::from_conf(s3_config)
            }
            None => aws_sdk_s3::Client::new(&sdk_config),
        };

        info!(bucket = %config.bucket, "Object storage initialized");

        Self {
            client,
            bucket: config.bucket.clone(),
            public_url: config.public_url.clone(),
        }
    }

    fn object_url(&self, key: &str) -> String {
        match &self.public_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => format!("https://{}.s3.amazonaws.com/{}", self.bucket, key),
        }
    }

    /// Upload bytes under a fresh key and return its public URL
    pub async fn store(&self, bytes: Vec<u8>, content_type: Option<&str>) -> Result<StoredObject> {
        let key = format!("avatars/{}", uuid::Uuid::new_v4());

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(bytes));
        if let Some(content_type) = content_type {
            request = request.content_type(content_type);
        }

        request
            .send()
            .await
            .with_context(|| format!("Failed to upload object {}", key))?;

        Ok(StoredObject {
            url: self.object_url(&key),
            key,
        })
    }

    /// Delete a previously stored object
    pub async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to delete object {}", key))?;
        Ok(())
    }
}
