//! Object storage adapter
//!
//! Uploads land in an S3-compatible bucket under the configured folder and
//! are readable through a public URL; private reads go through pre-signed
//! URLs.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::{
    Client,
    config::{Credentials, Region},
    presigning::PresigningConfig,
    primitives::ByteStream,
    types::ObjectCannedAcl,
};
use common::config::StorageConfig;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Object storage is not configured")]
    NotConfigured,

    #[error("Failed to upload {key}: {reason}")]
    Upload { key: String, reason: String },

    #[error("Failed to download {key}: {reason}")]
    Download { key: String, reason: String },

    #[error("Failed to presign {key}: {reason}")]
    Presign { key: String, reason: String },
}

/// Port over the bucket holding media
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store `bytes` under `key`, readable by anyone
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError>;

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Permanent public address of `key`
    fn public_url(&self, key: &str) -> String;

    /// Time-limited address of `key`
    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

/// S3-compatible bucket (AWS, DigitalOcean Spaces, MinIO)
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    endpoint: String,
}

impl S3Storage {
    pub async fn new(config: &StorageConfig) -> Result<Self, StorageError> {
        let endpoint = config.endpoint.clone().ok_or(StorageError::NotConfigured)?;

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .endpoint_url(format!("https://{}", endpoint))
            .credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "carenet-static",
            ))
            .load()
            .await;

        info!("Object storage ready: bucket {} at {}", config.bucket, endpoint);

        Ok(Self {
            client: Client::new(&sdk_config),
            bucket: config.bucket.clone(),
            endpoint,
        })
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        debug!("Uploading {} ({} bytes)", key, bytes.len());

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type)
            .acl(ObjectCannedAcl::PublicRead)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let download_error = |reason: String| StorageError::Download {
            key: key.to_string(),
            reason,
        };

        let object = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let data = object
            .body
            .collect()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        Ok(data.into_bytes().to_vec())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://{}.{}/{}", self.bucket, self.endpoint, key)
    }

    async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let presign_error = |reason: String| StorageError::Presign {
            key: key.to_string(),
            reason,
        };

        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| presign_error(e.to_string()))?;

        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| presign_error(e.to_string()))?;

        Ok(request.uri().to_string())
    }
}

/// Stand-in used when no bucket is configured; every call fails
pub struct DisabledStorage;

#[async_trait]
impl ObjectStorage for DisabledStorage {
    async fn upload(&self, _key: &str, _content_type: &str, _bytes: Vec<u8>) -> Result<(), StorageError> {
        Err(StorageError::NotConfigured)
    }

    async fn download(&self, _key: &str) -> Result<Vec<u8>, StorageError> {
        Err(StorageError::NotConfigured)
    }

    fn public_url(&self, key: &str) -> String {
        key.to_string()
    }

    async fn presigned_url(&self, _key: &str, _expires_in: Duration) -> Result<String, StorageError> {
        Err(StorageError::NotConfigured)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Bucket kept in a map
    #[derive(Default)]
    pub struct MemoryStorage {
        objects: Mutex<HashMap<String, (String, Vec<u8>)>>,
    }

    impl MemoryStorage {
        pub fn keys(&self) -> Vec<String> {
            let objects = self.objects.lock().unwrap();
            let mut keys: Vec<String> = objects.keys().cloned().collect();
            keys.sort();
            keys
        }
    }

    #[async_trait]
    impl ObjectStorage for MemoryStorage {
        async fn upload(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (content_type.to_string(), bytes));
            Ok(())
        }

        async fn download(&self, key: &str) -> Result<Vec<u8>, StorageError> {
            self.objects
                .lock()
                .unwrap()
                .get(key)
                .map(|(_, bytes)| bytes.clone())
                .ok_or_else(|| StorageError::Download {
                    key: key.to_string(),
                    reason: "no such key".to_string(),
                })
        }

        fn public_url(&self, key: &str) -> String {
            format!("https://bucket.test/{}", key)
        }

        async fn presigned_url(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
            if !self.objects.lock().unwrap().contains_key(key) {
                return Err(StorageError::Presign {
                    key: key.to_string(),
                    reason: "no such key".to_string(),
                });
            }
            Ok(format!(
                "https://bucket.test/{}?X-Amz-Expires={}",
                key,
                expires_in.as_secs()
            ))
        }
    }
}
