//! S3-compatible object store (Cloudflare R2, MinIO, AWS S3).

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_s3::config::{Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{Delete, ObjectIdentifier};
use aws_sdk_s3::Client;

use super::{ObjectInfo, ObjectStore};
use crate::config::{resolve_env_var, StorageConfig};
use crate::error::StorageError;

/// DeleteObjects accepts at most this many keys per request.
const DELETE_BATCH: usize = 1000;

/// Object store backed by an S3 bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a client from storage settings.
    ///
    /// Credentials may be `${ENV_VAR}` references. The R2 backend needs an
    /// endpoint or an account ID; plain S3 falls back to the AWS endpoint.
    pub async fn from_config(config: &StorageConfig) -> Result<Self, StorageError> {
        let access_key = resolve_env_var(&config.access_key)
            .ok_or_else(|| StorageError::Config("access_key is not set".to_string()))?;
        let secret_key = resolve_env_var(&config.secret_key)
            .ok_or_else(|| StorageError::Config("secret_key is not set".to_string()))?;

        let endpoint = config.resolved_endpoint();
        if endpoint.is_none() && config.backend == "r2" {
            return Err(StorageError::Config(
                "r2 backend needs endpoint or account_id".to_string(),
            ));
        }

        let region = if config.region.is_empty() {
            "auto".to_string()
        } else {
            config.region.clone()
        };

        tracing::info!(
            "S3 storage: {} (bucket: {})",
            endpoint.as_deref().unwrap_or("aws default endpoint"),
            config.bucket
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region))
            .credentials_provider(Credentials::new(
                access_key,
                secret_key,
                None,
                None,
                "chapterlift",
            ));
        if let Some(endpoint) = endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(true)
            .build();

        Ok(Self::new(Client::from_conf(s3_config), &config.bucket))
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn put(
        &self,
        key: &str,
        data: Vec<u8>,
        size: u64,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .content_length(size as i64)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| StorageError::request("PutObject", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn list(&self) -> Result<Vec<ObjectInfo>, StorageError> {
        let mut objects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StorageError::request("ListObjectsV2", DisplayErrorContext(&e)))?;

            objects.extend(resp.contents().iter().filter_map(|obj| {
                Some(ObjectInfo {
                    key: obj.key()?.to_string(),
                    size: obj.size().unwrap_or(0).max(0) as u64,
                    modified_at: obj.last_modified().map(|t| t.secs()),
                })
            }));

            match resp.next_continuation_token() {
                Some(token) if resp.is_truncated().unwrap_or(false) => {
                    continuation = Some(token.to_string());
                }
                _ => break,
            }
        }

        tracing::debug!("Listed {} objects in {}", objects.len(), self.bucket);
        Ok(objects)
    }

    async fn delete(&self, keys: &[String]) -> Result<(), StorageError> {
        for chunk in keys.chunks(DELETE_BATCH) {
            let identifiers = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| StorageError::request("DeleteObjects", e))?;
            let delete = Delete::builder()
                .set_objects(Some(identifiers))
                .quiet(true)
                .build()
                .map_err(|e| StorageError::request("DeleteObjects", e))?;

            let resp = self
                .client
                .delete_objects()
                .bucket(&self.bucket)
                .delete(delete)
                .send()
                .await
                .map_err(|e| StorageError::request("DeleteObjects", DisplayErrorContext(&e)))?;

            if let Some(failed) = resp.errors().first() {
                return Err(StorageError::request(
                    "DeleteObjects",
                    format!(
                        "{}: {}",
                        failed.key().unwrap_or("?"),
                        failed.message().unwrap_or("unknown error")
                    ),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_credentials_are_rejected() {
        let config = StorageConfig {
            backend: "s3".to_string(),
            access_key: String::new(),
            secret_key: "secret".to_string(),
            ..StorageConfig::default()
        };
        let err = S3ObjectStore::from_config(&config).await.err().unwrap();
        assert!(matches!(err, StorageError::Config(_)));
    }

    #[tokio::test]
    async fn test_r2_without_endpoint_is_rejected() {
        let config = StorageConfig {
            backend: "r2".to_string(),
            access_key: "key".to_string(),
            secret_key: "secret".to_string(),
            endpoint: String::new(),
            account_id: String::new(),
            ..StorageConfig::default()
        };
        let err = S3ObjectStore::from_config(&config).await.err().unwrap();
        assert!(err.to_string().contains("account_id"));
    }
}
