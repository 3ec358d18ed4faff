//! S3-compatible resume store (R2, MinIO, AWS).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use chrono::DateTime;
use tracing::debug;

use super::{ObjectListing, ResumeStore, StorageError, StoredObject};

#[derive(Clone)]
pub struct S3ResumeStore {
    client: Client,
    bucket: String,
}

impl S3ResumeStore {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

fn is_missing(message: &str) -> bool {
    message.contains("404") || message.contains("NoSuchKey") || message.contains("NotFound")
}

#[async_trait]
impl ResumeStore for S3ResumeStore {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn list(&self) -> Result<ObjectListing, StorageError> {
        let response = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .send()
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to list objects: {e}")))?;

        let objects: Vec<StoredObject> = response
            .contents()
            .iter()
            .map(|obj| StoredObject {
                key: obj.key().unwrap_or_default().to_string(),
                size: obj.size().unwrap_or(0),
                uploaded: obj
                    .last_modified()
                    .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos())),
            })
            .collect();

        debug!("Listed {} objects in bucket {}", objects.len(), self.bucket);
        Ok(ObjectListing {
            objects,
            truncated: response.is_truncated().unwrap_or(false),
        })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                let message = format!("{e:?}");
                if is_missing(&message) {
                    StorageError::NotFound(key.to_string())
                } else {
                    StorageError::Backend(format!("Failed to get object {key}: {e}"))
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Backend(format!("Failed to read object body: {e}")))?
            .into_bytes()
            .to_vec();

        Ok(data)
    }
}
