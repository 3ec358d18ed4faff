// Resume object storage. Handlers only see the `ResumeStore` trait; the S3 adapter is
// wired in main.rs, tests use the in-memory store.

#[cfg(test)]
pub mod memory;
pub mod s3;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;

pub use s3::S3ResumeStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// Listing entry for one stored object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredObject {
    pub key: String,
    pub size: i64,
    pub uploaded: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectListing {
    pub objects: Vec<StoredObject>,
    /// The backend had more keys than one listing returns.
    pub truncated: bool,
}

/// File kind derived from the object key's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResumeKind {
    Txt,
    Pdf,
    Other,
}

impl ResumeKind {
    pub fn of(key: &str) -> Self {
        if key.ends_with(".pdf") {
            ResumeKind::Pdf
        } else if key.ends_with(".txt") {
            ResumeKind::Txt
        } else {
            ResumeKind::Other
        }
    }
}

/// Read-only view of the bucket holding the resume set.
#[async_trait]
pub trait ResumeStore: Send + Sync {
    /// Bucket name, for diagnostics.
    fn bucket(&self) -> &str;

    async fn list(&self) -> Result<ObjectListing, StorageError>;

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Fetches an object and decodes it as UTF-8, replacing invalid sequences.
    async fn get_text(&self, key: &str) -> Result<String, StorageError> {
        let bytes = self.get(key).await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(ResumeKind::of("backend.txt"), ResumeKind::Txt);
        assert_eq!(ResumeKind::of("backend.pdf"), ResumeKind::Pdf);
        assert_eq!(ResumeKind::of("notes.md"), ResumeKind::Other);
    }
}
