//! In-memory `ResumeStore` for handler tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use super::{ObjectListing, ResumeStore, StorageError, StoredObject};

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    objects: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, data: impl Into<Vec<u8>>) -> Self {
        self.objects.insert(key.to_string(), data.into());
        self
    }
}

#[async_trait]
impl ResumeStore for MemoryStore {
    fn bucket(&self) -> &str {
        "memory"
    }

    async fn list(&self) -> Result<ObjectListing, StorageError> {
        Ok(ObjectListing {
            objects: self
                .objects
                .iter()
                .map(|(key, data)| StoredObject {
                    key: key.clone(),
                    size: data.len() as i64,
                    uploaded: None,
                })
                .collect(),
            truncated: false,
        })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        self.objects
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }
}
