use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ObjectStore, PutAck};
use crate::error::PerfCmpError;

/// An object captured by [`MemoryStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// In-process store for tests and dry runs.
///
/// Every put is recorded, even when the configured status is a failure.
pub struct MemoryStore {
    status: u16,
    objects: Mutex<Vec<StoredObject>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_status(200)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that acknowledges every put with `status`.
    pub fn with_status(status: u16) -> Self {
        Self {
            status,
            objects: Mutex::new(Vec::new()),
        }
    }

    pub fn objects(&self) -> Result<Vec<StoredObject>, PerfCmpError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<StoredObject>>, PerfCmpError> {
        self.objects
            .lock()
            .map_err(|e| PerfCmpError::Store(format!("MemoryStore mutex poisoned: {e}")))
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<PutAck, PerfCmpError> {
        self.lock()?.push(StoredObject {
            bucket: bucket.to_string(),
            key: key.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(PutAck {
            http_status: self.status,
        })
    }
}
