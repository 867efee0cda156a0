pub mod http;
pub mod memory;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::config::{ExportConfig, StoreKind};
use crate::error::PerfCmpError;

pub use http::HttpPutStore;
pub use memory::{MemoryStore, StoredObject};
pub use s3::S3Store;

/// Status an object store reports for a put.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutAck {
    pub http_status: u16,
}

impl PutAck {
    pub const OK: PutAck = PutAck { http_status: 200 };

    pub fn is_success(&self) -> bool {
        self.http_status == 200
    }
}

/// Somewhere the rendered workbook can be uploaded to.
///
/// Implementations make a single attempt; a non-200 acknowledgement is
/// returned as-is and judged by the caller.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<PutAck, PerfCmpError>;
}

/// Build the backend selected by `config`.
pub fn store_from_config(config: &ExportConfig) -> Result<Arc<dyn ObjectStore>, PerfCmpError> {
    let store: Arc<dyn ObjectStore> = match config.store {
        StoreKind::S3 => {
            let mut s3 = S3Store::new();
            if let Some(region) = &config.region {
                s3 = s3.with_region(region);
            }
            if let Some(endpoint) = &config.endpoint {
                s3 = s3.with_endpoint(endpoint);
            }
            Arc::new(s3)
        }
        StoreKind::Http => {
            let endpoint = config.endpoint.as_deref().ok_or_else(|| {
                PerfCmpError::Config("the http store needs an endpoint".to_string())
            })?;
            Arc::new(HttpPutStore::new(endpoint)?)
        }
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    };
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_ack_success_is_exactly_200() {
        assert!(PutAck::OK.is_success());
        assert!(!PutAck { http_status: 201 }.is_success());
        assert!(!PutAck { http_status: 403 }.is_success());
    }

    #[test]
    fn http_store_requires_endpoint() {
        let config = ExportConfig::new("bucket").with_store(StoreKind::Http);
        let err = store_from_config(&config).err().expect("should fail");
        assert!(matches!(err, PerfCmpError::Config(_)));
    }

    #[test]
    fn memory_store_from_config() {
        let config = ExportConfig::new("bucket").with_store(StoreKind::Memory);
        assert!(store_from_config(&config).is_ok());
    }
}
