use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::CONTENT_TYPE;

use super::{ObjectStore, PutAck};
use crate::error::PerfCmpError;

/// Plain `PUT {endpoint}/{bucket}/{key}` upload.
///
/// Useful against gateways that accept unsigned writes. The real HTTP
/// status is passed back in the acknowledgement.
pub struct HttpPutStore {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPutStore {
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PerfCmpError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .user_agent(format!("perfcmp/{}", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn object_url(&self, bucket: &str, key: &str) -> String {
        format!("{}/{}/{}", self.endpoint.trim_end_matches('/'), bucket, key)
    }
}

#[async_trait]
impl ObjectStore for HttpPutStore {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<PutAck, PerfCmpError> {
        let url = self.object_url(bucket, key);
        let response = self
            .client
            .put(&url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        let http_status = response.status().as_u16();
        tracing::debug!(%url, http_status, "http put finished");
        Ok(PutAck { http_status })
    }
}
