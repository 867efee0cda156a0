//! AWS S3 (and S3-compatible) backend on top of the `object_store` crate.

use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path;
use object_store::{Attribute, Attributes, ObjectStore as _, PutOptions, PutPayload};

use super::{ObjectStore, PutAck};
use crate::error::PerfCmpError;

/// Lower-case credential variables honoured in addition to the standard
/// `AWS_*` ones.
const ACCESS_KEY_VAR: &str = "aws_access_key_id";
const SECRET_KEY_VAR: &str = "aws_secret_access_key";

/// Uploads to S3 with credentials taken from the environment.
#[derive(Debug, Clone, Default)]
pub struct S3Store {
    region: Option<String>,
    endpoint: Option<String>,
}

impl S3Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Custom endpoint for S3-compatible services (MinIO, R2, ...).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    fn builder(&self, bucket: &str) -> AmazonS3Builder {
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if let Ok(key_id) = std::env::var(ACCESS_KEY_VAR) {
            builder = builder.with_access_key_id(key_id);
        }
        if let Ok(secret) = std::env::var(SECRET_KEY_VAR) {
            builder = builder.with_secret_access_key(secret);
        }
        if let Some(region) = &self.region {
            builder = builder.with_region(region);
        }
        if let Some(endpoint) = &self.endpoint {
            builder = builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://"));
        }
        builder
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        bytes: Bytes,
        content_type: &str,
    ) -> Result<PutAck, PerfCmpError> {
        let client = self.builder(bucket).build()?;

        let mut attributes = Attributes::new();
        attributes.insert(Attribute::ContentType, content_type.to_string().into());
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        let size = bytes.len();
        client
            .put_opts(&Path::from(key), PutPayload::from_bytes(bytes), opts)
            .await?;

        tracing::debug!(bucket, key, size, "uploaded object to s3");
        // object_store only returns Ok once S3 has answered 200.
        Ok(PutAck::OK)
    }
}
