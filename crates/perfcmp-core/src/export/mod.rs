pub mod style;
pub mod xlsx;

use std::path::Path;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};

use crate::compare::builder::ComparisonWorkbook;
use crate::config::{ExportConfig, DEFAULT_URL_TEMPLATE};
use crate::error::PerfCmpError;
use crate::store::{store_from_config, ObjectStore};

pub use xlsx::{render_workbook, CONTENT_TYPE};

// ---------------------------------------------------------------------------
// Naming helpers
// ---------------------------------------------------------------------------

/// Unix time in whole seconds, rounded to the nearest second.
pub fn unix_timestamp(now: DateTime<Utc>) -> i64 {
    let secs = now.timestamp();
    if now.timestamp_subsec_millis() >= 500 {
        secs + 1
    } else {
        secs
    }
}

/// Object key for a report uploaded at `timestamp`.
pub fn object_key_for(timestamp: i64) -> String {
    format!("output_{timestamp}.xlsx")
}

/// Fill `{bucket}` and `{key}` into a URL template.
pub fn public_url(template: &str, bucket: &str, key: &str) -> String {
    template.replace("{bucket}", bucket).replace("{key}", key)
}

// ---------------------------------------------------------------------------
// ReportExporter
// ---------------------------------------------------------------------------

/// Renders a [`ComparisonWorkbook`] and publishes it to an object store.
pub struct ReportExporter {
    store: Arc<dyn ObjectStore>,
    bucket: String,
    url_template: String,
}

impl ReportExporter {
    pub fn new(store: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
        }
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Exporter with the backend, bucket and URL scheme from `config`.
    pub fn from_config(config: &ExportConfig) -> Result<Self, PerfCmpError> {
        config.validate()?;
        Ok(Self::new(store_from_config(config)?, config.bucket.clone())
            .with_url_template(config.url_template.clone()))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Publish the workbook and return its public URL.
    pub async fn export(&self, workbook: &ComparisonWorkbook) -> Result<String, PerfCmpError> {
        self.export_at(workbook, unix_timestamp(Utc::now())).await
    }

    /// Same as [`ReportExporter::export`] with an explicit timestamp for the
    /// object key.
    pub async fn export_at(
        &self,
        workbook: &ComparisonWorkbook,
        timestamp: i64,
    ) -> Result<String, PerfCmpError> {
        let bytes = render_workbook(workbook)?;
        let key = object_key_for(timestamp);
        let size = bytes.len();

        let ack = self
            .store
            .put(&self.bucket, &key, Bytes::from(bytes), CONTENT_TYPE)
            .await?;

        if !ack.is_success() {
            tracing::error!(
                bucket = %self.bucket,
                key = %key,
                http_status = ack.http_status,
                "report upload rejected"
            );
            return Err(PerfCmpError::Export(format!(
                "failed to upload {key} to bucket {}: status {}",
                self.bucket, ack.http_status
            )));
        }

        let url = public_url(&self.url_template, &self.bucket, &key);
        tracing::info!(%url, size, "report published");
        Ok(url)
    }
}

/// Render the workbook and write it to a local `.xlsx` file.
pub async fn write_workbook(
    workbook: &ComparisonWorkbook,
    path: impl AsRef<Path>,
) -> Result<(), PerfCmpError> {
    let bytes = render_workbook(workbook)?;
    tokio::fs::write(path.as_ref(), bytes).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
