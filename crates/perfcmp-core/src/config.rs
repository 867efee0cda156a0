use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PerfCmpError;

/// Default public address of an uploaded report.
pub const DEFAULT_URL_TEMPLATE: &str = "https://{bucket}.s3.amazonaws.com/{key}";

/// Environment variables read by [`ExportConfig::from_env`].
pub mod env_vars {
    /// Bucket name; checked first.
    pub const BUCKET: &str = "aws_performance_comparator_bucket";
    /// Bucket name fallback.
    pub const BUCKET_ALT: &str = "PERFCMP_BUCKET";
    pub const URL_TEMPLATE: &str = "PERFCMP_URL_TEMPLATE";
    pub const STORE: &str = "PERFCMP_STORE";
    pub const ENDPOINT: &str = "PERFCMP_ENDPOINT";
    pub const REGION: &str = "PERFCMP_REGION";
}

/// Which [`crate::store::ObjectStore`] backend to upload with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    #[default]
    S3,
    Http,
    Memory,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StoreKind::S3 => "s3",
            StoreKind::Http => "http",
            StoreKind::Memory => "memory",
        };
        write!(f, "{s}")
    }
}

impl FromStr for StoreKind {
    type Err = PerfCmpError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(StoreKind::S3),
            "http" => Ok(StoreKind::Http),
            "memory" => Ok(StoreKind::Memory),
            other => Err(PerfCmpError::Config(format!("unknown store kind: {other}"))),
        }
    }
}

/// Where and how a rendered report is published.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExportConfig {
    pub bucket: String,
    /// Public URL with `{bucket}` and `{key}` placeholders.
    pub url_template: String,
    pub store: StoreKind,
    /// Custom endpoint; required for [`StoreKind::Http`].
    pub endpoint: Option<String>,
    pub region: Option<String>,
}

impl ExportConfig {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            store: StoreKind::default(),
            endpoint: None,
            region: None,
        }
    }

    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    pub fn with_store(mut self, store: StoreKind) -> Self {
        self.store = store;
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, PerfCmpError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name
    /// to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, PerfCmpError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bucket = non_empty(env_vars::BUCKET)
            .or_else(|| non_empty(env_vars::BUCKET_ALT))
            .ok_or_else(|| {
                PerfCmpError::Config(format!(
                    "no bucket configured; set {} or {}",
                    env_vars::BUCKET,
                    env_vars::BUCKET_ALT
                ))
            })?;

        let mut config = Self::new(bucket);
        if let Some(template) = non_empty(env_vars::URL_TEMPLATE) {
            config = config.with_url_template(template);
        }
        if let Some(store) = non_empty(env_vars::STORE) {
            config = config.with_store(store.parse()?);
        }
        if let Some(endpoint) = non_empty(env_vars::ENDPOINT) {
            config = config.with_endpoint(endpoint);
        }
        if let Some(region) = non_empty(env_vars::REGION) {
            config = config.with_region(region);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PerfCmpError> {
        if self.bucket.trim().is_empty() {
            return Err(PerfCmpError::Config("bucket must not be empty".to_string()));
        }
        if !self.url_template.contains("{key}") {
            return Err(PerfCmpError::Config(format!(
                "url template '{}' has no {{key}} placeholder",
                self.url_template
            )));
        }
        Ok(())
    }
}
