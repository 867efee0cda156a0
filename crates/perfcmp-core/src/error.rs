use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum PerfCmpError {
    #[error("Missing metric: {}", describe_missing(.metric, .field))]
    MissingMetric { metric: String, field: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

/// `field` of a [`PerfCmpError::MissingMetric`] whose whole entry is absent
/// from the stats object.
pub const MISSING_ENTRY: &str = "entry";

fn describe_missing(metric: &str, field: &str) -> String {
    if field == MISSING_ENTRY {
        format!("'{metric}' is not present in the report stats")
    } else {
        format!("'{metric}' has no numeric '{field}' value")
    }
}

impl PerfCmpError {
    pub(crate) fn missing(metric: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingMetric {
            metric: metric.into(),
            field: field.into(),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for PerfCmpError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        Self::Render(err.to_string())
    }
}

impl From<object_store::Error> for PerfCmpError {
    fn from(err: object_store::Error) -> Self {
        Self::Store(err.to_string())
    }
}

impl Serialize for PerfCmpError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metric_display() {
        let err = PerfCmpError::missing("meanResponseTime", "ok");
        assert_eq!(
            err.to_string(),
            "Missing metric: 'meanResponseTime' has no numeric 'ok' value"
        );
    }

    #[test]
    fn absent_metric_entry_display() {
        let err = PerfCmpError::missing("percentiles1", MISSING_ENTRY);
        assert_eq!(
            err.to_string(),
            "Missing metric: 'percentiles1' is not present in the report stats"
        );
    }

    #[test]
    fn export_error_display() {
        let err = PerfCmpError::Export("upload returned status 403".to_string());
        assert_eq!(err.to_string(), "Export error: upload returned status 403");
    }

    #[test]
    fn config_error_display() {
        let err = PerfCmpError::Config("bucket is not set".to_string());
        assert_eq!(err.to_string(), "Configuration error: bucket is not set");
    }

    #[test]
    fn io_error_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: PerfCmpError = io_err.into();
        let msg = err.to_string();
        assert!(msg.contains("IO error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn serde_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("not valid json").unwrap_err();
        let err: PerfCmpError = json_err.into();
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn serialize_produces_string() {
        let err = PerfCmpError::Store("bucket unreachable".to_string());
        let json = serde_json::to_string(&err).expect("serialize should succeed");
        assert_eq!(json, "\"Store error: bucket unreachable\"");
    }

    #[test]
    fn error_is_debug() {
        let err = PerfCmpError::missing("percentiles1", "ko");
        let debug = format!("{:?}", err);
        assert!(debug.contains("MissingMetric"));
    }
}
