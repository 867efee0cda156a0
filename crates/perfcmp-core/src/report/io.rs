use std::path::Path;

use crate::error::PerfCmpError;
use crate::report::PerformanceReport;

/// Read a JSON performance report (e.g. Gatling's `stats.json`) from disk.
pub async fn read_report(path: impl AsRef<Path>) -> Result<PerformanceReport, PerfCmpError> {
    let content = tokio::fs::read_to_string(path.as_ref()).await?;
    PerformanceReport::from_json_str(&content)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
