pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod metric;
pub mod report;
pub mod store;

pub use compare::{build_workbook, ComparisonWorkbook};
pub use config::ExportConfig;
pub use error::PerfCmpError;
pub use export::ReportExporter;
pub use metric::{MetricKey, DEFAULT_METRICS};
pub use report::PerformanceReport;

/// Compare two executions over `metrics`, publish the workbook and return
/// its URL.
///
/// Nothing is uploaded unless every sheet was built.
pub async fn compare_and_publish(
    report1: &PerformanceReport,
    report2: &PerformanceReport,
    metrics: &[MetricKey],
    exporter: &ReportExporter,
) -> Result<String, PerfCmpError> {
    let run_id = uuid::Uuid::new_v4();
    tracing::info!(
        %run_id,
        metrics = metrics.len(),
        sections = report1.contents.len(),
        "comparing performance reports"
    );

    let workbook = build_workbook(report1, report2, metrics)?;
    let url = exporter.export(&workbook).await?;

    tracing::info!(%run_id, %url, "comparison finished");
    Ok(url)
}
