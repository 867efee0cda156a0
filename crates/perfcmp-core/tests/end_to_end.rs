//! End-to-end comparisons through the public API.

use std::sync::Arc;

use perfcmp_core::compare::{build_sheet, RunSummary, SheetRow, Verdict};
use perfcmp_core::export::style::{layout_sheet, CellValue};
use perfcmp_core::store::{HttpPutStore, MemoryStore};
use perfcmp_core::{
    build_workbook, compare_and_publish, MetricKey, PerfCmpError, PerformanceReport,
    ReportExporter, DEFAULT_METRICS,
};
use wiremock::matchers::{method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EXECUTION_1: &str = r#"{
    "name": "Root",
    "stats": { "name": "Root", "meanResponseTime": { "total": 102, "ok": 100, "ko": 2 } },
    "contents": {
        "Login": { "name": "Login", "stats": { "name": "Login", "meanResponseTime": { "ok": 50, "ko": 0 } } }
    }
}"#;

const EXECUTION_2: &str = r#"{
    "name": "Root",
    "stats": { "name": "Root", "meanResponseTime": { "total": 92, "ok": 90, "ko": 2 } },
    "contents": {
        "Login": { "name": "Login", "stats": { "name": "Login", "meanResponseTime": { "ok": 60, "ko": 0 } } }
    }
}"#;

fn reports() -> (PerformanceReport, PerformanceReport) {
    (
        PerformanceReport::from_json_str(EXECUTION_1).unwrap(),
        PerformanceReport::from_json_str(EXECUTION_2).unwrap(),
    )
}

/// A report carrying every default metric, with values scaled by `factor`.
fn full_report(factor: f64, sections: &[&str]) -> PerformanceReport {
    let stats = |name: &str| {
        let metrics = DEFAULT_METRICS
            .iter()
            .enumerate()
            .map(|(i, key)| {
                format!(
                    "\"{key}\": {{\"ok\": {}, \"ko\": {}}}",
                    (i as f64 + 1.0) * 10.0 * factor,
                    i
                )
            })
            .collect::<Vec<_>>()
            .join(",");
        format!("{{\"name\": \"{name}\", {metrics}}}")
    };
    let contents = sections
        .iter()
        .map(|s| format!("\"{s}\": {{\"stats\": {}}}", stats(s)))
        .collect::<Vec<_>>()
        .join(",");
    let json = format!(
        "{{\"stats\": {}, \"contents\": {{{contents}}}}}",
        stats("All Requests")
    );
    PerformanceReport::from_json_str(&json).unwrap()
}

#[test]
fn worked_example_is_a_tie() {
    let (r1, r2) = reports();
    let sheet = build_sheet(&r1, &r2, &MetricKey::MeanResponseTime).unwrap();

    let rows: Vec<_> = sheet.comparison_rows().collect();
    assert_eq!(rows.len(), 2);

    assert_eq!(rows[0].name, "Root");
    assert_eq!(rows[0].diff_ok, -10.0);
    assert_eq!(rows[0].formatted_delta(), "-10.00%");

    assert_eq!(rows[1].name, "Login");
    assert_eq!(rows[1].diff_ok, 10.0);
    assert_eq!(rows[1].formatted_delta(), "20.00%");

    assert_eq!(sheet.summary, RunSummary { faster: 1, slower: 1 });
    assert_eq!(sheet.verdict(), Verdict::Tie);

    let layout = layout_sheet(&sheet);
    assert_eq!(
        layout[5][1].value,
        CellValue::Text("Both runs performed equally well.".to_string())
    );
}

#[test]
fn identical_reports_across_all_default_metrics() {
    let r = full_report(1.0, &["a", "b", "c"]);
    let wb = build_workbook(&r, &r, &DEFAULT_METRICS).unwrap();
    assert_eq!(wb.sheets.len(), 8);
    for sheet in &wb.sheets {
        assert_eq!(sheet.rows.len(), 4);
        assert_eq!(sheet.summary, RunSummary::default());
        assert_eq!(sheet.verdict(), Verdict::Tie);
        for row in sheet.comparison_rows() {
            assert_eq!(row.delta_percent, 0.0);
            assert_eq!(row.diff_ok, 0.0);
            assert_eq!(row.diff_ko, 0.0);
        }
    }
    let titles: Vec<&str> = wb.sheets.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(
        titles,
        vec![
            "minResponseTime",
            "maxResponseTime",
            "meanResponseTime",
            "50th Percentile",
            "75th Percentile",
            "95th Percentile",
            "99th Percentile",
            "standardDeviation",
        ]
    );
}

#[test]
fn asymmetric_sections() {
    let r1 = full_report(1.0, &["shared", "only_one"]);
    let r2 = full_report(0.5, &["shared", "only_two"]);
    let wb = build_workbook(&r1, &r2, &DEFAULT_METRICS).unwrap();
    for sheet in &wb.sheets {
        assert_eq!(sheet.rows.len(), 3);
        assert!(matches!(
            &sheet.rows[2],
            SheetRow::MissingSection { key } if key == "only_one"
        ));
        assert!(sheet.comparison_rows().all(|r| r.name != "only_two"));
        // execution 2 halves every value: root and shared are faster
        assert_eq!(sheet.summary, RunSummary { faster: 2, slower: 0 });
        assert_eq!(sheet.verdict(), Verdict::Execution2Better);
    }
}

#[tokio::test]
async fn publish_through_memory_store() {
    let (r1, r2) = reports();
    let store = Arc::new(MemoryStore::new());
    let exporter = ReportExporter::new(store.clone(), "qa-perf");
    let url = compare_and_publish(&r1, &r2, &[MetricKey::MeanResponseTime], &exporter)
        .await
        .unwrap();

    assert!(url.starts_with("https://qa-perf.s3.amazonaws.com/output_"));
    assert!(url.ends_with(".xlsx"));
    let objects = store.objects().unwrap();
    assert_eq!(objects.len(), 1);
    assert!(url.ends_with(&objects[0].key));
}

#[tokio::test]
async fn missing_metric_uploads_nothing() {
    let (r1, r2) = reports();
    let store = Arc::new(MemoryStore::new());
    let exporter = ReportExporter::new(store.clone(), "qa-perf");
    let err = compare_and_publish(&r1, &r2, &DEFAULT_METRICS, &exporter)
        .await
        .unwrap_err();
    assert!(matches!(err, PerfCmpError::MissingMetric { .. }));
    assert!(store.objects().unwrap().is_empty());
}

#[tokio::test]
async fn http_store_rejection_is_an_export_error() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/qa-perf/output_\d+\.xlsx$"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let (r1, r2) = reports();
    let exporter = ReportExporter::new(Arc::new(HttpPutStore::new(server.uri()).unwrap()), "qa-perf");
    let err = compare_and_publish(&r1, &r2, &[MetricKey::MeanResponseTime], &exporter)
        .await
        .unwrap_err();
    assert!(matches!(err, PerfCmpError::Export(_)));
}

#[tokio::test]
async fn http_store_success_returns_templated_url() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path_regex(r"^/qa-perf/output_\d+\.xlsx$"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let (r1, r2) = reports();
    let template = format!("{}/{{bucket}}/{{key}}", server.uri());
    let exporter = ReportExporter::new(Arc::new(HttpPutStore::new(server.uri()).unwrap()), "qa-perf")
        .with_url_template(template);
    let url = compare_and_publish(&r1, &r2, &[MetricKey::MeanResponseTime], &exporter)
        .await
        .unwrap();
    assert!(url.starts_with(&format!("{}/qa-perf/output_", server.uri())));
}
