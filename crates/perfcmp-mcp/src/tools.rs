use std::sync::Arc;

use serde_json::{json, Value};

use perfcmp_core::export::write_workbook;
use perfcmp_core::report::io::read_report;
use perfcmp_core::{
    build_workbook, compare_and_publish, MetricKey, PerformanceReport, ReportExporter,
    DEFAULT_METRICS,
};

use crate::protocol::{ToolCallResult, ToolDefinition};

// ---------------------------------------------------------------------------
// State passed into every tool handler
// ---------------------------------------------------------------------------

pub struct ToolState {
    /// Publisher for `publish_comparison`, or the reason there is none.
    pub exporter: Result<Arc<ReportExporter>, String>,
}

// ---------------------------------------------------------------------------
// Tool definitions (advertised via tools/list)
// ---------------------------------------------------------------------------

pub fn all_tool_definitions() -> Vec<ToolDefinition> {
    vec![
        compare_reports_def(),
        publish_comparison_def(),
        list_metrics_def(),
    ]
}

fn report_pair_properties() -> serde_json::Map<String, Value> {
    let props = json!({
        "report1_path": {
            "type": "string",
            "description": "Path to the JSON report of the first (baseline) execution"
        },
        "report2_path": {
            "type": "string",
            "description": "Path to the JSON report of the second execution"
        },
        "metrics": {
            "type": "array",
            "items": { "type": "string" },
            "description": "Metric keys to compare, one sheet each. Defaults to the eight standard response-time metrics."
        }
    });
    match props {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

fn compare_reports_def() -> ToolDefinition {
    let mut properties = report_pair_properties();
    properties.insert(
        "output_path".to_string(),
        json!({
            "type": "string",
            "description": "Optional path where the comparison workbook (.xlsx) is written"
        }),
    );
    ToolDefinition {
        name: "compare_reports".to_string(),
        description: "Compare two performance-test reports metric by metric. Returns faster/slower counts, the overall observation and sections missing from the second execution for every sheet.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": properties,
            "required": ["report1_path", "report2_path"]
        }),
    }
}

fn publish_comparison_def() -> ToolDefinition {
    ToolDefinition {
        name: "publish_comparison".to_string(),
        description: "Compare two performance-test reports, upload the workbook to the configured bucket and return its URL.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": report_pair_properties(),
            "required": ["report1_path", "report2_path"]
        }),
    }
}

fn list_metrics_def() -> ToolDefinition {
    ToolDefinition {
        name: "list_metrics".to_string(),
        description: "List the default metric keys and the sheet title each one gets.".to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {}
        }),
    }
}

// ---------------------------------------------------------------------------
// Tool dispatch
// ---------------------------------------------------------------------------

pub async fn dispatch_tool(name: &str, args: Value, state: &ToolState) -> ToolCallResult {
    match name {
        "compare_reports" => handle_compare_reports(args).await,
        "publish_comparison" => handle_publish_comparison(args, state).await,
        "list_metrics" => handle_list_metrics(),
        unknown => ToolCallResult::error(format!("Unknown tool: {unknown}")),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| format!("Missing required argument: {key}"))
}

fn json_ok<T: serde::Serialize>(value: &T) -> ToolCallResult {
    match serde_json::to_string_pretty(value) {
        Ok(json) => ToolCallResult::ok(json),
        Err(e) => ToolCallResult::error(format!("Serialization error: {e}")),
    }
}

/// `metrics` argument; absent, null or empty means the default set.
fn metric_keys(args: &Value) -> Result<Vec<MetricKey>, String> {
    match args.get("metrics") {
        None | Some(Value::Null) => Ok(DEFAULT_METRICS.to_vec()),
        Some(Value::Array(items)) if items.is_empty() => Ok(DEFAULT_METRICS.to_vec()),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(MetricKey::from)
                    .ok_or_else(|| format!("Invalid metric key: {item}"))
            })
            .collect(),
        Some(other) => Err(format!("'metrics' must be an array of strings, got {other}")),
    }
}

async fn load_pair(args: &Value) -> Result<(PerformanceReport, PerformanceReport), String> {
    let path1 = require_str(args, "report1_path")?;
    let path2 = require_str(args, "report2_path")?;
    let report1 = read_report(path1)
        .await
        .map_err(|e| format!("Failed to load report from {path1}: {e}"))?;
    let report2 = read_report(path2)
        .await
        .map_err(|e| format!("Failed to load report from {path2}: {e}"))?;
    Ok((report1, report2))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn handle_compare_reports(args: Value) -> ToolCallResult {
    let metrics = match metric_keys(&args) {
        Ok(m) => m,
        Err(e) => return ToolCallResult::error(e),
    };
    let (report1, report2) = match load_pair(&args).await {
        Ok(pair) => pair,
        Err(e) => return ToolCallResult::error(e),
    };

    let workbook = match build_workbook(&report1, &report2, &metrics) {
        Ok(wb) => wb,
        Err(e) => return ToolCallResult::error(format!("Comparison failed: {e}")),
    };

    let output_path = args.get("output_path").and_then(|v| v.as_str());
    if let Some(path) = output_path {
        if let Err(e) = write_workbook(&workbook, path).await {
            return ToolCallResult::error(format!("Failed to write workbook to {path}: {e}"));
        }
        tracing::info!(path, sheets = workbook.sheets.len(), "workbook written");
    }

    json_ok(&json!({
        "output_path": output_path,
        "sheets": workbook.overview(),
    }))
}

async fn handle_publish_comparison(args: Value, state: &ToolState) -> ToolCallResult {
    let exporter = match &state.exporter {
        Ok(exporter) => Arc::clone(exporter),
        Err(e) => return ToolCallResult::error(format!("Publishing is not configured: {e}")),
    };
    let metrics = match metric_keys(&args) {
        Ok(m) => m,
        Err(e) => return ToolCallResult::error(e),
    };
    let (report1, report2) = match load_pair(&args).await {
        Ok(pair) => pair,
        Err(e) => return ToolCallResult::error(e),
    };

    match compare_and_publish(&report1, &report2, &metrics, &exporter).await {
        Ok(url) => ToolCallResult::ok(url),
        Err(e) => ToolCallResult::error(format!("Publishing failed: {e}")),
    }
}

fn handle_list_metrics() -> ToolCallResult {
    let metrics: Vec<Value> = DEFAULT_METRICS
        .iter()
        .map(|m| json!({ "key": m.as_str(), "title": m.sheet_title() }))
        .collect();
    json_ok(&metrics)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
