use serde::{Deserialize, Serialize};

use crate::compare::comparator::{compare_stats, ComparisonRow, RunSummary, Verdict};
use crate::error::PerfCmpError;
use crate::metric::MetricKey;
use crate::report::PerformanceReport;

// ---------------------------------------------------------------------------
// Sheet model
// ---------------------------------------------------------------------------

/// A data row of a comparison sheet, below the header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SheetRow {
    Comparison(ComparisonRow),
    /// A section of execution 1 that execution 2 does not have.
    MissingSection { key: String },
}

impl SheetRow {
    /// Notice text for a [`SheetRow::MissingSection`].
    pub fn missing_notice(key: &str) -> String {
        format!("Key '{key}' not found in the second Execution.")
    }
}

/// All rows compared for a single metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComparisonSheet {
    pub metric: MetricKey,
    pub title: String,
    pub rows: Vec<SheetRow>,
    pub summary: RunSummary,
}

impl ComparisonSheet {
    pub fn comparison_rows(&self) -> impl Iterator<Item = &ComparisonRow> {
        self.rows.iter().filter_map(|row| match row {
            SheetRow::Comparison(cmp) => Some(cmp),
            SheetRow::MissingSection { .. } => None,
        })
    }

    pub fn missing_keys(&self) -> impl Iterator<Item = &str> {
        self.rows.iter().filter_map(|row| match row {
            SheetRow::MissingSection { key } => Some(key.as_str()),
            SheetRow::Comparison(_) => None,
        })
    }

    pub fn verdict(&self) -> Verdict {
        self.summary.verdict()
    }
}

/// One sheet per requested metric, in request order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComparisonWorkbook {
    pub sheets: Vec<ComparisonSheet>,
}

impl ComparisonWorkbook {
    pub fn sheet(&self, metric: &MetricKey) -> Option<&ComparisonSheet> {
        self.sheets.iter().find(|s| &s.metric == metric)
    }

    /// Compact per-sheet overview, for callers that do not want the rows.
    pub fn overview(&self) -> Vec<SheetOverview> {
        self.sheets.iter().map(SheetOverview::from_sheet).collect()
    }
}

/// Lightweight summary of one sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SheetOverview {
    pub metric: MetricKey,
    pub title: String,
    pub compared_rows: usize,
    pub faster: u32,
    pub slower: u32,
    pub verdict: String,
    pub missing_keys: Vec<String>,
}

impl SheetOverview {
    pub fn from_sheet(sheet: &ComparisonSheet) -> Self {
        Self {
            metric: sheet.metric.clone(),
            title: sheet.title.clone(),
            compared_rows: sheet.comparison_rows().count(),
            faster: sheet.summary.faster,
            slower: sheet.summary.slower,
            verdict: sheet.verdict().text().to_string(),
            missing_keys: sheet.missing_keys().map(str::to_string).collect(),
        }
    }
}

// ---------------------------------------------------------------------------
// build_workbook
// ---------------------------------------------------------------------------

/// Compare two executions over every metric in `metrics`.
///
/// Each sheet has the root row first, then one row per section of
/// `report1.contents` in its declared order. Sections that only exist in
/// `report2` are not listed. Any failed lookup aborts the whole build.
pub fn build_workbook(
    report1: &PerformanceReport,
    report2: &PerformanceReport,
    metrics: &[MetricKey],
) -> Result<ComparisonWorkbook, PerfCmpError> {
    let sheets = metrics
        .iter()
        .map(|metric| build_sheet(report1, report2, metric))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ComparisonWorkbook { sheets })
}

/// Build the sheet for a single metric.
pub fn build_sheet(
    report1: &PerformanceReport,
    report2: &PerformanceReport,
    metric: &MetricKey,
) -> Result<ComparisonSheet, PerfCmpError> {
    let mut summary = RunSummary::new();
    let mut rows = Vec::with_capacity(1 + report1.contents.len());

    rows.push(SheetRow::Comparison(compare_stats(
        report1.label(),
        &report1.stats,
        &report2.stats,
        metric,
        &mut summary,
    )?));

    for (key, section1) in &report1.contents {
        match report2.section(key) {
            Some(section2) => rows.push(SheetRow::Comparison(compare_stats(
                section1.label(),
                &section1.stats,
                &section2.stats,
                metric,
                &mut summary,
            )?)),
            None => {
                tracing::warn!(section = %key, metric = %metric, "section missing from execution 2");
                rows.push(SheetRow::MissingSection { key: key.clone() });
            }
        }
    }

    Ok(ComparisonSheet {
        metric: metric.clone(),
        title: metric.sheet_title().to_string(),
        rows,
        summary,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
