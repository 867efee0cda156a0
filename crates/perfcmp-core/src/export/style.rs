//! Presentation pass over a finished [`ComparisonSheet`].
//!
//! The comparison model carries no colours or borders; this module lays a
//! sheet out as a grid of styled cells, which the xlsx writer then emits
//! verbatim.

use crate::compare::builder::{ComparisonSheet, SheetRow};
use crate::compare::comparator::{Classification, ComparisonRow};
use crate::metric::MetricKey;

/// Number of columns in the header and in every comparison row.
pub const COLUMN_COUNT: usize = 8;

pub const SUMMARY_FASTER_LABEL: &str = "No.Of.Transactions Executed Faster than last run:";
pub const SUMMARY_SLOWER_LABEL: &str = "No.Of.Transactions Executed Slower than last run:";
pub const SUMMARY_VERDICT_LABEL: &str = "Overall Observation:";
pub const SUMMARY_NOTE_LABEL: &str = "*Note:";
pub const SUMMARY_NOTE: &str =
    "These are system generated observations. Please review Manually for a complete analysis";

// ---------------------------------------------------------------------------
// Cell styling
// ---------------------------------------------------------------------------

/// Solid background fills used by the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// Value headers and summary labels.
    HeaderBlue,
    /// Headers of the delta columns.
    DeltaGrey,
    /// Delta cell of a row where execution 2 was faster.
    FasterGreen,
    /// Delta cell of a row where execution 2 was slower.
    SlowerYellow,
    /// Summary values.
    SummaryGreen,
}

impl Fill {
    pub fn rgb(&self) -> u32 {
        match self {
            Fill::HeaderBlue => 0x51ABD2,
            Fill::DeltaGrey => 0xD3D0D0,
            Fill::FasterGreen => 0x0C880E,
            Fill::SlowerYellow => 0xF4EB36,
            Fill::SummaryGreen => 0x65E823,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStyle {
    pub bold: bool,
    pub fill: Option<Fill>,
    /// Thin border on all four sides.
    pub border: bool,
}

impl CellStyle {
    pub const PLAIN: CellStyle = CellStyle {
        bold: false,
        fill: None,
        border: false,
    };

    const BORDERED: CellStyle = CellStyle {
        bold: false,
        fill: None,
        border: true,
    };

    fn header(fill: Fill) -> Self {
        CellStyle {
            bold: true,
            fill: Some(fill),
            border: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct StyledCell {
    pub value: CellValue,
    pub style: CellStyle,
}

impl StyledCell {
    fn text(text: impl Into<String>, style: CellStyle) -> Self {
        Self {
            value: CellValue::Text(text.into()),
            style,
        }
    }

    fn number(value: f64, style: CellStyle) -> Self {
        Self {
            value: CellValue::Number(value),
            style,
        }
    }
}

/// One worksheet row, left-aligned from column A.
pub type StyledRow = Vec<StyledCell>;

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Column headers for a metric's sheet.
pub fn header_labels(metric: &MetricKey) -> [String; COLUMN_COUNT] {
    let m = metric.as_str();
    [
        "Transaction Name".to_string(),
        format!("Execution1_OK Value {m}"),
        format!("Execution2_OK Value {m}"),
        "Delta(Execution2 value - Execution1 value)".to_string(),
        "Delta Percentage %".to_string(),
        format!("Execution1_KO Value {m}"),
        format!("Execution2_KO Value {m}"),
        "Delta(Execution2 value - Execution1 value)".to_string(),
    ]
}

pub fn header_row(metric: &MetricKey) -> StyledRow {
    header_labels(metric)
        .into_iter()
        .map(|label| {
            let fill = if label.contains("Delta") {
                Fill::DeltaGrey
            } else {
                Fill::HeaderBlue
            };
            StyledCell::text(label, CellStyle::header(fill))
        })
        .collect()
}

/// Fill for the delta-percentage cell, if any.
pub fn delta_fill(classification: Classification) -> Option<Fill> {
    match classification {
        Classification::Faster => Some(Fill::FasterGreen),
        Classification::Slower => Some(Fill::SlowerYellow),
        Classification::Unchanged => None,
    }
}

pub fn comparison_row(row: &ComparisonRow) -> StyledRow {
    let delta_style = CellStyle {
        fill: delta_fill(row.classification()),
        ..CellStyle::BORDERED
    };
    vec![
        StyledCell::text(row.name.clone(), CellStyle::BORDERED),
        StyledCell::number(row.value1_ok, CellStyle::BORDERED),
        StyledCell::number(row.value2_ok, CellStyle::BORDERED),
        StyledCell::number(row.diff_ok, CellStyle::BORDERED),
        StyledCell::text(row.formatted_delta(), delta_style),
        StyledCell::number(row.value1_ko, CellStyle::BORDERED),
        StyledCell::number(row.value2_ko, CellStyle::BORDERED),
        StyledCell::number(row.diff_ko, CellStyle::BORDERED),
    ]
}

pub fn missing_section_row(key: &str) -> StyledRow {
    vec![StyledCell::text(
        SheetRow::missing_notice(key),
        CellStyle::PLAIN,
    )]
}

/// The four-row faster/slower/verdict/note block.
pub fn summary_rows(sheet: &ComparisonSheet) -> Vec<StyledRow> {
    let label = CellStyle::header(Fill::HeaderBlue);
    let value = CellStyle::header(Fill::SummaryGreen);
    vec![
        vec![
            StyledCell::text(SUMMARY_FASTER_LABEL, label),
            StyledCell::number(f64::from(sheet.summary.faster), value),
        ],
        vec![
            StyledCell::text(SUMMARY_SLOWER_LABEL, label),
            StyledCell::number(f64::from(sheet.summary.slower), value),
        ],
        vec![
            StyledCell::text(SUMMARY_VERDICT_LABEL, label),
            StyledCell::text(sheet.verdict().text(), value),
        ],
        vec![
            StyledCell::text(SUMMARY_NOTE_LABEL, label),
            StyledCell::text(SUMMARY_NOTE, value),
        ],
    ]
}

/// Every row of the sheet: header, data rows, summary block.
pub fn layout_sheet(sheet: &ComparisonSheet) -> Vec<StyledRow> {
    let mut rows = Vec::with_capacity(sheet.rows.len() + 5);
    rows.push(header_row(&sheet.metric));
    rows.extend(sheet.rows.iter().map(|row| match row {
        SheetRow::Comparison(cmp) => comparison_row(cmp),
        SheetRow::MissingSection { key } => missing_section_row(key),
    }));
    rows.extend(summary_rows(sheet));
    rows
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
