use serde::{Deserialize, Serialize};

use crate::error::PerfCmpError;
use crate::metric::MetricKey;
use crate::report::ReportStats;

/// Stand-in divisor when execution 1's `ok` value is exactly zero.
pub const ZERO_BASELINE_EPSILON: f64 = 1e-10;

// ---------------------------------------------------------------------------
// ComparisonRow
// ---------------------------------------------------------------------------

/// One compared node for one metric. Execution 2 minus execution 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ComparisonRow {
    pub name: String,
    pub value1_ok: f64,
    pub value2_ok: f64,
    pub diff_ok: f64,
    /// Percentage change of the `ok` value, rounded to 2 decimals.
    pub delta_percent: f64,
    pub value1_ko: f64,
    pub value2_ko: f64,
    pub diff_ko: f64,
    /// Execution 1's `ok` value was zero, so `delta_percent` was computed
    /// against [`ZERO_BASELINE_EPSILON`] and is not meaningful.
    pub baseline_was_zero: bool,
}

impl ComparisonRow {
    pub fn classification(&self) -> Classification {
        Classification::of(self.delta_percent)
    }

    /// The percentage cell text, e.g. `-10.00%`.
    pub fn formatted_delta(&self) -> String {
        format!("{:.2}%", self.delta_percent)
    }
}

/// How execution 2 did against execution 1 on a single row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Faster,
    Slower,
    Unchanged,
}

impl Classification {
    pub fn of(delta_percent: f64) -> Self {
        if delta_percent < 0.0 {
            Classification::Faster
        } else if delta_percent > 0.0 {
            Classification::Slower
        } else {
            Classification::Unchanged
        }
    }
}

// ---------------------------------------------------------------------------
// RunSummary / Verdict
// ---------------------------------------------------------------------------

/// Faster/slower tally for one sheet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RunSummary {
    /// Rows where execution 2 was faster.
    pub faster: u32,
    /// Rows where execution 2 was slower.
    pub slower: u32,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Faster => self.faster += 1,
            Classification::Slower => self.slower += 1,
            Classification::Unchanged => {}
        }
    }

    pub fn verdict(&self) -> Verdict {
        if self.slower > self.faster {
            Verdict::Execution1Better
        } else if self.faster > self.slower {
            Verdict::Execution2Better
        } else {
            Verdict::Tie
        }
    }
}

/// Overall observation written at the bottom of each sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Execution1Better,
    Execution2Better,
    Tie,
}

impl Verdict {
    pub fn text(&self) -> &'static str {
        match self {
            Verdict::Execution1Better => "Execution 1 performed better overall.",
            Verdict::Execution2Better => "Execution 2 performed better overall.",
            Verdict::Tie => "Both runs performed equally well.",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

// ---------------------------------------------------------------------------
// compare_stats
// ---------------------------------------------------------------------------

/// Compare `metric` between two nodes' stats and tally the result.
///
/// Both sides are read before anything is recorded, so a lookup failure
/// leaves `summary` untouched.
pub fn compare_stats(
    name: &str,
    stats1: &ReportStats,
    stats2: &ReportStats,
    metric: &MetricKey,
    summary: &mut RunSummary,
) -> Result<ComparisonRow, PerfCmpError> {
    let v1 = stats1.metric(metric)?;
    let v2 = stats2.metric(metric)?;

    let baseline_was_zero = v1.ok == 0.0;
    let safe_v1_ok = if baseline_was_zero {
        ZERO_BASELINE_EPSILON
    } else {
        v1.ok
    };
    let delta_percent = round2((v2.ok - safe_v1_ok) / safe_v1_ok * 100.0);

    if baseline_was_zero {
        tracing::warn!(
            row = name,
            metric = %metric,
            "execution 1 value is zero; delta percentage is computed against epsilon"
        );
    }

    let row = ComparisonRow {
        name: name.to_string(),
        value1_ok: v1.ok,
        value2_ok: v2.ok,
        diff_ok: v2.ok - v1.ok,
        delta_percent,
        value1_ko: v1.ko,
        value2_ko: v2.ko,
        diff_ko: v2.ko - v1.ko,
        baseline_was_zero,
    };
    summary.record(row.classification());

    tracing::debug!(
        row = name,
        metric = %metric,
        delta_percent,
        "compared row"
    );
    Ok(row)
}

/// Round to 2 decimals, ties to even on the exact binary value.
///
/// Goes through the `{:.2}` formatter, which rounds the exact decimal
/// expansion rather than `x * 100`, so `2.675` stays `2.67`.
pub fn round2(value: f64) -> f64 {
    if !value.is_finite() {
        return value;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stats(ok: f64, ko: f64) -> ReportStats {
        serde_json::from_value(json!({
            "name": "Req",
            "meanResponseTime": { "total": ok + ko, "ok": ok, "ko": ko }
        }))
        .unwrap()
    }

    fn compare(v1: (f64, f64), v2: (f64, f64), summary: &mut RunSummary) -> ComparisonRow {
        compare_stats(
            "Req",
            &stats(v1.0, v1.1),
            &stats(v2.0, v2.1),
            &MetricKey::MeanResponseTime,
            summary,
        )
        .expect("comparison should succeed")
    }

    // -----------------------------------------------------------------------
    // compare_stats
    // -----------------------------------------------------------------------

    #[test]
    fn faster_row_has_negative_delta() {
        let mut summary = RunSummary::new();
        let row = compare((100.0, 2.0), (90.0, 2.0), &mut summary);
        assert_eq!(row.diff_ok, -10.0);
        assert_eq!(row.delta_percent, -10.0);
        assert_eq!(row.formatted_delta(), "-10.00%");
        assert_eq!(row.classification(), Classification::Faster);
        assert_eq!(summary, RunSummary { faster: 1, slower: 0 });
    }

    #[test]
    fn slower_row_has_positive_delta() {
        let mut summary = RunSummary::new();
        let row = compare((50.0, 0.0), (60.0, 3.0), &mut summary);
        assert_eq!(row.diff_ok, 10.0);
        assert_eq!(row.diff_ko, 3.0);
        assert_eq!(row.delta_percent, 20.0);
        assert_eq!(row.formatted_delta(), "20.00%");
        assert_eq!(summary, RunSummary { faster: 0, slower: 1 });
    }

    #[test]
    fn equal_values_leave_counters_alone() {
        let mut summary = RunSummary::new();
        for v in [1.0, 37.5, 1234.0] {
            let row = compare((v, 1.0), (v, 1.0), &mut summary);
            assert_eq!(row.delta_percent, 0.0);
            assert_eq!(row.formatted_delta(), "0.00%");
            assert_eq!(row.diff_ok, 0.0);
            assert_eq!(row.diff_ko, 0.0);
        }
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn zero_baseline_uses_epsilon() {
        let mut summary = RunSummary::new();
        let row = compare((0.0, 0.0), (5.0, 0.0), &mut summary);
        let expected = round2((5.0 - ZERO_BASELINE_EPSILON) / ZERO_BASELINE_EPSILON * 100.0);
        assert_eq!(row.delta_percent, expected);
        assert!(row.delta_percent.is_finite());
        assert!(row.delta_percent > 1e12);
        assert!(row.baseline_was_zero);
        assert_eq!(row.diff_ok, 5.0);
        assert_eq!(summary.slower, 1);
    }

    #[test]
    fn both_zero_reads_as_minus_one_hundred_percent() {
        let mut summary = RunSummary::new();
        let row = compare((0.0, 0.0), (0.0, 0.0), &mut summary);
        assert_eq!(row.diff_ok, 0.0);
        assert_eq!(row.formatted_delta(), "-100.00%");
        assert_eq!(summary.faster, 1);
    }

    #[test]
    fn zero_baseline_negative_value_is_negative() {
        let mut summary = RunSummary::new();
        let row = compare((0.0, 0.0), (-3.0, 0.0), &mut summary);
        assert!(row.delta_percent < -1e12);
        assert_eq!(summary.faster, 1);
    }

    #[test]
    fn tiny_delta_that_rounds_to_zero_is_unchanged() {
        let mut summary = RunSummary::new();
        let row = compare((100_000.0, 0.0), (100_000.001, 0.0), &mut summary);
        assert_eq!(row.delta_percent, 0.0);
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn missing_metric_in_second_report_fails_without_tally() {
        let mut summary = RunSummary::new();
        let empty: ReportStats = serde_json::from_value(json!({ "name": "Req" })).unwrap();
        let err = compare_stats(
            "Req",
            &stats(10.0, 0.0),
            &empty,
            &MetricKey::MeanResponseTime,
            &mut summary,
        )
        .unwrap_err();
        assert!(matches!(err, PerfCmpError::MissingMetric { .. }));
        assert_eq!(summary, RunSummary::default());
    }

    #[test]
    fn missing_ko_field_fails() {
        let mut summary = RunSummary::new();
        let partial: ReportStats =
            serde_json::from_value(json!({ "meanResponseTime": { "ok": 10 } })).unwrap();
        let err = compare_stats(
            "Req",
            &partial,
            &stats(10.0, 0.0),
            &MetricKey::MeanResponseTime,
            &mut summary,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            PerfCmpError::MissingMetric { ref field, .. } if field == "ko"
        ));
    }

    // -----------------------------------------------------------------------
    // RunSummary / Verdict
    // -----------------------------------------------------------------------

    #[test]
    fn verdict_prefers_execution_one_when_more_rows_slowed_down() {
        let summary = RunSummary { faster: 1, slower: 3 };
        assert_eq!(summary.verdict(), Verdict::Execution1Better);
        assert_eq!(summary.verdict().text(), "Execution 1 performed better overall.");
    }

    #[test]
    fn verdict_prefers_execution_two_when_more_rows_sped_up() {
        let summary = RunSummary { faster: 4, slower: 0 };
        assert_eq!(summary.verdict(), Verdict::Execution2Better);
        assert_eq!(summary.verdict().to_string(), "Execution 2 performed better overall.");
    }

    #[test]
    fn verdict_tie() {
        assert_eq!(RunSummary::default().verdict(), Verdict::Tie);
        assert_eq!(
            RunSummary { faster: 2, slower: 2 }.verdict().text(),
            "Both runs performed equally well."
        );
    }

    // -----------------------------------------------------------------------
    // round2
    // -----------------------------------------------------------------------

    #[test]
    fn round2_rounds_exact_binary_value() {
        assert_eq!(round2(2.675), 2.67);
        assert_eq!(round2(1.005), 1.0);
        assert_eq!(round2(-10.0), -10.0);
        assert_eq!(round2(33.333333), 33.33);
        assert_eq!(round2(66.666666), 66.67);
    }

    #[test]
    fn round2_passes_non_finite_through() {
        assert!(round2(f64::NAN).is_nan());
        assert_eq!(round2(f64::INFINITY), f64::INFINITY);
    }
}
