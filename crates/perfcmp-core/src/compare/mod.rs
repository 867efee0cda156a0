pub mod builder;
pub mod comparator;

pub use builder::{
    build_sheet, build_workbook, ComparisonSheet, ComparisonWorkbook, SheetOverview, SheetRow,
};
pub use comparator::{
    compare_stats, round2, Classification, ComparisonRow, RunSummary, Verdict,
    ZERO_BASELINE_EPSILON,
};
