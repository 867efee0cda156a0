use rust_xlsxwriter::{Color, Format, FormatBorder, FormatPattern, Workbook, Worksheet};

use crate::compare::builder::{ComparisonSheet, ComparisonWorkbook};
use crate::error::PerfCmpError;
use crate::export::style::{layout_sheet, CellStyle, CellValue};

/// MIME type of the rendered workbook.
pub const CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Longest worksheet name Excel accepts, in characters.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const INVALID_SHEET_NAME_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Render the workbook to xlsx bytes, one worksheet per comparison sheet.
pub fn render_workbook(workbook: &ComparisonWorkbook) -> Result<Vec<u8>, PerfCmpError> {
    let names = worksheet_names(workbook.sheets.iter().map(|s| s.title.as_str()));
    let mut book = Workbook::new();
    for (sheet, name) in workbook.sheets.iter().zip(names) {
        if name != sheet.title {
            tracing::warn!(title = %sheet.title, worksheet = %name, "sheet title adjusted");
        }
        let worksheet = book.add_worksheet();
        worksheet.set_name(name)?;
        write_sheet(worksheet, sheet)?;
    }
    Ok(book.save_to_buffer()?)
}

// ---------------------------------------------------------------------------
// Worksheet naming
// ---------------------------------------------------------------------------

/// Excel-safe worksheet names for `titles`, in order.
///
/// Forbidden characters become `_` and names are cut to 31 characters.
/// A name already taken (case-insensitively) gets the lowest free numeric
/// suffix, `title1`, `title2`, ..., shortening the base so the result still
/// fits.
pub fn worksheet_names<'a>(titles: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for title in titles {
        let base = sanitize_sheet_name(title);
        let mut name = base.clone();
        let mut suffix = 0u32;
        while names
            .iter()
            .any(|used| used.to_lowercase() == name.to_lowercase())
        {
            suffix += 1;
            let digits = suffix.to_string();
            let keep = MAX_SHEET_NAME_LEN - digits.len();
            name = format!("{}{digits}", truncate_chars(&base, keep));
        }
        names.push(name);
    }
    names
}

fn sanitize_sheet_name(title: &str) -> String {
    let replaced: String = title
        .chars()
        .map(|c| if INVALID_SHEET_NAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches('\'');
    if trimmed.is_empty() {
        "Sheet".to_string()
    } else {
        truncate_chars(trimmed, MAX_SHEET_NAME_LEN).to_string()
    }
}

fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ---------------------------------------------------------------------------
// Cell output
// ---------------------------------------------------------------------------

fn write_sheet(worksheet: &mut Worksheet, sheet: &ComparisonSheet) -> Result<(), PerfCmpError> {
    for (row_idx, row) in layout_sheet(sheet).iter().enumerate() {
        let row_idx = row_idx as u32;
        for (col_idx, cell) in row.iter().enumerate() {
            let col_idx = col_idx as u16;
            let format = to_format(&cell.style);
            match &cell.value {
                CellValue::Text(text) => {
                    worksheet.write_string_with_format(row_idx, col_idx, text, &format)?;
                }
                CellValue::Number(n) => {
                    worksheet.write_number_with_format(row_idx, col_idx, *n, &format)?;
                }
            }
        }
    }
    Ok(())
}

fn to_format(style: &CellStyle) -> Format {
    let mut format = Format::new();
    if style.bold {
        format = format.set_bold();
    }
    if let Some(fill) = style.fill {
        format = format
            .set_pattern(FormatPattern::Solid)
            .set_background_color(Color::RGB(fill.rgb()));
    }
    if style.border {
        format = format.set_border(FormatBorder::Thin);
    }
    format
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
