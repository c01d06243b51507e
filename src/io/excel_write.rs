use std::path::Path;

use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook, Worksheet};

use crate::error::Result;
use crate::model::{CellValue, ComparisonTable, ReconReport, Status};

/// Sheet holding the full joined table.
pub const COMPARISON_SHEET: &str = "Comparison";
/// Sheet holding only the non-`OK` rows.
pub const DIFFS_SHEET: &str = "Diffs_Only";
/// Sheet holding the per-status counts.
pub const SUMMARY_SHEET: &str = "Summary";
/// Sheet holding the per-source duplicate keys; written only when needed.
pub const DUPLICATES_SHEET: &str = "Duplicates";

const DUPLICATES_A_COLUMN: &str = "Duplicates_in_A";
const DUPLICATES_B_COLUMN: &str = "Duplicates_in_B";

const COLUMN_WIDTH: f64 = 18.0;
const HEADER_FILL: Color = Color::RGB(0xE7E6E6);
const FILL_OK: Color = Color::RGB(0xD9E1F2);
const FILL_DIFF: Color = Color::RGB(0xF8CBAD);
const FILL_MISSING: Color = Color::RGB(0xFFF2CC);

/// Writes the report as a styled workbook.
///
/// Comparison rows are filled by status; the diffs and summary sheets carry
/// the same data unstyled. The `Duplicates` sheet appears only when at least
/// one source had duplicate keys, as two parallel columns padded with blanks.
pub fn write_report(path: &Path, report: &ReconReport) -> Result<()> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_background_color(HEADER_FILL)
        .set_align(FormatAlign::Center)
        .set_align(FormatAlign::VerticalCenter)
        .set_text_wrap();

    write_comparison_sheet(
        workbook.add_worksheet(),
        COMPARISON_SHEET,
        &report.comparison,
        &header_format,
        true,
    )?;
    write_comparison_sheet(
        workbook.add_worksheet(),
        DIFFS_SHEET,
        &report.diffs,
        &header_format,
        false,
    )?;
    write_summary_sheet(workbook.add_worksheet(), report, &header_format)?;
    if report.has_duplicates() {
        write_duplicates_sheet(workbook.add_worksheet(), report, &header_format)?;
    }

    workbook.save(path)?;
    Ok(())
}

fn write_comparison_sheet(
    worksheet: &mut Worksheet,
    name: &str,
    table: &ComparisonTable,
    header_format: &Format,
    fill_by_status: bool,
) -> Result<()> {
    worksheet.set_name(name)?;

    let headers = table.column_headers();
    write_header_row(worksheet, &headers, header_format)?;

    for (row_idx, row) in table.rows.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        let row_format = fill_by_status.then(|| Format::new().set_background_color(status_fill(row.status)));
        let row_format = row_format.as_ref();

        let mut cells: Vec<CellValue> = vec![
            CellValue::Text(row.key.clone()),
            optional_int(row.measurement_a),
            optional_int(row.measurement_b),
            optional_int(row.delta),
            CellValue::Text(row.status.to_string()),
        ];
        for column in &table.extra_columns {
            cells.push(row.extras.get(column).cloned().unwrap_or(CellValue::Absent));
        }

        for (col_idx, cell) in cells.iter().enumerate() {
            write_cell(worksheet, excel_row, col_idx as u16, cell, row_format)?;
        }
    }

    set_column_widths(worksheet, headers.len())?;
    Ok(())
}

fn write_summary_sheet(
    worksheet: &mut Worksheet,
    report: &ReconReport,
    header_format: &Format,
) -> Result<()> {
    worksheet.set_name(SUMMARY_SHEET)?;
    write_header_row(
        worksheet,
        &["Status".to_string(), "Count".to_string()],
        header_format,
    )?;

    for (row_idx, (status, count)) in report.summary.iter().enumerate() {
        let excel_row = (row_idx + 1) as u32;
        worksheet.write_string(excel_row, 0, status.as_str())?;
        worksheet.write_number(excel_row, 1, *count as f64)?;
    }

    set_column_widths(worksheet, 2)?;
    Ok(())
}

fn write_duplicates_sheet(
    worksheet: &mut Worksheet,
    report: &ReconReport,
    header_format: &Format,
) -> Result<()> {
    worksheet.set_name(DUPLICATES_SHEET)?;
    write_header_row(
        worksheet,
        &[
            DUPLICATES_A_COLUMN.to_string(),
            DUPLICATES_B_COLUMN.to_string(),
        ],
        header_format,
    )?;

    let rows = report.duplicates_a.len().max(report.duplicates_b.len());
    for row_idx in 0..rows {
        let excel_row = (row_idx + 1) as u32;
        if let Some(key) = report.duplicates_a.get(row_idx) {
            worksheet.write_string(excel_row, 0, key)?;
        }
        if let Some(key) = report.duplicates_b.get(row_idx) {
            worksheet.write_string(excel_row, 1, key)?;
        }
    }

    set_column_widths(worksheet, 2)?;
    Ok(())
}

fn write_header_row(worksheet: &mut Worksheet, headers: &[String], format: &Format) -> Result<()> {
    for (col_idx, header) in headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col_idx as u16, header, format)?;
    }
    Ok(())
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &CellValue,
    format: Option<&Format>,
) -> Result<()> {
    match (value, format) {
        (CellValue::Text(text), Some(format)) => {
            worksheet.write_string_with_format(row, col, text, format)?;
        }
        (CellValue::Text(text), None) => {
            worksheet.write_string(row, col, text)?;
        }
        (CellValue::Int(number), Some(format)) => {
            worksheet.write_number_with_format(row, col, *number as f64, format)?;
        }
        (CellValue::Int(number), None) => {
            worksheet.write_number(row, col, *number as f64)?;
        }
        (CellValue::Float(number), Some(format)) => {
            worksheet.write_number_with_format(row, col, *number, format)?;
        }
        (CellValue::Float(number), None) => {
            worksheet.write_number(row, col, *number)?;
        }
        (CellValue::Bool(flag), Some(format)) => {
            worksheet.write_boolean_with_format(row, col, *flag, format)?;
        }
        (CellValue::Bool(flag), None) => {
            worksheet.write_boolean(row, col, *flag)?;
        }
        // Absent cells stay blank; a filled row still paints them.
        (CellValue::Absent, Some(format)) => {
            worksheet.write_blank(row, col, format)?;
        }
        (CellValue::Absent, None) => {}
    }
    Ok(())
}

fn set_column_widths(worksheet: &mut Worksheet, columns: usize) -> Result<()> {
    for col_idx in 0..columns {
        worksheet.set_column_width(col_idx as u16, COLUMN_WIDTH)?;
    }
    Ok(())
}

fn status_fill(status: Status) -> Color {
    match status {
        Status::Ok => FILL_OK,
        Status::Diff => FILL_DIFF,
        Status::MissingInA | Status::MissingInB | Status::MissingBoth => FILL_MISSING,
    }
}

fn optional_int(value: Option<i64>) -> CellValue {
    value.map(CellValue::Int).unwrap_or(CellValue::Absent)
}
