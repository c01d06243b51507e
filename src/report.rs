use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument};

use crate::error::Result;
use crate::io::excel_read;
use crate::io::excel_write;
use crate::model::{RawTable, ReconReport};
use crate::normalize::normalize_table;
use crate::reconcile::reconcile;

/// Tag prefixed onto the first source's columns.
pub const SOURCE_TAG_A: &str = "A";
/// Tag prefixed onto the second source's columns.
pub const SOURCE_TAG_B: &str = "B";

/// Names of the key and measurement columns shared by both inputs. Fixed for
/// a given deployment, configuration as far as the engine is concerned.
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    pub key_column: String,
    pub measure_column: String,
}

/// Runs the pure engine over two raw tables: normalize both sources, then
/// join and classify. The only failure is a schema error from normalization.
#[instrument(level = "debug", skip_all, fields(rows_a = raw_a.rows.len(), rows_b = raw_b.rows.len()))]
pub fn run_reconciliation(
    raw_a: &RawTable,
    raw_b: &RawTable,
    columns: &ColumnSpec,
) -> Result<ReconReport> {
    let (table_a, duplicates_a) =
        normalize_table(raw_a, SOURCE_TAG_A, &columns.key_column, &columns.measure_column)?;
    let (table_b, duplicates_b) =
        normalize_table(raw_b, SOURCE_TAG_B, &columns.key_column, &columns.measure_column)?;
    debug!(
        keys_a = table_a.records.len(),
        keys_b = table_b.records.len(),
        duplicates_a = duplicates_a.len(),
        duplicates_b = duplicates_b.len(),
        "sources normalized"
    );
    Ok(reconcile(&table_a, &table_b, duplicates_a, duplicates_b))
}

/// Compares two workbooks and writes the styled Excel report.
#[instrument(
    level = "info",
    skip_all,
    fields(file_a = %file_a.display(), file_b = %file_b.display(), output = %output.display())
)]
pub fn compare_to_excel(
    file_a: &Path,
    file_b: &Path,
    output: &Path,
    columns: &ColumnSpec,
    sheet: Option<&str>,
) -> Result<()> {
    let report = load_and_reconcile(file_a, file_b, columns, sheet)?;
    excel_write::write_report(output, &report)
}

/// Compares two workbooks and writes the report as pretty-printed JSON.
#[instrument(
    level = "info",
    skip_all,
    fields(file_a = %file_a.display(), file_b = %file_b.display(), output = %output.display())
)]
pub fn compare_to_json(
    file_a: &Path,
    file_b: &Path,
    output: &Path,
    columns: &ColumnSpec,
    sheet: Option<&str>,
) -> Result<()> {
    let report = load_and_reconcile(file_a, file_b, columns, sheet)?;
    let json_string = serde_json::to_string_pretty(&report)?;
    fs::write(output, json_string)?;
    Ok(())
}

fn load_and_reconcile(
    file_a: &Path,
    file_b: &Path,
    columns: &ColumnSpec,
    sheet: Option<&str>,
) -> Result<ReconReport> {
    let raw_a = excel_read::read_table(file_a, sheet, SOURCE_TAG_A)?;
    let raw_b = excel_read::read_table(file_b, sheet, SOURCE_TAG_B)?;
    info!(rows_a = raw_a.rows.len(), rows_b = raw_b.rows.len(), "inputs loaded");
    let report = run_reconciliation(&raw_a, &raw_b, columns)?;
    info!(
        rows = report.comparison.rows.len(),
        diffs = report.diffs.rows.len(),
        "report assembled"
    );
    Ok(report)
}
