use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};
use overtime_recon::report::{self, ColumnSpec};
use rust_xlsxwriter::Workbook;
use tempfile::tempdir;

fn columns() -> ColumnSpec {
    ColumnSpec {
        key_column: "id".to_string(),
        measure_column: "ot".to_string(),
    }
}

fn write_input(path: &Path, rows: &[(&str, f64)]) {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "id").expect("header written");
    worksheet.write_string(0, 1, "ot").expect("header written");
    for (idx, (key, measurement)) in rows.iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, *key).expect("key written");
        worksheet
            .write_number(row, 1, *measurement)
            .expect("measurement written");
    }
    workbook.save(path).expect("input workbook saved");
}

fn read_sheet(path: &Path, name: &str) -> Vec<Vec<String>> {
    let mut workbook: Xlsx<_> = open_workbook(path).expect("output opened");
    let range = workbook
        .worksheet_range(name)
        .expect("sheet present")
        .expect("sheet readable");
    range
        .rows()
        .map(|row| row.iter().map(cell_string).collect())
        .collect()
}

fn cell_string(cell: &DataType) -> String {
    match cell {
        DataType::String(value) => value.clone(),
        DataType::Float(value) => value.to_string(),
        DataType::Int(value) => value.to_string(),
        DataType::Empty => String::new(),
        other => other.to_string(),
    }
}

fn sheet_names(path: &Path) -> Vec<String> {
    let workbook: Xlsx<_> = open_workbook(path).expect("output opened");
    workbook.sheet_names().to_vec()
}

#[test]
fn excel_report_contains_all_sheets_and_sorted_rows() {
    let temp_dir = tempdir().expect("temporary directory");
    let file_a = temp_dir.path().join("a.xlsx");
    let file_b = temp_dir.path().join("b.xlsx");
    let output = temp_dir.path().join("report.xlsx");

    write_input(&file_a, &[("1", 10.0)]);
    write_input(&file_b, &[("1", 10.0), ("2", 5.0)]);

    report::compare_to_excel(&file_a, &file_b, &output, &columns(), None)
        .expect("report written");

    // No duplicates in either source, so no Duplicates sheet.
    assert_eq!(
        sheet_names(&output),
        vec!["Comparison", "Diffs_Only", "Summary"]
    );

    let comparison = read_sheet(&output, "Comparison");
    assert_eq!(
        comparison[0],
        vec!["id", "A_ot", "B_ot", "Delta", "Status"]
    );
    // MISSING_IN_A sorts before OK.
    assert_eq!(comparison[1], vec!["2", "", "5", "", "MISSING_IN_A"]);
    assert_eq!(comparison[2], vec!["1", "10", "10", "0", "OK"]);

    let diffs = read_sheet(&output, "Diffs_Only");
    assert_eq!(diffs.len(), 2);
    assert_eq!(diffs[1][0], "2");

    let summary = read_sheet(&output, "Summary");
    assert_eq!(summary[0], vec!["Status", "Count"]);
    assert_eq!(summary[1], vec!["MISSING_IN_A", "1"]);
    assert_eq!(summary[2], vec!["OK", "1"]);
}

#[test]
fn duplicates_sheet_appears_with_padded_columns() {
    let temp_dir = tempdir().expect("temporary directory");
    let file_a = temp_dir.path().join("a.xlsx");
    let file_b = temp_dir.path().join("b.xlsx");
    let output = temp_dir.path().join("report.xlsx");

    write_input(&file_a, &[("7", 1.0), ("7", 2.0), ("8", 3.0), ("8", 4.0)]);
    write_input(&file_b, &[("7", 3.0)]);

    report::compare_to_excel(&file_a, &file_b, &output, &columns(), None)
        .expect("report written");

    assert_eq!(
        sheet_names(&output),
        vec!["Comparison", "Diffs_Only", "Summary", "Duplicates"]
    );

    let duplicates = read_sheet(&output, "Duplicates");
    assert_eq!(duplicates[0], vec!["Duplicates_in_A", "Duplicates_in_B"]);
    assert_eq!(duplicates[1], vec!["7", ""]);
    assert_eq!(duplicates[2], vec!["8", ""]);

    // Aggregation happened before the join: 1 + 2 = 3 matches B.
    let comparison = read_sheet(&output, "Comparison");
    let row_7 = comparison
        .iter()
        .find(|row| row[0] == "7")
        .expect("row for key 7");
    assert_eq!(row_7[4], "OK");
}

#[test]
fn json_report_serializes_statuses_and_summary() {
    let temp_dir = tempdir().expect("temporary directory");
    let file_a = temp_dir.path().join("a.xlsx");
    let file_b = temp_dir.path().join("b.xlsx");
    let output = temp_dir.path().join("report.json");

    write_input(&file_a, &[("1", 10.0), ("3", 2.0)]);
    write_input(&file_b, &[("1", 12.0)]);

    report::compare_to_json(&file_a, &file_b, &output, &columns(), None)
        .expect("report written");

    let raw = std::fs::read_to_string(&output).expect("JSON read");
    let parsed: serde_json::Value = serde_json::from_str(&raw).expect("JSON parsed");

    assert_eq!(parsed["summary"]["DIFF"], 1);
    assert_eq!(parsed["summary"]["MISSING_IN_B"], 1);

    let rows = parsed["comparison"]["rows"].as_array().expect("rows array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["key"], "1");
    assert_eq!(rows[0]["status"], "DIFF");
    assert_eq!(rows[0]["delta"], -2);
    assert_eq!(rows[1]["key"], "3");
    assert_eq!(rows[1]["status"], "MISSING_IN_B");
    assert!(rows[1].get("delta").is_none());
}

#[test]
fn missing_measurement_column_error_names_the_source() {
    let temp_dir = tempdir().expect("temporary directory");
    let file_a = temp_dir.path().join("a.xlsx");
    let file_b = temp_dir.path().join("b.xlsx");
    let output = temp_dir.path().join("report.xlsx");

    write_input(&file_a, &[("1", 10.0)]);

    // B carries an "hours" column instead of "ot".
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.write_string(0, 0, "id").expect("header written");
    worksheet.write_string(0, 1, "hours").expect("header written");
    worksheet.write_string(1, 0, "1").expect("key written");
    worksheet.write_number(1, 1, 10.0).expect("value written");
    workbook.save(&file_b).expect("input workbook saved");

    let error = report::compare_to_excel(&file_a, &file_b, &output, &columns(), None)
        .expect_err("schema error");
    let message = error.to_string();
    assert!(message.contains("B"));
    assert!(message.contains("ot"));
    assert!(message.contains("hours"));
    assert!(!output.exists());
}
