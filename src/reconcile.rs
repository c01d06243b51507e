use std::collections::{BTreeMap, HashMap};

use crate::model::{
    CellValue, ComparisonRow, ComparisonTable, NormalizedRecord, NormalizedTable, ReconReport,
    Status,
};

/// Classifies one joined row from its two optional measurements.
///
/// Precedence: one-sided absence first, then double absence, then numeric
/// comparison. The double-absence arm is unreachable through the join today
/// (normalized records always carry a measurement) but keeps absence
/// handling total.
pub fn classify_measurements(a: Option<i64>, b: Option<i64>) -> Status {
    match (a, b) {
        (None, Some(_)) => Status::MissingInA,
        (Some(_), None) => Status::MissingInB,
        (None, None) => Status::MissingBoth,
        (Some(a), Some(b)) if a == b => Status::Ok,
        (Some(_), Some(_)) => Status::Diff,
    }
}

/// Full outer join of two normalized tables plus the derived artifacts.
///
/// Every key present in either table appears exactly once; extra columns the
/// other side does not have are filled with the explicit `Absent` marker.
/// Rows sort ascending by (status string, key string) — lexicographic on
/// both, so `DIFF` groups before `MISSING_*` before `OK` and key "10" sorts
/// before "2". That ordering is part of the report contract.
///
/// Cannot fail: both inputs were schema-checked and uniquely keyed by the
/// normalizer, and no re-validation happens here.
pub fn reconcile(
    a: &NormalizedTable,
    b: &NormalizedTable,
    duplicates_a: Vec<String>,
    duplicates_b: Vec<String>,
) -> ReconReport {
    let a_index: HashMap<&str, &NormalizedRecord> =
        a.records.iter().map(|record| (record.key.as_str(), record)).collect();
    let b_index: HashMap<&str, &NormalizedRecord> =
        b.records.iter().map(|record| (record.key.as_str(), record)).collect();

    let extra_columns: Vec<String> = a
        .extra_columns
        .iter()
        .chain(b.extra_columns.iter())
        .cloned()
        .collect();

    let mut rows: Vec<ComparisonRow> = Vec::with_capacity(a.records.len() + b.records.len());
    for record in &a.records {
        rows.push(build_row(
            &record.key,
            Some(record),
            b_index.get(record.key.as_str()).copied(),
            a,
            b,
        ));
    }
    for record in &b.records {
        if !a_index.contains_key(record.key.as_str()) {
            rows.push(build_row(&record.key, None, Some(record), a, b));
        }
    }

    rows.sort_by(|lhs, rhs| {
        (lhs.status.as_str(), lhs.key.as_str()).cmp(&(rhs.status.as_str(), rhs.key.as_str()))
    });

    let mut summary: BTreeMap<Status, usize> = BTreeMap::new();
    for row in &rows {
        *summary.entry(row.status).or_insert(0) += 1;
    }

    let diff_rows: Vec<ComparisonRow> = rows
        .iter()
        .filter(|row| row.status != Status::Ok)
        .cloned()
        .collect();

    let comparison = ComparisonTable {
        key_column: a.key_column.clone(),
        measure_a_column: a.measure_column.clone(),
        measure_b_column: b.measure_column.clone(),
        extra_columns,
        rows,
    };
    let diffs = ComparisonTable {
        rows: diff_rows,
        ..comparison.clone()
    };

    ReconReport {
        comparison,
        diffs,
        summary,
        duplicates_a,
        duplicates_b,
    }
}

fn build_row(
    key: &str,
    from_a: Option<&NormalizedRecord>,
    from_b: Option<&NormalizedRecord>,
    a: &NormalizedTable,
    b: &NormalizedTable,
) -> ComparisonRow {
    let measurement_a = from_a.map(|record| record.measurement);
    let measurement_b = from_b.map(|record| record.measurement);

    let mut extras = BTreeMap::new();
    fill_extras(&mut extras, &a.extra_columns, from_a);
    fill_extras(&mut extras, &b.extra_columns, from_b);

    ComparisonRow {
        key: key.to_string(),
        measurement_a,
        measurement_b,
        delta: measurement_a.zip(measurement_b).map(|(a, b)| a - b),
        status: classify_measurements(measurement_a, measurement_b),
        extras,
    }
}

fn fill_extras(
    extras: &mut BTreeMap<String, CellValue>,
    columns: &[String],
    record: Option<&NormalizedRecord>,
) {
    for column in columns {
        let value = record
            .and_then(|record| record.extras.get(column).cloned())
            .unwrap_or(CellValue::Absent);
        extras.insert(column.clone(), value);
    }
}
