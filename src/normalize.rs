use std::collections::HashMap;

use crate::error::{ReconError, Result};
use crate::model::{CellValue, NormalizedRecord, NormalizedTable, RawTable};

/// Normalizes one raw table into a uniquely keyed, source-tagged table.
///
/// Keys are compared by their trimmed string form. Measurements coerce to
/// integers, with unparseable or absent values repaired to 0 rather than
/// rejected. Rows sharing a key are aggregated: measurements are summed,
/// every other column keeps the first row's value. Every non-key column is
/// renamed `<tag>_<name>` so the two sources cannot collide after the join.
///
/// Returns the table together with the keys that appeared on more than one
/// raw row, in first-encountered order.
pub fn normalize_table(
    raw: &RawTable,
    tag: &str,
    key_column: &str,
    measure_column: &str,
) -> Result<(NormalizedTable, Vec<String>)> {
    require_columns(raw, key_column, measure_column)?;

    let key_idx = column_index(raw, key_column);
    let measure_idx = column_index(raw, measure_column);

    // Tagged extra columns keep the raw table's column order.
    let extras: Vec<(usize, String)> = raw
        .columns
        .iter()
        .enumerate()
        .filter(|(idx, _)| *idx != key_idx && *idx != measure_idx)
        .map(|(idx, name)| (idx, format!("{tag}_{name}")))
        .collect();

    let mut records: Vec<NormalizedRecord> = Vec::new();
    let mut index_by_key: HashMap<String, usize> = HashMap::new();
    let mut row_counts: HashMap<String, usize> = HashMap::new();

    for row in &raw.rows {
        let key = cell_at(row, key_idx).to_key_string().trim().to_string();
        let measurement = cell_at(row, measure_idx).to_measurement();

        *row_counts.entry(key.clone()).or_insert(0) += 1;

        match index_by_key.get(&key) {
            Some(&existing) => {
                records[existing].measurement += measurement;
            }
            None => {
                let mut record = NormalizedRecord {
                    key: key.clone(),
                    measurement,
                    extras: Default::default(),
                };
                for (idx, tagged) in &extras {
                    record.extras.insert(tagged.clone(), cell_at(row, *idx));
                }
                index_by_key.insert(key, records.len());
                records.push(record);
            }
        }
    }

    let duplicates: Vec<String> = records
        .iter()
        .filter(|record| row_counts[&record.key] > 1)
        .map(|record| record.key.clone())
        .collect();

    let table = NormalizedTable {
        tag: tag.to_string(),
        key_column: key_column.to_string(),
        measure_column: format!("{tag}_{measure_column}"),
        extra_columns: extras.into_iter().map(|(_, name)| name).collect(),
        records,
    };

    Ok((table, duplicates))
}

fn require_columns(raw: &RawTable, key_column: &str, measure_column: &str) -> Result<()> {
    let missing: Vec<String> = [key_column, measure_column]
        .into_iter()
        .filter(|name| !raw.columns.iter().any(|column| column.as_str() == *name))
        .map(str::to_string)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ReconError::MissingColumns {
            label: raw.label.clone(),
            missing,
            present: raw.columns.clone(),
        })
    }
}

fn column_index(raw: &RawTable, name: &str) -> usize {
    // Presence was checked by require_columns.
    raw.columns.iter().position(|column| column.as_str() == name).unwrap_or(0)
}

fn cell_at(row: &[CellValue], idx: usize) -> CellValue {
    row.get(idx).cloned().unwrap_or(CellValue::Absent)
}
