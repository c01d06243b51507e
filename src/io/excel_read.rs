use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{ReconError, Result};
use crate::model::{CellValue, RawTable};

/// Reads one worksheet into a [`RawTable`].
///
/// The named sheet is used when given, otherwise the first sheet in the
/// workbook. The first row is the header; rows whose cells are all empty are
/// skipped. The label identifies the source in downstream schema errors.
pub fn read_table(path: &Path, sheet: Option<&str>, label: &str) -> Result<RawTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let range = match sheet {
        Some(name) => workbook
            .worksheet_range(name)
            .ok_or_else(|| ReconError::InvalidWorkbook(format!("missing sheet '{name}'")))??,
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| ReconError::InvalidWorkbook("workbook has no sheets".into()))??,
    };

    let mut rows_iter = range.rows();
    let header = rows_iter.next().ok_or_else(|| {
        ReconError::InvalidWorkbook(format!("{label}: sheet has no header row"))
    })?;
    let columns: Vec<String> = header.iter().map(|cell| cell_to_string(Some(cell))).collect();

    let mut rows: Vec<Vec<CellValue>> = Vec::new();
    for row in rows_iter {
        let cells: Vec<CellValue> = row.iter().map(cell_value).collect();
        if cells.iter().all(CellValue::is_absent) {
            continue;
        }
        rows.push(cells);
    }

    Ok(RawTable {
        label: label.to_string(),
        columns,
        rows,
    })
}

fn cell_value(cell: &DataType) -> CellValue {
    match cell {
        DataType::String(value) => CellValue::Text(value.clone()),
        DataType::Int(value) => CellValue::Int(*value),
        DataType::Float(value) => CellValue::Float(*value),
        DataType::Bool(value) => CellValue::Bool(*value),
        DataType::Empty => CellValue::Absent,
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
