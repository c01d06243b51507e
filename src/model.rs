use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Header of the delta column in the comparison output.
pub const DELTA_COLUMN: &str = "Delta";
/// Header of the status column in the comparison output.
pub const STATUS_COLUMN: &str = "Status";

/// A single cell value carried through the pipeline.
///
/// `Absent` is the explicit missing-value marker: the engine never encodes
/// absence as an empty string, a zero, or a NaN, and every branch that cares
/// about missing data matches on this variant.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value")]
pub enum CellValue {
    /// Plain text cell.
    Text(String),
    /// Integer cell.
    Int(i64),
    /// Floating point cell.
    Float(f64),
    /// Boolean cell.
    Bool(bool),
    /// Missing cell.
    Absent,
}

impl CellValue {
    /// String form used when a cell acts as a record key. Absent cells
    /// render as the empty string; trimming happens in the normalizer.
    pub fn to_key_string(&self) -> String {
        match self {
            CellValue::Text(value) => value.clone(),
            CellValue::Int(value) => value.to_string(),
            CellValue::Float(value) => value.to_string(),
            CellValue::Bool(value) => value.to_string(),
            CellValue::Absent => String::new(),
        }
    }

    /// Integer form used when a cell acts as a measurement. Unparseable and
    /// absent cells coerce to 0; fractional values truncate.
    pub fn to_measurement(&self) -> i64 {
        match self {
            CellValue::Text(value) => match value.trim().parse::<i64>() {
                Ok(parsed) => parsed,
                Err(_) => value.trim().parse::<f64>().map(|f| f as i64).unwrap_or(0),
            },
            CellValue::Int(value) => *value,
            CellValue::Float(value) => *value as i64,
            CellValue::Bool(value) => i64::from(*value),
            CellValue::Absent => 0,
        }
    }

    /// Returns true for the explicit missing marker.
    pub fn is_absent(&self) -> bool {
        matches!(self, CellValue::Absent)
    }
}

/// One raw input table as handed over by the host: ordered column headers and
/// ordered rows of cells, plus a label identifying the source in errors.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    pub label: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// One record after normalization: trimmed key, coerced measurement, and the
/// remaining columns keyed by their tagged name.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub key: String,
    pub measurement: i64,
    pub extras: BTreeMap<String, CellValue>,
}

/// One source table after normalization. Keys are unique (duplicates were
/// aggregated away) and every non-key column name carries the source tag.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable {
    pub tag: String,
    pub key_column: String,
    /// Tagged name of the measurement column, e.g. `A_Overtime`.
    pub measure_column: String,
    /// Tagged non-key, non-measurement columns in first-encountered order.
    pub extra_columns: Vec<String>,
    pub records: Vec<NormalizedRecord>,
}

// ---------------------------------------------------------------------------
// Classification
// ---------------------------------------------------------------------------

/// Match condition of one joined row.
///
/// Variant order matches the ascending status-string order the report is
/// sorted by, so ordered containers keyed by `Status` iterate the same way
/// the comparison rows do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Diff,
    MissingBoth,
    MissingInA,
    MissingInB,
    Ok,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Diff => "DIFF",
            Status::MissingBoth => "MISSING_BOTH",
            Status::MissingInA => "MISSING_IN_A",
            Status::MissingInB => "MISSING_IN_B",
            Status::Ok => "OK",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the joined comparison output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonRow {
    pub key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_a: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub measurement_b: Option<i64>,
    /// `measurement_a - measurement_b`, present iff both sides are present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta: Option<i64>,
    pub status: Status,
    /// Tagged column → value; `Absent` where the owning side had no row.
    pub extras: BTreeMap<String, CellValue>,
}

/// The joined output: column metadata plus rows sorted ascending by
/// (status string, key string). Every key from either source appears once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonTable {
    pub key_column: String,
    pub measure_a_column: String,
    pub measure_b_column: String,
    /// A's extra columns in first-encountered order, then B's.
    pub extra_columns: Vec<String>,
    pub rows: Vec<ComparisonRow>,
}

impl ComparisonTable {
    /// Output column order: key, both measurements, delta, status, extras.
    pub fn column_headers(&self) -> Vec<String> {
        let mut headers = vec![
            self.key_column.clone(),
            self.measure_a_column.clone(),
            self.measure_b_column.clone(),
            DELTA_COLUMN.to_string(),
            STATUS_COLUMN.to_string(),
        ];
        headers.extend(self.extra_columns.iter().cloned());
        headers
    }
}

// ---------------------------------------------------------------------------
// Report bundle
// ---------------------------------------------------------------------------

/// Everything one reconciliation run produces.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconReport {
    pub comparison: ComparisonTable,
    /// Rows whose status is not `OK`, same column order and sort.
    pub diffs: ComparisonTable,
    /// Count per observed status.
    pub summary: BTreeMap<Status, usize>,
    /// Keys that appeared on more than one raw row, per source, in
    /// first-encountered order.
    pub duplicates_a: Vec<String>,
    pub duplicates_b: Vec<String>,
}

impl ReconReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates_a.is_empty() || !self.duplicates_b.is_empty()
    }
}
