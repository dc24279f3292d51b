#![cfg(feature = "excel")]

use std::path::Path;

use calamine::{Data, DataType as _, Reader, open_workbook_auto};

use crate::error::{LoaderError, LoaderResult};
use crate::types::{DataSet, Value};

use super::infer::{normalize_headers, unify_columns};

/// Text layout for date and datetime cells.
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest magnitude at which an integral float still converts exactly to `i64`.
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

/// Ingest a spreadsheet (`.xlsx`, `.xls`, `.ods`, etc.) into an in-memory `DataSet`.
///
/// Behavior:
/// - Picks `sheet_name` if provided; otherwise uses the first sheet in the workbook
/// - Detects the first non-empty row as the header row
/// - Reads remaining rows, skipping rows with no values, and infers column types
pub fn ingest_excel_from_path(path: impl AsRef<Path>, sheet_name: Option<&str>) -> LoaderResult<DataSet> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet = match sheet_name {
        Some(name) => name.to_string(),
        None => workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| LoaderError::schema("workbook has no sheets"))?,
    };

    let range = workbook.worksheet_range(&sheet)?;
    ingest_sheet_range(&sheet, &range)
}

fn ingest_sheet_range(sheet: &str, range: &calamine::Range<Data>) -> LoaderResult<DataSet> {
    let header_row_idx = range
        .rows()
        .position(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .ok_or_else(|| {
            LoaderError::schema(format!("sheet '{sheet}': no non-empty rows (no header row found)"))
        })?;

    let mut rows_iter = range.rows().skip(header_row_idx);
    let header_cells: Vec<String> = rows_iter
        .next()
        .map(|row| row.iter().map(cell_to_header_string).collect())
        .unwrap_or_default();
    let names = normalize_headers(header_cells);

    let rows: Vec<Vec<Value>> = rows_iter
        .filter(|row| row.iter().any(|c| !matches!(c, Data::Empty)))
        .map(|row| row.iter().take(names.len()).map(cell_value).collect())
        .collect();

    Ok(unify_columns(names, rows))
}

fn cell_to_header_string(c: &Data) -> String {
    match c {
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => {
            if f.fract() == 0.0 {
                (*f as i64).to_string()
            } else {
                f.to_string()
            }
        }
        Data::Bool(b) => b.to_string(),
        Data::DateTime(f) => f.to_string(),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
        Data::Empty => "".to_string(),
    }
}

/// Convert a cell into a loosely typed value; integral floats become integers.
fn cell_value(c: &Data) -> Value {
    match c {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::String(s) if s.trim().is_empty() => Value::Null,
        Data::String(s) => Value::Utf8(s.clone()),
        Data::Int(i) => Value::Int64(*i),
        Data::Float(f) if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT => Value::Int64(*f as i64),
        Data::Float(f) => Value::Float64(*f),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) | Data::DateTimeIso(_) => Value::Utf8(
            c.as_datetime()
                .map(|dt| dt.format(DATETIME_FORMAT).to_string())
                .unwrap_or_else(|| c.to_string()),
        ),
        Data::DurationIso(_) => Value::Utf8(c.to_string()),
    }
}
