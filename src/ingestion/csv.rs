//! CSV ingestion implementation.

use std::fs;
use std::path::Path;

use crate::catalog::decode_text;
use crate::error::{LoaderError, LoaderResult};
use crate::types::{DataSet, DataType, Field, Schema, Value};

use super::infer::{infer_text_type, is_na, normalize_headers};

/// Ingest a CSV file into an in-memory [`DataSet`], decoding it with `encoding`.
///
/// Rules:
///
/// - The first row is the header.
/// - Column types are inferred from the data.
/// - Rows shorter than the header are padded with nulls; longer rows are an error.
pub fn ingest_csv_from_path(path: impl AsRef<Path>, encoding: &str) -> LoaderResult<DataSet> {
    let bytes = fs::read(path)?;
    let text = decode_text(&bytes, encoding);
    ingest_csv_from_str(&text)
}

/// Ingest CSV from an in-memory string.
pub fn ingest_csv_from_str(input: &str) -> LoaderResult<DataSet> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(input.as_bytes());
    ingest_csv_from_reader(&mut rdr)
}

/// Ingest CSV data from an existing CSV reader.
///
/// The reader should be configured with `has_headers(true)`; use `flexible(true)` to allow
/// short rows.
pub fn ingest_csv_from_reader<R: std::io::Read>(rdr: &mut csv::Reader<R>) -> LoaderResult<DataSet> {
    let headers = rdr.headers()?.clone();
    if headers.is_empty() {
        return Err(LoaderError::schema("no columns to parse from csv input"));
    }
    let names = normalize_headers(headers.iter());
    let width = names.len();

    let mut raw_rows: Vec<csv::StringRecord> = Vec::new();
    for (row_idx0, result) in rdr.records().enumerate() {
        // Report 1-based row number for users; +1 again because header is row 1.
        let user_row = row_idx0 + 2;
        let record = result?;
        if record.len() > width {
            return Err(LoaderError::schema(format!(
                "row {user_row} has {} fields but the header has {width}",
                record.len()
            )));
        }
        raw_rows.push(record);
    }

    let fields: Vec<Field> = names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type = infer_text_type(raw_rows.iter().map(|r| r.get(idx).unwrap_or("")));
            Field::new(name, data_type)
        })
        .collect();

    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(raw_rows.len());
    for (row_idx0, record) in raw_rows.iter().enumerate() {
        let user_row = row_idx0 + 2;
        let mut row: Vec<Value> = Vec::with_capacity(width);
        for (idx, field) in fields.iter().enumerate() {
            let raw = record.get(idx).unwrap_or("");
            row.push(parse_typed_value(user_row, &field.name, &field.data_type, raw)?);
        }
        rows.push(row);
    }

    Ok(DataSet::new(Schema::new(fields), rows))
}

fn parse_typed_value(
    row: usize,
    column: &str,
    data_type: &DataType,
    raw: &str,
) -> LoaderResult<Value> {
    if is_na(raw) {
        return Ok(Value::Null);
    }
    // Only numeric and boolean parsing ignores surrounding whitespace.
    let trimmed = raw.trim();

    match data_type {
        DataType::Utf8 => Ok(Value::Utf8(raw.to_owned())),
        DataType::Int64 => trimmed.parse::<i64>().map(Value::Int64).map_err(|e| {
            LoaderError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message: e.to_string(),
            }
        }),
        DataType::Float64 => trimmed.parse::<f64>().map(Value::Float64).map_err(|e| {
            LoaderError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message: e.to_string(),
            }
        }),
        DataType::Bool => parse_bool(trimmed).map(Value::Bool).map_err(|message| {
            LoaderError::ParseError {
                row,
                column: column.to_owned(),
                raw: raw.to_owned(),
                message,
            }
        }),
    }
}

fn parse_bool(s: &str) -> Result<bool, String> {
    match s.to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" => Ok(false),
        _ => Err("expected bool (true/false)".to_string()),
    }
}
