//! JSON ingestion implementation.
//!
//! Supported inputs:
//! - A JSON array of objects (records): `[{"a":1}, {"a":2}]`
//! - An object of columns keyed by row label: `{"a": {"0": 1, "1": 2}}`
//! - An object of column arrays: `{"a": [1, 2]}`
//! - A single object, treated as one record: `{"a": 1}`
//! - Newline-delimited JSON (NDJSON): `{"a":1}\n{"a":2}\n`
//!
//! Column order follows first appearance in the file. Nested objects and arrays are stored
//! as their JSON text.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use crate::catalog::decode_text;
use crate::error::{LoaderError, LoaderResult};
use crate::types::{DataSet, Value};

use super::infer::unify_columns;

/// Ingest a JSON file into an in-memory [`DataSet`], decoding it with `encoding`.
pub fn ingest_json_from_path(path: impl AsRef<Path>, encoding: &str) -> LoaderResult<DataSet> {
    let bytes = fs::read(path)?;
    let text = decode_text(&bytes, encoding);
    ingest_json_from_str(&text)
}

/// Ingest JSON from an in-memory string into a [`DataSet`].
pub fn ingest_json_from_str(input: &str) -> LoaderResult<DataSet> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(LoaderError::schema("json input is empty"));
    }

    // First try parsing as a single JSON value (array or object).
    match serde_json::from_str::<JsonValue>(trimmed) {
        Ok(JsonValue::Array(items)) => ingest_records(&items),
        Ok(JsonValue::Object(map)) => ingest_object(map),
        Ok(_) => Err(LoaderError::schema(
            "json must be an object, an array of objects, or NDJSON",
        )),
        // NDJSON only if the first line is a complete object on its own.
        Err(err) if !starts_with_json_object_line(trimmed) => Err(err.into()),
        Err(_) => {
            // Fall back to NDJSON.
            let mut values = Vec::new();
            for (i, line) in trimmed.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let v = serde_json::from_str::<JsonValue>(line).map_err(|e| {
                    LoaderError::schema(format!("invalid ndjson at line {}: {}", i + 1, e))
                })?;
                values.push(v);
            }
            ingest_records(&values)
        }
    }
}

fn starts_with_json_object_line(input: &str) -> bool {
    input
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .is_some_and(|line| matches!(serde_json::from_str::<JsonValue>(line), Ok(JsonValue::Object(_))))
}

#[derive(Default)]
struct ColumnIndex {
    names: Vec<String>,
    positions: HashMap<String, usize>,
}

impl ColumnIndex {
    fn position(&mut self, name: &str) -> usize {
        if let Some(&idx) = self.positions.get(name) {
            return idx;
        }
        let idx = self.names.len();
        self.names.push(name.to_string());
        self.positions.insert(name.to_string(), idx);
        idx
    }
}

fn ingest_records(values: &[JsonValue]) -> LoaderResult<DataSet> {
    let mut columns = ColumnIndex::default();
    let mut rows: Vec<Vec<Value>> = Vec::with_capacity(values.len());

    for (idx0, v) in values.iter().enumerate() {
        let row_num = idx0 + 1;
        let obj = v
            .as_object()
            .ok_or_else(|| LoaderError::schema(format!("row {row_num} is not a json object")))?;

        let mut row: Vec<Value> = vec![Value::Null; columns.names.len()];
        for (key, jv) in obj {
            let idx = columns.position(key);
            if idx >= row.len() {
                row.resize(idx + 1, Value::Null);
            }
            row[idx] = convert_json_value(jv);
        }
        rows.push(row);
    }

    Ok(unify_columns(columns.names, rows))
}

fn ingest_object(map: Map<String, JsonValue>) -> LoaderResult<DataSet> {
    if !map.is_empty() && map.values().all(JsonValue::is_object) {
        return Ok(ingest_labeled_columns(map));
    }
    if !map.is_empty() && map.values().all(JsonValue::is_array) {
        return Ok(ingest_array_columns(map));
    }
    ingest_records(&[JsonValue::Object(map)])
}

/// `{"col": {"row label": value}}`: one row per distinct label, in first-seen order.
fn ingest_labeled_columns(map: Map<String, JsonValue>) -> DataSet {
    let mut labels = ColumnIndex::default();
    let width = map.len();
    let mut names = Vec::with_capacity(width);
    let mut rows: Vec<Vec<Value>> = Vec::new();

    for (col_idx, (name, column)) in map.into_iter().enumerate() {
        names.push(name);
        let JsonValue::Object(cells) = column else {
            continue;
        };
        for (label, jv) in &cells {
            let row_idx = labels.position(label);
            if row_idx >= rows.len() {
                rows.resize_with(row_idx + 1, || vec![Value::Null; width]);
            }
            rows[row_idx][col_idx] = convert_json_value(jv);
        }
    }

    unify_columns(names, rows)
}

/// `{"col": [v0, v1, ...]}`: row `i` takes element `i` of each column.
fn ingest_array_columns(map: Map<String, JsonValue>) -> DataSet {
    let width = map.len();
    let mut names = Vec::with_capacity(width);
    let mut rows: Vec<Vec<Value>> = Vec::new();

    for (col_idx, (name, column)) in map.into_iter().enumerate() {
        names.push(name);
        let JsonValue::Array(cells) = column else {
            continue;
        };
        for (row_idx, jv) in cells.iter().enumerate() {
            if row_idx >= rows.len() {
                rows.resize_with(row_idx + 1, || vec![Value::Null; width]);
            }
            rows[row_idx][col_idx] = convert_json_value(jv);
        }
    }

    unify_columns(names, rows)
}

fn convert_json_value(v: &JsonValue) -> Value {
    match v {
        JsonValue::Null => Value::Null,
        JsonValue::Bool(b) => Value::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int64(i)
            } else {
                // u64 beyond i64::MAX, or a real number.
                n.as_f64().map(Value::Float64).unwrap_or(Value::Null)
            }
        }
        JsonValue::String(s) => Value::Utf8(s.clone()),
        JsonValue::Array(_) | JsonValue::Object(_) => Value::Utf8(v.to_string()),
    }
}
