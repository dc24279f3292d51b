//! Per-column type inference shared by the parsers.
//!
//! Text formats (CSV) infer from raw strings; structured formats (JSON, Excel) infer from
//! already-typed [`Value`]s. Either way a column ends up as the narrowest of
//! `Int64 → Float64 → Bool → Utf8` that fits every non-null cell.

use crate::types::{DataSet, DataType, Field, Schema, Value};

/// Strings treated as missing values in text input.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// `true` if `raw` is exactly a missing-value token.
pub fn is_na(raw: &str) -> bool {
    NA_TOKENS.contains(&raw)
}

/// `true` if `raw` is a boolean literal recognized during inference.
pub fn is_bool_literal(raw: &str) -> bool {
    matches!(raw, "true" | "false" | "True" | "False" | "TRUE" | "FALSE")
}

#[derive(Debug, Clone, Copy)]
struct TypeCandidates {
    seen: bool,
    int: bool,
    float: bool,
    boolean: bool,
}

impl Default for TypeCandidates {
    fn default() -> Self {
        Self {
            seen: false,
            int: true,
            float: true,
            boolean: true,
        }
    }
}

impl TypeCandidates {
    fn observe_text(&mut self, trimmed: &str) {
        self.seen = true;
        if self.int && trimmed.parse::<i64>().is_err() {
            self.int = false;
        }
        if self.float && trimmed.parse::<f64>().is_err() {
            self.float = false;
        }
        if self.boolean && !is_bool_literal(trimmed) {
            self.boolean = false;
        }
    }

    fn observe_value(&mut self, value: &Value) {
        match value {
            Value::Null => return,
            Value::Int64(_) => self.boolean = false,
            Value::Float64(_) => {
                self.int = false;
                self.boolean = false;
            }
            Value::Bool(_) => {
                self.int = false;
                self.float = false;
            }
            Value::Utf8(_) => {
                self.int = false;
                self.float = false;
                self.boolean = false;
            }
        }
        self.seen = true;
    }

    fn finish(self) -> DataType {
        if !self.seen {
            DataType::Utf8
        } else if self.int {
            DataType::Int64
        } else if self.float {
            DataType::Float64
        } else if self.boolean {
            DataType::Bool
        } else {
            DataType::Utf8
        }
    }
}

/// Infer a column type from raw text cells. Missing-value tokens are ignored.
pub fn infer_text_type<'a>(cells: impl IntoIterator<Item = &'a str>) -> DataType {
    let mut candidates = TypeCandidates::default();
    for raw in cells {
        if is_na(raw) {
            continue;
        }
        candidates.observe_text(raw.trim());
    }
    candidates.finish()
}

/// Infer a column type from typed cells. Nulls are ignored.
pub fn infer_value_type<'a>(cells: impl IntoIterator<Item = &'a Value>) -> DataType {
    let mut candidates = TypeCandidates::default();
    for value in cells {
        candidates.observe_value(value);
    }
    candidates.finish()
}

/// Convert a cell into a column's inferred type.
///
/// Integers widen to floats; anything in a text column is rendered as text.
pub fn coerce_value(value: Value, data_type: DataType) -> Value {
    match (value, data_type) {
        (Value::Null, _) => Value::Null,
        (Value::Int64(v), DataType::Float64) => Value::Float64(v as f64),
        (Value::Utf8(s), DataType::Utf8) => Value::Utf8(s),
        (v, DataType::Utf8) => Value::Utf8(v.to_string()),
        (v, _) => v,
    }
}

/// Make header names usable as distinct column names.
///
/// Blank names become `Unnamed: {index}`; repeated names get `.1`, `.2`, ... suffixes.
pub fn normalize_headers<I, S>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for (idx, raw) in headers.into_iter().enumerate() {
        let raw = raw.as_ref();
        let base = if raw.is_empty() {
            format!("Unnamed: {idx}")
        } else {
            raw.to_string()
        };

        let mut name = base.clone();
        let mut suffix = 1;
        while out.contains(&name) {
            name = format!("{base}.{suffix}");
            suffix += 1;
        }
        out.push(name);
    }
    out
}

/// Build a [`DataSet`] from column names and loosely typed rows.
///
/// Short rows are padded with nulls; each column is inferred and its cells coerced.
pub fn unify_columns(names: Vec<String>, mut rows: Vec<Vec<Value>>) -> DataSet {
    let width = names.len();
    for row in &mut rows {
        row.resize(width, Value::Null);
    }

    let types: Vec<DataType> = (0..width)
        .map(|idx| infer_value_type(rows.iter().map(|row| &row[idx])))
        .collect();

    let rows = rows
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(types.iter())
                .map(|(value, &data_type)| coerce_value(value, data_type))
                .collect()
        })
        .collect();

    let fields = names
        .into_iter()
        .zip(types)
        .map(|(name, data_type)| Field::new(name, data_type))
        .collect();

    DataSet::new(Schema::new(fields), rows)
}
