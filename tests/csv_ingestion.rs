use std::fs;

use tabload::ingestion::csv::{ingest_csv_from_path, ingest_csv_from_reader, ingest_csv_from_str};
use tabload::types::{DataType, Value};

#[test]
fn ingest_csv_infers_column_types() {
    let input = "id,name,score,active\n1,Ada,98.5,true\n2,Grace,87.25,False\n";
    let ds = ingest_csv_from_str(input).unwrap();

    assert_eq!(ds.row_count(), 2);
    let types: Vec<DataType> = ds.schema.fields.iter().map(|f| f.data_type).collect();
    assert_eq!(
        types,
        vec![DataType::Int64, DataType::Utf8, DataType::Float64, DataType::Bool]
    );
    assert_eq!(
        ds.rows[0],
        vec![
            Value::Int64(1),
            Value::Utf8("Ada".to_string()),
            Value::Float64(98.5),
            Value::Bool(true),
        ]
    );
    assert_eq!(ds.rows[1][3], Value::Bool(false));
}

#[test]
fn ingest_csv_maps_na_tokens_to_null() {
    let input = "id,score\n1,NA\n,2.5\n3,\n";
    let ds = ingest_csv_from_str(input).unwrap();

    assert_eq!(ds.schema.fields[0].data_type, DataType::Int64);
    assert_eq!(ds.schema.fields[1].data_type, DataType::Float64);
    assert_eq!(ds.rows[0][1], Value::Null);
    assert_eq!(ds.rows[1][0], Value::Null);
    assert_eq!(ds.rows[2][1], Value::Null);
}

#[test]
fn ingest_csv_mixed_column_keeps_original_text() {
    let input = "code\n007\nA12\n";
    let ds = ingest_csv_from_str(input).unwrap();
    assert_eq!(ds.schema.fields[0].data_type, DataType::Utf8);
    assert_eq!(ds.rows[0][0], Value::Utf8("007".to_string()));
}

#[test]
fn ingest_csv_keeps_whitespace_in_text_cells() {
    let input = "name,code,n\n  Ada  , x1 , 3 \n NA ,y2,4\n";
    let ds = ingest_csv_from_str(input).unwrap();

    assert_eq!(ds.rows[0][0], Value::Utf8("  Ada  ".to_string()));
    assert_eq!(ds.rows[0][1], Value::Utf8(" x1 ".to_string()));
    // Padded tokens are text, not missing values.
    assert_eq!(ds.rows[1][0], Value::Utf8(" NA ".to_string()));
    assert_eq!(ds.schema.fields[2].data_type, DataType::Int64);
    assert_eq!(ds.rows[0][2], Value::Int64(3));
}

#[test]
fn ingest_csv_renames_blank_and_duplicate_headers() {
    let input = "id,,id\n1,2,3\n";
    let ds = ingest_csv_from_str(input).unwrap();
    let names: Vec<&str> = ds.schema.field_names().collect();
    assert_eq!(names, vec!["id", "Unnamed: 1", "id.1"]);
}

#[test]
fn ingest_csv_pads_short_rows() {
    let input = "a,b,c\n1,2\n";
    let ds = ingest_csv_from_str(input).unwrap();
    assert_eq!(ds.rows[0], vec![Value::Int64(1), Value::Int64(2), Value::Null]);
}

#[test]
fn ingest_csv_errors_on_too_many_fields() {
    let input = "a,b\n1,2\n1,2,3\n";
    let err = ingest_csv_from_str(input).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("schema mismatch"));
    assert!(msg.contains("row 3 has 3 fields"));
}

#[test]
fn ingest_csv_errors_on_empty_input() {
    let err = ingest_csv_from_str("").unwrap_err();
    assert!(err.to_string().contains("no columns"));
}

#[test]
fn ingest_csv_from_reader_with_custom_delimiter() {
    let input = "id;name\n1;Ada\n";
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b';')
        .from_reader(input.as_bytes());

    let ds = ingest_csv_from_reader(&mut rdr).unwrap();
    assert_eq!(ds.row_count(), 1);
    assert_eq!(ds.rows[0][1], Value::Utf8("Ada".to_string()));
}

#[test]
fn ingest_csv_from_path_decodes_latin1() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("menu.csv");
    fs::write(&path, b"item,price\ncaf\xe9,2.5\n").unwrap();

    let ds = ingest_csv_from_path(&path, "latin-1").unwrap();
    assert_eq!(ds.rows[0][0], Value::Utf8("café".to_string()));
    assert_eq!(ds.rows[0][1], Value::Float64(2.5));
}

#[test]
fn ingest_csv_from_missing_path_is_io_error() {
    let err = ingest_csv_from_path("tests/does_not_exist.csv", "utf-8").unwrap_err();
    assert!(err.to_string().contains("io error"));
}
