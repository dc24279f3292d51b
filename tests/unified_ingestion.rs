use std::fs;

use tabload::ingestion::{IngestionFormat, IngestionOptions, ingest_from_path};
use tabload::types::{DataType, Value};

#[test]
fn dispatches_on_extension_case_insensitively() {
    let dir = tempfile::tempdir().unwrap();
    let csv = dir.path().join("PEOPLE.CSV");
    fs::write(&csv, "id,name\n1,Ada\n").unwrap();
    let json = dir.path().join("people.Json");
    fs::write(&json, r#"[{"id":1,"name":"Ada"}]"#).unwrap();

    let from_csv = ingest_from_path(&csv, "ascii", &IngestionOptions::default()).unwrap();
    let from_json = ingest_from_path(&json, "ascii", &IngestionOptions::default()).unwrap();

    assert_eq!(from_csv.schema, from_json.schema);
    assert_eq!(from_csv.rows, from_json.rows);
    assert_eq!(from_csv.schema.fields[0].data_type, DataType::Int64);
}

#[test]
fn format_override_wins_over_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("export.txt");
    fs::write(&path, "{\"id\":1}\n{\"id\":2}\n").unwrap();

    let opts = IngestionOptions {
        format: Some(IngestionFormat::Json),
        ..Default::default()
    };
    let ds = ingest_from_path(&path, "utf-8", &opts).unwrap();
    assert_eq!(ds.rows, vec![vec![Value::Int64(1)], vec![Value::Int64(2)]]);
}

#[test]
fn json_file_is_not_parsed_as_csv() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested.json");
    fs::write(&path, r#"[{"a":1,"b":"x,y"}]"#).unwrap();

    let ds = ingest_from_path(&path, "utf-8", &IngestionOptions::default()).unwrap();
    assert_eq!(ds.column_count(), 2);
    assert_eq!(ds.rows[0][1], Value::Utf8("x,y".to_string()));
}

#[cfg(not(feature = "excel"))]
#[test]
fn spreadsheets_need_the_excel_feature() {
    let err = ingest_from_path("book.xlsx", "utf-8", &IngestionOptions::default()).unwrap_err();
    assert!(err.to_string().contains("enable cargo feature 'excel'"));
}
