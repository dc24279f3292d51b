use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tabload::catalog::{Catalog, DetectionOptions};
use tabload::loader::{FileLoader, LoaderOptions};
use tabload::LoaderError;

fn table_names(db: &Path) -> Vec<String> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

fn row_count(db: &Path, table: &str) -> i64 {
    let conn = Connection::open(db).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM \"{table}\""), [], |row| row.get(0))
        .unwrap()
}

fn dump(db: &Path, table: &str) -> Vec<(i64, String)> {
    let conn = Connection::open(db).unwrap();
    let mut stmt = conn
        .prepare(&format!("SELECT id, name FROM \"{table}\" ORDER BY rowid"))
        .unwrap();
    stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[cfg(feature = "excel")]
#[test]
fn loads_csv_and_workbook_into_one_table_each() {
    let data = tempfile::tempdir().unwrap();
    fs::write(data.path().join("a.csv"), "id,name\n1,Ada\n2,Grace\n").unwrap();

    let mut wb = rust_xlsxwriter::Workbook::new();
    let ws = wb.add_worksheet();
    ws.write_string(0, 0, "sku").unwrap();
    ws.write_number(1, 0, 10).unwrap();
    ws.write_number(2, 0, 20).unwrap();
    ws.write_number(3, 0, 30).unwrap();
    wb.save(data.path().join("b.xlsx")).unwrap();

    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("old_files.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    assert_eq!(loader.catalog().len(), 2);

    let report = loader.load_all(&db).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.total_rows(), 5);
    assert_eq!(table_names(&db), vec!["a", "b"]);
    assert_eq!(row_count(&db, "a"), 2);
    assert_eq!(row_count(&db, "b"), 3);
    assert_eq!(loader.database(), Some(db.as_path()));
}

#[test]
fn columns_keep_inferred_sql_types() {
    let data = tempfile::tempdir().unwrap();
    fs::write(
        data.path().join("people.csv"),
        "id,name,score,active\n1,Ada,98.5,true\n2,Grace,,false\n",
    )
    .unwrap();
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    loader.load_all(&db).unwrap();

    let conn = Connection::open(&db).unwrap();
    let row: (String, String, String, String) = conn
        .query_row(
            "SELECT typeof(id), typeof(name), typeof(score), typeof(active) FROM people WHERE id = 2",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
        )
        .unwrap();
    assert_eq!(
        row,
        (
            "integer".to_string(),
            "text".to_string(),
            "null".to_string(),
            "integer".to_string()
        )
    );
}

#[test]
fn table_names_drop_punctuation() {
    let data = tempfile::tempdir().unwrap();
    fs::write(data.path().join("sales-2023 (final).csv"), "id,name\n1,x\n").unwrap();
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    let report = loader.load_all(&db).unwrap();

    assert_eq!(report.loaded[0].table, "sales2023 final");
    assert_eq!(table_names(&db), vec!["sales2023 final"]);
}

#[test]
fn reloading_an_unchanged_directory_is_idempotent() {
    let data = tempfile::tempdir().unwrap();
    fs::write(data.path().join("a.csv"), "id,name\n1,Ada\n2,Grace\n").unwrap();
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    loader.load_all(&db).unwrap();
    let first = dump(&db, "a");
    loader.load_all(&db).unwrap();
    let second = dump(&db, "a");

    assert_eq!(first, second);
    assert_eq!(
        second,
        vec![(1, "Ada".to_string()), (2, "Grace".to_string())]
    );
}

#[test]
fn bad_files_are_reported_and_the_rest_still_load() {
    let data = tempfile::tempdir().unwrap();
    fs::write(data.path().join("bad.json"), "{not json").unwrap();
    fs::write(data.path().join("good.csv"), "id,name\n1,Ada\n").unwrap();
    fs::write(data.path().join("notes.txt"), "just some text").unwrap();
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    let report = loader.load_all(&db).unwrap();

    assert!(!report.is_complete());
    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.loaded[0].table, "good");

    let failed: Vec<&str> = report.failures.iter().map(|f| f.file.as_str()).collect();
    assert_eq!(failed, vec!["bad.json", "notes.txt"]);
    assert!(matches!(report.failures[0].error, LoaderError::Json(_)));
    assert_eq!(table_names(&db), vec!["good"]);
}

#[test]
fn update_before_load_is_rejected() {
    let data = tempfile::tempdir().unwrap();
    let path = data.path().join("a.csv");
    fs::write(&path, "id,name\n1,Ada\n").unwrap();

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    let err = loader.update_one(&path).unwrap_err();
    assert!(matches!(err, LoaderError::NoDatabase));
}

#[test]
fn update_one_replaces_the_table() {
    let data = tempfile::tempdir().unwrap();
    let path = data.path().join("a.csv");
    fs::write(&path, "id,name\n1,Ada\n2,Grace\n").unwrap();
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    loader.load_all(&db).unwrap();

    fs::write(&path, "id,name\n7,Linus\n8,Ken\n9,Dennis\n").unwrap();
    let updated = loader.update_one(&path).unwrap();

    assert_eq!(updated.table, "a");
    assert_eq!(updated.rows, 3);
    assert_eq!(row_count(&db, "a"), 3);
    assert_eq!(dump(&db, "a")[0], (7, "Linus".to_string()));
    assert_eq!(loader.catalog().get("a.csv").map(|r| r.size), Some(fs::metadata(&path).unwrap().len()));
}

#[test]
fn update_one_loads_json_with_the_json_parser() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    loader.load_all(&db).unwrap();

    let path = data.path().join("people.json");
    fs::write(&path, r#"[{"id":1,"name":"Ada"},{"id":2,"name":"Grace"}]"#).unwrap();
    let updated = loader.update_one(&path).unwrap();

    assert_eq!(updated.table, "people");
    assert_eq!(dump(&db, "people"), vec![(1, "Ada".to_string()), (2, "Grace".to_string())]);
    assert_eq!(loader.catalog().len(), 1);
}

#[test]
fn loader_accepts_a_prepared_catalog() {
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    fs::write(first.path().join("a.csv"), "id\n1\n").unwrap();
    fs::write(second.path().join("b.csv"), "id\n1\n2\n").unwrap();

    let (catalog, _) = Catalog::scan(first.path(), &DetectionOptions::default()).unwrap();
    let mut loader = FileLoader::with_catalog(catalog, LoaderOptions::default());
    loader.add_files(second.path()).unwrap();
    assert_eq!(loader.total_transfer_size(), 5 + 7);

    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");
    let report = loader.load_all(&db).unwrap();
    assert_eq!(report.total_rows(), 3);
    assert_eq!(table_names(&db), vec!["a", "b"]);
}

#[test]
fn text_cells_are_stored_verbatim() {
    let data = tempfile::tempdir().unwrap();
    fs::write(data.path().join("a.csv"), "name\n  Ada  \n").unwrap();
    let out = tempfile::tempdir().unwrap();
    let db = out.path().join("out.db");

    let mut loader = FileLoader::new(data.path(), LoaderOptions::default()).unwrap();
    loader.load_all(&db).unwrap();

    let conn = Connection::open(&db).unwrap();
    let name: String = conn
        .query_row("SELECT name FROM a WHERE rowid = 1", [], |row| row.get(0))
        .unwrap();
    assert_eq!(name, "  Ada  ");
}
