//! SQLite table writer.
//!
//! Each parsed [`DataSet`] becomes one table. Writing a table always replaces it: the old
//! table is dropped and recreated inside a single transaction, so a failed write leaves the
//! previous contents in place.

use std::path::Path;

use rusqlite::types::{ToSql, ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

use crate::error::{LoaderError, LoaderResult};
use crate::types::{DataSet, Value};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Int64(v) => ToSqlOutput::Owned(SqlValue::Integer(*v)),
            Value::Float64(v) if v.is_nan() => ToSqlOutput::Owned(SqlValue::Null),
            Value::Float64(v) => ToSqlOutput::Owned(SqlValue::Real(*v)),
            Value::Bool(v) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*v))),
            Value::Utf8(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// Open (creating if needed) the database file at `path`.
pub fn open(path: impl AsRef<Path>) -> LoaderResult<Connection> {
    let path = path.as_ref();
    debug!(database = %path.display(), "opening database");
    Ok(Connection::open(path)?)
}

/// Close a connection, surfacing any error from finalizing it.
pub fn close(conn: Connection) -> LoaderResult<()> {
    conn.close().map_err(|(_conn, err)| LoaderError::Sqlite(err))
}

/// Quote an identifier for SQLite, doubling embedded quotes.
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Create or replace table `table` with the contents of `dataset`.
///
/// Returns the number of rows written.
pub fn write_table(conn: &mut Connection, table: &str, dataset: &DataSet) -> LoaderResult<usize> {
    if dataset.column_count() == 0 {
        return Err(LoaderError::schema(format!("no columns to write for table '{table}'")));
    }

    let quoted = quote_identifier(table);
    let columns = dataset
        .schema
        .fields
        .iter()
        .map(|f| format!("{} {}", quote_identifier(&f.name), f.data_type.sql_type()))
        .collect::<Vec<_>>()
        .join(", ");
    let placeholders = vec!["?"; dataset.column_count()].join(", ");

    let tx = conn.transaction()?;
    tx.execute(&format!("DROP TABLE IF EXISTS {quoted}"), [])?;
    tx.execute(&format!("CREATE TABLE {quoted} ({columns})"), [])?;
    {
        let mut stmt = tx.prepare(&format!("INSERT INTO {quoted} VALUES ({placeholders})"))?;
        for row in &dataset.rows {
            stmt.execute(params_from_iter(row.iter()))?;
        }
    }
    tx.commit()?;

    debug!(table, rows = dataset.row_count(), "table written");
    Ok(dataset.row_count())
}
