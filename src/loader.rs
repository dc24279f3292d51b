//! Loading session: turn a [`Catalog`] into one SQLite table per file.
//!
//! A [`FileLoader`] owns its catalog and remembers which database it last loaded into, so
//! that single files can be refreshed later with [`FileLoader::update_one`].
//!
//! Batch loads use partial-failure semantics: a file that cannot be parsed or written is
//! logged, reported to the configured [`LoadObserver`] and recorded in the [`LoadReport`],
//! and the remaining files are still loaded.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusqlite::Connection;
use tracing::{info, warn};

use crate::catalog::{Catalog, DetectionOptions, FileRecord, ScanReport};
use crate::error::{LoaderError, LoaderResult};
use crate::ingestion::{
    IngestionFormat, IngestionOptions, LoadContext, LoadObserver, LoadSeverity, LoadStats, ingest_from_path,
};
use crate::store;

/// Database file name used by the command-line tool when none is given.
pub const DEFAULT_DATABASE: &str = "old_files.db";

/// Options for a loading session.
///
/// Use [`Default`] for common cases.
#[derive(Clone)]
pub struct LoaderOptions {
    /// Parser options (format override, worksheet choice).
    pub ingestion: IngestionOptions,
    /// Encoding detection options used when cataloging files.
    pub detection: DetectionOptions,
    /// Optional observer for per-file outcomes.
    pub observer: Option<Arc<dyn LoadObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: LoadSeverity,
}

impl fmt::Debug for LoaderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderOptions")
            .field("ingestion", &self.ingestion)
            .field("detection", &self.detection)
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            ingestion: IngestionOptions::default(),
            detection: DetectionOptions::default(),
            observer: None,
            alert_at_or_above: LoadSeverity::Critical,
        }
    }
}

/// A file that was written to the database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    /// Cataloged file name.
    pub file: String,
    /// Table the file was written to.
    pub table: String,
    /// Number of rows written.
    pub rows: usize,
}

/// A file that could not be loaded.
#[derive(Debug)]
pub struct LoadFailure {
    /// Cataloged file name.
    pub file: String,
    /// What went wrong.
    pub error: LoaderError,
}

/// Outcome of [`FileLoader::load_all`].
#[derive(Debug, Default)]
pub struct LoadReport {
    /// Files written, in catalog order.
    pub loaded: Vec<LoadedTable>,
    /// Files skipped because of an error.
    pub failures: Vec<LoadFailure>,
}

impl LoadReport {
    /// `true` if every cataloged file was loaded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Total rows written across all tables.
    pub fn total_rows(&self) -> usize {
        self.loaded.iter().map(|t| t.rows).sum()
    }
}

/// Derive a table name from a file name.
///
/// The final extension is stripped, then every character that is neither alphanumeric nor
/// whitespace is removed: `"sales-2023 (final).csv"` becomes `"sales2023 final"`.
pub fn sanitize_table_name(file_name: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c'))
        .collect()
}

/// A loading session over one catalog.
#[derive(Debug)]
pub struct FileLoader {
    catalog: Catalog,
    options: LoaderOptions,
    database: Option<PathBuf>,
    last_scan: ScanReport,
}

impl FileLoader {
    /// Create a session by scanning `directory`.
    ///
    /// Files that cannot be cataloged are logged and available from
    /// [`FileLoader::last_scan`]; only an unreadable `directory` is an error.
    pub fn new(directory: impl AsRef<Path>, options: LoaderOptions) -> LoaderResult<Self> {
        let (catalog, last_scan) = Catalog::scan(directory, &options.detection)?;
        Ok(Self {
            catalog,
            options,
            database: None,
            last_scan,
        })
    }

    /// Create a session from an already scanned catalog.
    pub fn with_catalog(catalog: Catalog, options: LoaderOptions) -> Self {
        Self {
            catalog,
            options,
            database: None,
            last_scan: ScanReport::default(),
        }
    }

    /// The session's catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Give up the session and keep its catalog.
    pub fn into_catalog(self) -> Catalog {
        self.catalog
    }

    /// Report of the most recent directory scan.
    pub fn last_scan(&self) -> &ScanReport {
        &self.last_scan
    }

    /// Database the last [`FileLoader::load_all`] wrote to, if any.
    pub fn database(&self) -> Option<&Path> {
        self.database.as_deref()
    }

    /// Scan another directory into the session's catalog.
    pub fn add_files(&mut self, directory: impl AsRef<Path>) -> LoaderResult<&ScanReport> {
        self.last_scan = self.catalog.add_files(directory, &self.options.detection)?;
        Ok(&self.last_scan)
    }

    /// Sum of cataloged file sizes, in bytes.
    pub fn total_transfer_size(&self) -> u64 {
        let size = self.catalog.total_transfer_size();
        info!("Total transfer size: {size} bytes.");
        size
    }

    /// Load every cataloged file into `database`, one table per file.
    ///
    /// Tables are replaced, never appended to, so re-running on an unchanged directory
    /// produces identical tables. Only failing to open or close the database is an error;
    /// per-file failures are collected in the returned [`LoadReport`].
    pub fn load_all(&mut self, database: impl AsRef<Path>) -> LoaderResult<LoadReport> {
        let database = database.as_ref();
        info!(database = %database.display(), "initializing database");
        let mut conn = store::open(database)?;

        let mut report = LoadReport::default();
        for (file, record) in &self.catalog {
            info!(file = %file, "adding file to database");
            match load_file(&mut conn, file, record, &self.options) {
                Ok(loaded) => {
                    info!(file = %file, table = %loaded.table, rows = loaded.rows, "file added");
                    report.loaded.push(loaded);
                }
                Err(error) => {
                    warn!(file = %file, %error, "error processing file; skipped");
                    report.failures.push(LoadFailure {
                        file: file.clone(),
                        error,
                    });
                }
            }
        }

        store::close(conn)?;
        self.database = Some(database.to_path_buf());
        info!(
            loaded = report.loaded.len(),
            failed = report.failures.len(),
            "database connection closed"
        );
        Ok(report)
    }

    /// Re-catalog one file and replace its table in the current database.
    ///
    /// Fails with [`LoaderError::NoDatabase`] if [`FileLoader::load_all`] has not run yet.
    pub fn update_one(&mut self, path: impl AsRef<Path>) -> LoaderResult<LoadedTable> {
        let database = self.database.clone().ok_or(LoaderError::NoDatabase)?;
        let path = path.as_ref();
        let file = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| LoaderError::InvalidTableName {
                file: path.display().to_string(),
            })?;

        let record = FileRecord::inspect(path, &self.options.detection)?;
        self.catalog.insert(file.clone(), record.clone());

        info!(file = %file, database = %database.display(), "updating database");
        let mut conn = store::open(&database)?;
        let result = load_file(&mut conn, &file, &record, &self.options);
        store::close(conn)?;
        info!("database connection closed");
        result
    }
}

fn load_file(
    conn: &mut Connection,
    file: &str,
    record: &FileRecord,
    options: &LoaderOptions,
) -> LoaderResult<LoadedTable> {
    let table = sanitize_table_name(file);
    let ctx = LoadContext {
        path: record.path.clone(),
        table: table.clone(),
        format: options
            .ingestion
            .format
            .unwrap_or_else(|| IngestionFormat::from_path(&record.path)),
    };

    let result = parse_and_write(conn, file, &table, record, options);

    if let Some(obs) = options.observer.as_ref() {
        match &result {
            Ok(rows) => obs.on_success(&ctx, LoadStats { rows: *rows }),
            Err(e) => {
                let sev = LoadSeverity::for_error(e);
                obs.on_failure(&ctx, sev, e);
                if sev >= options.alert_at_or_above {
                    obs.on_alert(&ctx, sev, e);
                }
            }
        }
    }

    let rows = result?;
    Ok(LoadedTable {
        file: file.to_string(),
        table,
        rows,
    })
}

fn parse_and_write(
    conn: &mut Connection,
    file: &str,
    table: &str,
    record: &FileRecord,
    options: &LoaderOptions,
) -> LoaderResult<usize> {
    if table.is_empty() {
        return Err(LoaderError::InvalidTableName { file: file.to_string() });
    }
    let dataset = ingest_from_path(&record.path, &record.encoding, &options.ingestion)?;
    store::write_table(conn, table, &dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_extension_and_punctuation() {
        assert_eq!(sanitize_table_name("a.csv"), "a");
        assert_eq!(sanitize_table_name("sales-2023 (final).csv"), "sales2023 final");
        assert_eq!(sanitize_table_name("archive.tar.gz"), "archivetar");
        assert_eq!(sanitize_table_name("Café_menü.xlsx"), "Cafémenü");
        assert_eq!(sanitize_table_name("README"), "README");
        assert_eq!(sanitize_table_name("---.json"), "");
    }

    #[test]
    fn update_before_load_is_a_precondition_error() {
        let mut loader = FileLoader::with_catalog(Catalog::new(), LoaderOptions::default());
        let err = loader.update_one("whatever.csv").unwrap_err();
        assert!(matches!(err, LoaderError::NoDatabase));
        assert!(loader.database().is_none());
    }

    #[test]
    fn report_totals() {
        let report = LoadReport {
            loaded: vec![
                LoadedTable {
                    file: "a.csv".to_string(),
                    table: "a".to_string(),
                    rows: 2,
                },
                LoadedTable {
                    file: "b.json".to_string(),
                    table: "b".to_string(),
                    rows: 3,
                },
            ],
            failures: vec![],
        };
        assert!(report.is_complete());
        assert_eq!(report.total_rows(), 5);
    }
}
