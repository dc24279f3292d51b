use std::path::PathBuf;

use thiserror::Error;

/// Convenience result type for catalog and loading operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Error type returned by scanning, parsing and loading functions.
///
/// The variants fall into three groups:
///
/// - file-inaccessible: [`LoaderError::Inaccessible`], [`LoaderError::Io`]
/// - parse-failure: [`LoaderError::Csv`], [`LoaderError::Json`], `LoaderError::Excel`,
///   [`LoaderError::SchemaMismatch`], [`LoaderError::ParseError`]
/// - precondition-violation: [`LoaderError::NoDatabase`], [`LoaderError::InvalidTableName`]
///
/// Database failures surface as [`LoaderError::Sqlite`].
#[derive(Debug, Error)]
pub enum LoaderError {
    /// A cataloged file could not be opened or read (e.g. permission denied, locked by
    /// another program).
    #[error("file {} inaccessible: {source}. Close the file and rerun the program", .path.display())]
    Inaccessible {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Underlying I/O error not tied to a cataloged file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "excel")]
    /// Spreadsheet parsing error (feature-gated behind `excel`).
    #[error("excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// CSV parsing error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// SQLite error while creating or writing a table.
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The input does not have a usable tabular shape (no header, ragged rows, etc.).
    #[error("schema mismatch: {message}")]
    SchemaMismatch { message: String },

    /// A value could not be converted into its column's inferred type.
    #[error("failed to parse value at row {row} column '{column}': {message} (raw='{raw}')")]
    ParseError {
        row: usize,
        column: String,
        raw: String,
        message: String,
    },

    /// Sanitizing the file name left nothing to use as a table name.
    #[error("file '{file}' does not yield a usable table name")]
    InvalidTableName { file: String },

    /// A single-file update was requested before any database was created.
    #[error("no database available to update; call FileLoader::load_all first")]
    NoDatabase,
}

impl LoaderError {
    pub(crate) fn inaccessible(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Inaccessible {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(message: impl Into<String>) -> Self {
        Self::SchemaMismatch {
            message: message.into(),
        }
    }
}
