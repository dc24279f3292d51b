//! Unified ingestion entrypoint.
//!
//! Most callers should use [`ingest_from_path`], which parses a file into an in-memory
//! [`crate::types::DataSet`].
//!
//! - If [`IngestionOptions::format`] is `None`, the format is inferred from the file
//!   extension: `csv` and `json`/`ndjson` select the text parsers, anything else is read as a
//!   spreadsheet.
//! - Text formats are decoded with the encoding recorded in the catalog.

use std::path::Path;

use crate::error::LoaderResult;
use crate::types::DataSet;

use super::{csv, json};

/// Supported ingestion formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestionFormat {
    /// Comma-separated values.
    Csv,
    /// JSON records, columns, or NDJSON.
    Json,
    /// Spreadsheet/workbook formats (feature-gated behind `excel`).
    Spreadsheet,
}

impl IngestionFormat {
    /// Pick a format from a file extension (case-insensitive).
    ///
    /// Unknown extensions map to [`IngestionFormat::Spreadsheet`].
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "csv" => Self::Csv,
            "json" | "ndjson" => Self::Json,
            _ => Self::Spreadsheet,
        }
    }

    /// Pick a format from a path's extension; a path without one is a spreadsheet.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        path.as_ref()
            .extension()
            .and_then(|s| s.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Spreadsheet)
    }
}

/// Which worksheet to read from a spreadsheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SheetSelection {
    /// The first sheet in the workbook.
    #[default]
    First,
    /// A sheet by name.
    Named(String),
}

/// Options controlling unified ingestion behavior.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionOptions {
    /// If `None`, infer the format from the file extension.
    pub format: Option<IngestionFormat>,
    /// Spreadsheet-specific sheet choice.
    pub sheet: SheetSelection,
}

/// Parse a file into a [`DataSet`].
///
/// `encoding` is the label recorded for the file (see [`crate::catalog::detect_encoding`]);
/// spreadsheets ignore it.
///
/// ```no_run
/// use tabload::ingestion::{ingest_from_path, IngestionOptions};
///
/// # fn main() -> Result<(), tabload::LoaderError> {
/// let ds = ingest_from_path("people.csv", "utf-8", &IngestionOptions::default())?;
/// println!("rows={}", ds.row_count());
/// # Ok(())
/// # }
/// ```
pub fn ingest_from_path(
    path: impl AsRef<Path>,
    encoding: &str,
    options: &IngestionOptions,
) -> LoaderResult<DataSet> {
    let path = path.as_ref();
    let format = options.format.unwrap_or_else(|| IngestionFormat::from_path(path));

    match format {
        IngestionFormat::Csv => csv::ingest_csv_from_path(path, encoding),
        IngestionFormat::Json => json::ingest_json_from_path(path, encoding),
        IngestionFormat::Spreadsheet => ingest_spreadsheet_dispatch(path, &options.sheet),
    }
}

fn ingest_spreadsheet_dispatch(path: &Path, sel: &SheetSelection) -> LoaderResult<DataSet> {
    // Avoid unused warnings when the feature is off.
    let _ = (path, sel);

    #[cfg(feature = "excel")]
    {
        use super::excel;

        match sel {
            SheetSelection::First => excel::ingest_excel_from_path(path, None),
            SheetSelection::Named(name) => excel::ingest_excel_from_path(path, Some(name.as_str())),
        }
    }

    #[cfg(not(feature = "excel"))]
    {
        Err(crate::error::LoaderError::schema(
            "spreadsheet ingestion not enabled (enable cargo feature 'excel')",
        ))
    }
}
