//! `tabload` catalogs a directory of tabular files and loads each one into an SQLite table.
//!
//! The workflow has two steps:
//!
//! 1. **Scan**: [`catalog::Catalog::scan`] records every file's path, size and detected text
//!    encoding.
//! 2. **Load**: [`loader::FileLoader::load_all`] parses each cataloged file and writes it to
//!    a table named after the file (extension stripped, punctuation removed). Existing
//!    tables are replaced.
//!
//! ## What you can load
//!
//! **File formats (chosen by extension):**
//!
//! - **CSV**: `.csv` (first row is the header)
//! - **JSON**: `.json`, `.ndjson` (records, column objects, or newline-delimited objects)
//! - **Spreadsheets** (Cargo feature `excel`, on by default): every other extension is read
//!   as a workbook, first sheet unless configured otherwise
//!
//! Column types are inferred per column as one of [`types::DataType::Int64`],
//! [`types::DataType::Float64`], [`types::DataType::Bool`] or [`types::DataType::Utf8`].
//! Empty cells, NA tokens and JSON `null` become [`types::Value::Null`] (SQL `NULL`).
//!
//! ## Quick example
//!
//! ```no_run
//! use tabload::loader::{FileLoader, LoaderOptions};
//!
//! # fn main() -> Result<(), tabload::LoaderError> {
//! let mut loader = FileLoader::new("data/", LoaderOptions::default())?;
//! print!("{}", loader.catalog());
//!
//! let report = loader.load_all("old_files.db")?;
//! for failure in &report.failures {
//!     eprintln!("skipped {}: {}", failure.file, failure.error);
//! }
//!
//! // Later: refresh a single file's table.
//! loader.update_one("data/sales.csv")?;
//! println!("{} bytes", loader.total_transfer_size());
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`catalog`]: directory scanning, file records, encoding detection
//! - [`ingestion`]: CSV/JSON/spreadsheet parsers, type inference, load observers
//! - [`store`]: SQLite table writer
//! - [`loader`]: loading session ([`loader::FileLoader`])
//! - [`sort`]: merge, bubble and insertion sort (unrelated to loading)
//! - [`types`]: in-memory table types
//! - [`error`]: error types

pub mod catalog;
pub mod error;
pub mod ingestion;
pub mod loader;
pub mod sort;
pub mod store;
pub mod types;

pub use catalog::{Catalog, FileRecord, detect_encoding};
pub use error::{LoaderError, LoaderResult};
pub use loader::{FileLoader, LoaderOptions};
