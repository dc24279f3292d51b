//! Command-line interface for tabload
//!
//! ```bash
//! # Load every file in ./data into old_files.db
//! tabload ./data
//!
//! # Show the catalog, load into a named database, then refresh one file
//! tabload ./data --info --database archive.db --update ./data/sales.csv
//!
//! # Print the catalog as JSON without loading anything
//! tabload ./data --json
//! ```
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tabload::ingestion::{CompositeObserver, FileObserver, IngestionOptions, LoadObserver, SheetSelection, TracingObserver};
use tabload::loader::{DEFAULT_DATABASE, FileLoader, LoaderOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tabload")]
#[command(about = "Load a directory of CSV, JSON and Excel files into an SQLite database")]
#[command(long_about = None)]
struct Cli {
    /// Directory containing the files to load
    #[arg(env = "TABLOAD_DIR")]
    directory: PathBuf,

    /// SQLite database file to write tables into
    #[arg(long, env = "TABLOAD_DATABASE", default_value = DEFAULT_DATABASE)]
    database: PathBuf,

    /// Re-load this file into the database after the full load
    #[arg(long, value_name = "FILE")]
    update: Option<PathBuf>,

    /// Print the catalog (path, size, encoding) before loading
    #[arg(long)]
    info: bool,

    /// Print the catalog as JSON and exit without loading
    #[arg(long, conflicts_with_all = ["info", "update"])]
    json: bool,

    /// Worksheet to read from spreadsheet files (defaults to the first sheet)
    #[arg(long, env = "TABLOAD_SHEET")]
    sheet: Option<String>,

    /// Append per-file load events to this file
    #[arg(long, value_name = "PATH", env = "TABLOAD_LOG_FILE")]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn loader_options(&self) -> LoaderOptions {
        let mut observers: Vec<Arc<dyn LoadObserver>> = vec![Arc::new(TracingObserver)];
        if let Some(path) = &self.log_file {
            observers.push(Arc::new(FileObserver::new(path)));
        }

        LoaderOptions {
            ingestion: IngestionOptions {
                sheet: self
                    .sheet
                    .clone()
                    .map(SheetSelection::Named)
                    .unwrap_or_default(),
                ..Default::default()
            },
            observer: Some(Arc::new(CompositeObserver::new(observers))),
            ..Default::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut loader = FileLoader::new(&cli.directory, cli.loader_options())
        .with_context(|| format!("Failed to scan directory: {}", cli.directory.display()))?;
    for failure in &loader.last_scan().failures {
        eprintln!("Could not catalog {}: {}", failure.path.display(), failure.error);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(loader.catalog())?);
        return Ok(());
    }
    if cli.info {
        print!("{}", loader.catalog());
    }

    let report = loader
        .load_all(&cli.database)
        .with_context(|| format!("Failed to load into database: {}", cli.database.display()))?;
    for table in &report.loaded {
        println!("Added {} as table {} ({} rows)", table.file, table.table, table.rows);
    }
    for failure in &report.failures {
        eprintln!("Error processing {}: {}", failure.file, failure.error);
    }

    if let Some(file) = &cli.update {
        let table = loader
            .update_one(file)
            .with_context(|| format!("Failed to update table for: {}", file.display()))?;
        println!("Updated table {} ({} rows)", table.table, table.rows);
    }

    println!("Total transfer size: {} bytes.", loader.total_transfer_size());
    Ok(())
}
