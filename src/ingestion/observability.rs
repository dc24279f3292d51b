use std::error::Error as StdError;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, error, warn};

use crate::error::LoaderError;

use super::unified::IngestionFormat;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LoadSeverity {
    /// Informational event.
    Info,
    /// Warning-level event (non-fatal).
    Warning,
    /// Error-level event (the file was not loaded).
    Error,
    /// Critical error (I/O, inaccessible files, database failures).
    Critical,
}

impl LoadSeverity {
    /// Classify a loading error.
    pub fn for_error(e: &LoaderError) -> Self {
        match e {
            LoaderError::Inaccessible { .. } | LoaderError::Io(_) | LoaderError::Sqlite(_) => Self::Critical,
            LoaderError::Csv(err) => match err.kind() {
                ::csv::ErrorKind::Io(_) => Self::Critical,
                _ => Self::Error,
            },
            #[cfg(feature = "excel")]
            LoaderError::Excel(err) => {
                if error_chain_contains_io(err) {
                    Self::Critical
                } else {
                    Self::Error
                }
            }
            LoaderError::Json(err) if err.is_io() => Self::Critical,
            LoaderError::Json(_)
            | LoaderError::SchemaMismatch { .. }
            | LoaderError::ParseError { .. }
            | LoaderError::InvalidTableName { .. }
            | LoaderError::NoDatabase => Self::Error,
        }
    }
}

#[cfg_attr(not(feature = "excel"), allow(dead_code))]
fn error_chain_contains_io(e: &(dyn StdError + 'static)) -> bool {
    let mut cur: Option<&(dyn StdError + 'static)> = Some(e);
    while let Some(err) = cur {
        if err.is::<std::io::Error>() {
            return true;
        }
        cur = err.source();
    }
    false
}

/// Context about one file being loaded.
#[derive(Debug, Clone)]
pub struct LoadContext {
    /// The file being loaded.
    pub path: PathBuf,
    /// Destination table name.
    pub table: String,
    /// Format used for parsing.
    pub format: IngestionFormat,
}

/// Minimal stats reported on a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadStats {
    /// Number of rows written to the table.
    pub rows: usize,
}

/// Observer interface for per-file load outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts.
pub trait LoadObserver: Send + Sync {
    /// Called when a file was loaded into its table.
    fn on_success(&self, _ctx: &LoadContext, _stats: LoadStats) {}

    /// Called when a file could not be loaded.
    fn on_failure(&self, _ctx: &LoadContext, _severity: LoadSeverity, _error: &LoaderError) {}

    /// Called when a failure meets the alert threshold.
    ///
    /// Default behavior forwards to [`Self::on_failure`].
    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoaderError) {
        self.on_failure(ctx, severity, error)
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn LoadObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn LoadObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl LoadObserver for CompositeObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        for o in &self.observers {
            o.on_success(ctx, stats);
        }
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoaderError) {
        for o in &self.observers {
            o.on_failure(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoaderError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Emits load events as `tracing` events.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl LoadObserver for TracingObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        debug!(
            format = ?ctx.format,
            path = %ctx.path.display(),
            table = %ctx.table,
            rows = stats.rows,
            "load ok"
        );
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoaderError) {
        warn!(
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            table = %ctx.table,
            %error,
            "load failed"
        );
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoaderError) {
        error!(
            ?severity,
            format = ?ctx.format,
            path = %ctx.path.display(),
            table = %ctx.table,
            %error,
            "ALERT: load failed"
        );
    }
}

/// Appends load events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl LoadObserver for FileObserver {
    fn on_success(&self, ctx: &LoadContext, stats: LoadStats) {
        self.append_line(&format!(
            "{} ok format={:?} path={} table={} rows={}",
            unix_ts(),
            ctx.format,
            ctx.path.display(),
            ctx.table,
            stats.rows
        ));
    }

    fn on_failure(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoaderError) {
        self.append_line(&format!(
            "{} fail severity={:?} format={:?} path={} table={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            ctx.table,
            error
        ));
    }

    fn on_alert(&self, ctx: &LoadContext, severity: LoadSeverity, error: &LoaderError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} format={:?} path={} table={} err={}",
            unix_ts(),
            severity,
            ctx.format,
            ctx.path.display(),
            ctx.table,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
