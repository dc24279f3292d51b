//! File catalog: per-file metadata discovered by scanning a directory.
//!
//! A [`Catalog`] maps file names to [`FileRecord`]s. It is owned by whoever scanned it and
//! handed explicitly to the loading step (see [`crate::loader::FileLoader`]).

pub mod encoding;

use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::error::{LoaderError, LoaderResult};

pub use encoding::{
    DetectionOptions, decode_text, detect_encoding, detect_encoding_with, detect_from_sample,
    try_candidate_encodings,
};

/// Metadata recorded for one discovered file.
///
/// Records are immutable; re-scanning or updating a file replaces its record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    /// Full path to the file.
    pub path: PathBuf,
    /// File size in bytes.
    pub size: u64,
    /// Detected text encoding label (e.g. `utf-8`, `ascii`, `windows-1252`).
    pub encoding: String,
}

impl FileRecord {
    /// Stat a file and detect its encoding.
    pub fn inspect(path: impl AsRef<Path>, options: &DetectionOptions) -> LoaderResult<Self> {
        let path = path.as_ref();
        let size = fs::metadata(path)
            .map_err(|e| LoaderError::inaccessible(path, e))?
            .len();
        let encoding = detect_encoding_with(path, options)?;
        Ok(Self {
            path: path.to_path_buf(),
            size,
            encoding,
        })
    }
}

/// A file that could not be cataloged during a scan.
#[derive(Debug)]
pub struct ScanFailure {
    /// Path of the entry that failed.
    pub path: PathBuf,
    /// Why it failed (usually [`LoaderError::Inaccessible`]).
    pub error: LoaderError,
}

/// Outcome of scanning one directory.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// File names added to (or replaced in) the catalog.
    pub cataloged: Vec<String>,
    /// Entries that could not be cataloged.
    pub failures: Vec<ScanFailure>,
}

impl ScanReport {
    /// `true` if every entry was cataloged.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Mapping from file name to [`FileRecord`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    files: BTreeMap<String, FileRecord>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Scan `directory` into a new catalog.
    ///
    /// Only the directory's immediate regular files are cataloged; subdirectories are
    /// skipped. Files that cannot be opened are reported in [`ScanReport::failures`] and the
    /// scan continues. Failing to read `directory` itself is returned as an error.
    pub fn scan(directory: impl AsRef<Path>, options: &DetectionOptions) -> LoaderResult<(Self, ScanReport)> {
        let mut catalog = Self::new();
        let report = catalog.add_files(directory, options)?;
        Ok((catalog, report))
    }

    /// Scan another directory into this catalog, replacing entries with the same file name.
    pub fn add_files(&mut self, directory: impl AsRef<Path>, options: &DetectionOptions) -> LoaderResult<ScanReport> {
        let directory = directory.as_ref();
        let mut report = ScanReport::default();

        let metadata = fs::metadata(directory).map_err(|e| LoaderError::inaccessible(directory, e))?;
        if !metadata.is_dir() {
            return Err(LoaderError::inaccessible(
                directory,
                io::Error::new(io::ErrorKind::NotADirectory, "not a directory"),
            ));
        }

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) if err.depth() == 0 => {
                    return Err(LoaderError::inaccessible(directory, err.into()));
                }
                Err(err) => {
                    let path = err.path().map(Path::to_path_buf).unwrap_or_else(|| directory.to_path_buf());
                    warn!(path = %path.display(), error = %err, "skipping unreadable directory entry");
                    report.failures.push(ScanFailure {
                        error: LoaderError::inaccessible(&path, err.into()),
                        path,
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                debug!(path = %entry.path().display(), "skipping subdirectory");
                continue;
            }
            if !entry.file_type().is_file() {
                debug!(path = %entry.path().display(), "skipping special file");
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            match FileRecord::inspect(entry.path(), options) {
                Ok(record) => {
                    self.files.insert(name.clone(), record);
                    report.cataloged.push(name);
                }
                Err(error) => {
                    warn!(file = %name, %error, "could not catalog file");
                    report.failures.push(ScanFailure {
                        path: entry.path().to_path_buf(),
                        error,
                    });
                }
            }
        }

        info!(
            directory = %directory.display(),
            cataloged = report.cataloged.len(),
            failed = report.failures.len(),
            "directory scanned"
        );
        Ok(report)
    }

    /// Insert or replace a record, returning the previous record for `name`.
    pub fn insert(&mut self, name: impl Into<String>, record: FileRecord) -> Option<FileRecord> {
        self.files.insert(name.into(), record)
    }

    /// Look up a record by file name.
    pub fn get(&self, name: &str) -> Option<&FileRecord> {
        self.files.get(name)
    }

    /// Number of cataloged files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// `true` if nothing is cataloged.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate `(file name, record)` pairs ordered by file name.
    pub fn iter(&self) -> btree_map::Iter<'_, String, FileRecord> {
        self.files.iter()
    }

    /// Sum of all cataloged file sizes, in bytes.
    pub fn total_transfer_size(&self) -> u64 {
        self.files.values().map(|r| r.size).sum()
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = (&'a String, &'a FileRecord);
    type IntoIter = btree_map::Iter<'a, String, FileRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, record) in &self.files {
            writeln!(f, "File name: {name}")?;
            writeln!(f, "Full path: {}", record.path.display())?;
            writeln!(f, "Size: {} bytes", record.size)?;
            writeln!(f, "Encoding: {}", record.encoding)?;
            writeln!(f)?;
        }
        Ok(())
    }
}
