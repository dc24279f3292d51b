//! Parsing entrypoints and implementations.
//!
//! Most callers should use [`ingest_from_path`] (from [`unified`]) which:
//!
//! - picks the parser from the file extension (or you can override via [`IngestionOptions`])
//! - decodes text formats with the file's detected encoding
//! - infers a column type for every column ([`infer`])
//!
//! Format-specific functions are also available under:
//! - [`csv`]
//! - [`json`]
//! - `excel` (feature `excel`)
//!
//! Per-file load outcomes are reported through [`LoadObserver`] implementations in
//! [`observability`].

pub mod csv;
#[cfg(feature = "excel")]
pub mod excel;
pub mod infer;
pub mod json;
pub mod observability;
pub mod unified;

pub use observability::{
    CompositeObserver, FileObserver, LoadContext, LoadObserver, LoadSeverity, LoadStats, TracingObserver,
};
pub use unified::{IngestionFormat, IngestionOptions, SheetSelection, ingest_from_path};
