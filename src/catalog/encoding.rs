//! Text encoding detection and decoding.
//!
//! Detection looks at a short prefix of the file. BOMs, pure ASCII and valid UTF-8 are
//! recognized directly; anything else goes to a statistical detector (`chardetng`). When
//! the detector is not confident, a fixed list of candidate encodings is tried in order and
//! the first one that decodes the sample wins.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8, WINDOWS_1252};
use tracing::{debug, warn};

use crate::error::{LoaderError, LoaderResult};

/// Number of leading bytes inspected by default.
pub const DEFAULT_SAMPLE_SIZE: usize = 1024;

/// Encoding returned when no candidate decodes the sample.
pub const DEFAULT_ENCODING: &str = "utf-8";

/// Candidates tried, in order, when the statistical detector is inconclusive.
pub const FALLBACK_ENCODINGS: [&str; 3] = ["utf-8", "latin-1", "ascii"];

/// Options controlling encoding detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionOptions {
    /// How many leading bytes of each file are sampled.
    pub sample_size: usize,
    /// Candidate encodings tried when detection is inconclusive.
    pub fallback_encodings: Vec<String>,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            fallback_encodings: FALLBACK_ENCODINGS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Detect the text encoding of a file using [`DetectionOptions::default`].
///
/// Fails with [`LoaderError::Inaccessible`] if the file cannot be opened or read.
pub fn detect_encoding(path: impl AsRef<Path>) -> LoaderResult<String> {
    detect_encoding_with(path, &DetectionOptions::default())
}

/// Detect the text encoding of a file with explicit options.
pub fn detect_encoding_with(path: impl AsRef<Path>, options: &DetectionOptions) -> LoaderResult<String> {
    let path = path.as_ref();
    let sample = read_sample(path, options.sample_size)?;
    match detect_from_sample(&sample) {
        Some(encoding) => {
            debug!(path = %path.display(), %encoding, "encoding detected");
            Ok(encoding)
        }
        None => {
            let encoding = try_candidate_encodings(&sample, &options.fallback_encodings);
            debug!(path = %path.display(), %encoding, "encoding detection inconclusive, used candidate list");
            Ok(encoding)
        }
    }
}

/// Statistical detection over a byte sample.
///
/// Returns `None` when the sample is empty or the detector is not confident.
pub fn detect_from_sample(sample: &[u8]) -> Option<String> {
    if sample.is_empty() {
        return None;
    }
    if let Some((encoding, _bom_len)) = Encoding::for_bom(sample) {
        return Some(label_of(encoding));
    }
    if sample.is_ascii() {
        return Some("ascii".to_string());
    }
    if is_utf8_prefix(sample) {
        return Some(DEFAULT_ENCODING.to_string());
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, true);
    let (encoding, confident) = detector.guess_assess(None, true);
    confident.then(|| label_of(encoding))
}

/// Try each candidate in order and return the first that decodes `sample` without errors.
///
/// Falls back to [`DEFAULT_ENCODING`] when none succeed.
pub fn try_candidate_encodings<S: AsRef<str>>(sample: &[u8], candidates: &[S]) -> String {
    for candidate in candidates {
        let label: &str = candidate.as_ref();
        if decodes_as(sample, label) {
            return label.to_string();
        }
    }
    DEFAULT_ENCODING.to_string()
}

/// Decode file bytes into text using a detected encoding label.
///
/// A BOM at the start of `bytes` takes precedence over `label`. Unknown labels decode as
/// UTF-8. Malformed sequences are replaced with U+FFFD and logged.
pub fn decode_text(bytes: &[u8], label: &str) -> String {
    let encoding = resolve_label(label).unwrap_or(UTF_8);
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        warn!(encoding = used.name(), "input contained malformed sequences; replaced with U+FFFD");
    }
    text.into_owned()
}

fn read_sample(path: &Path, sample_size: usize) -> LoaderResult<Vec<u8>> {
    let file = File::open(path).map_err(|e| LoaderError::inaccessible(path, e))?;
    let mut sample = Vec::with_capacity(sample_size);
    file.take(sample_size as u64)
        .read_to_end(&mut sample)
        .map_err(|e| LoaderError::inaccessible(path, e))?;
    Ok(sample)
}

fn decodes_as(sample: &[u8], label: &str) -> bool {
    match label.to_ascii_lowercase().as_str() {
        "utf-8" | "utf8" => is_utf8_prefix(sample),
        "ascii" | "us-ascii" => sample.is_ascii(),
        // Every byte is a latin-1 code point.
        "latin-1" | "latin1" | "iso-8859-1" => true,
        other => Encoding::for_label(other.as_bytes())
            .map(|enc| {
                enc.decode_without_bom_handling_and_without_replacement(sample)
                    .is_some()
            })
            .unwrap_or(false),
    }
}

/// Valid UTF-8, allowing a multi-byte sequence cut off at the end of the sample.
fn is_utf8_prefix(sample: &[u8]) -> bool {
    match std::str::from_utf8(sample) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

fn resolve_label(label: &str) -> Option<&'static Encoding> {
    match label.trim().to_ascii_lowercase().as_str() {
        "latin-1" | "latin1" => Some(WINDOWS_1252),
        other => Encoding::for_label(other.as_bytes()),
    }
}

fn label_of(encoding: &'static Encoding) -> String {
    encoding.name().to_ascii_lowercase()
}
