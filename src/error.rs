//! Error handling infrastructure for the archive codec.
//!
//! This module provides a unified error type covering the archive-subsystem
//! failure taxonomy: probing, backend I/O, range validation and sidecar
//! parsing.

use thiserror::Error;

/// Unified error type for archive codec operations.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Path exists but its extension is unknown or its content isn't an archive.
    #[error("not an archive: {0}")]
    NotAnArchive(String),

    /// The family probe exhausted every backend.
    #[error("unsupported archive: {0}")]
    Unsupported(String),

    /// A backend raised while reading entries or streaming bytes.
    #[error("corrupt archive: {0}")]
    Corrupt(String),

    /// Underlying filesystem I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// An expected entry (explicit cover override, `ComicInfo.xml`) is absent.
    #[error("entry missing: {0}")]
    EntryMissing(String),

    /// `page_range` indices exceed the filtered image list.
    #[error("page range out of bounds: {0}")]
    RangeOutOfBounds(String),

    /// A `"min-max"` range string failed to parse.
    #[error("malformed range: {0}")]
    MalformedRange(String),

    /// `ComicInfo.xml` failed to parse as XML.
    #[error("malformed sidecar: {0}")]
    MalformedSidecar(String),

    /// `extract_to_dir` rethrows `Corrupt`/`Io` as this so callers abort.
    #[error("extraction failed: {0}")]
    ExtractFailed(String),
}

impl From<zip::result::ZipError> for CodecError {
    fn from(e: zip::result::ZipError) -> Self {
        match e {
            zip::result::ZipError::FileNotFound => {
                CodecError::EntryMissing("file not found in zip archive".to_string())
            }
            other => CodecError::Corrupt(other.to_string()),
        }
    }
}

impl From<unrar::error::UnrarError> for CodecError {
    fn from(e: unrar::error::UnrarError) -> Self {
        CodecError::Corrupt(e.to_string())
    }
}

/// Result type alias using [`CodecError`].
pub type Result<T> = std::result::Result<T, CodecError>;
