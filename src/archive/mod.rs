//! Uniform read interface over ZIP-family and RAR-family archives.
//!
//! Two backend variants implement [`ArchiveBackend`]; [`probe`] decides
//! which one to hand back for a given path, opening the file up to twice.

pub mod rar_backend;
pub mod zip_backend;

use std::path::Path;

use chrono::NaiveDateTime;

use crate::error::{CodecError, Result};
use crate::path_classifier;

/// Which family a given archive belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFamily {
    Zip,
    Rar,
    Unsupported,
}

/// One entry inside an opened archive.
#[derive(Debug, Clone)]
pub struct ArchiveEntry {
    pub full_name: String,
    pub is_directory: bool,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub last_modified: Option<NaiveDateTime>,
    /// The method a rebuilt ZIP should use for this entry: always
    /// `Deflated` for ZIP-sourced entries; for RAR-sourced entries,
    /// derived from whether the source stored or compressed the data,
    /// since RAR's own compression algorithms have no ZIP equivalent.
    pub compression_method: zip::CompressionMethod,
}

/// Capability set every archive backend implements.
pub trait ArchiveBackend {
    fn family(&self) -> ArchiveFamily;

    /// Enumerates every entry in archive order.
    fn entries(&mut self) -> Result<Vec<ArchiveEntry>>;

    /// Reads one entry's full byte content by name.
    fn open_stream(&mut self, full_name: &str) -> Result<Vec<u8>>;
}

/// Probes `path` and returns an opened backend for whichever family claims
/// it, per the order in the codec design: `.cbr`/`.rar` go straight to the
/// RAR backend; everything else tries ZIP first, then RAR, then gives up.
pub fn open(path: &Path) -> Result<Box<dyn ArchiveBackend>> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();

    if !path_classifier::is_archive(name) && !path_classifier::is_epub(name) {
        return Err(CodecError::NotAnArchive(path.display().to_string()));
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    if ext == "cbr" || ext == "rar" {
        return rar_backend::RarBackend::open(path)
            .map(|b| Box::new(b) as Box<dyn ArchiveBackend>);
    }

    if let Ok(backend) = zip_backend::ZipBackend::open(path) {
        return Ok(Box::new(backend));
    }

    if let Ok(backend) = rar_backend::RarBackend::open(path) {
        return Ok(Box::new(backend));
    }

    Err(CodecError::Unsupported(path.display().to_string()))
}

/// Just the family, without keeping the backend open. Used by callers that
/// only want to report `ArchiveFamily` (e.g. diagnostics).
pub fn probe_family(path: &Path) -> ArchiveFamily {
    match open(path) {
        Ok(backend) => backend.family(),
        Err(_) => ArchiveFamily::Unsupported,
    }
}
