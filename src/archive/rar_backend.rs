//! RAR-family backend (`.cbr`, `.rar`): wraps the `unrar` crate.
//!
//! `unrar`'s processing API is a linear scan — each `read_header()` call
//! consumes the current header and returns the archive positioned at the
//! next one. There is no random access by name, so `open_stream` re-scans
//! from the start until it finds a match.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::error::{CodecError, Result};

use super::{ArchiveBackend, ArchiveEntry, ArchiveFamily};

pub struct RarBackend {
    path: PathBuf,
}

impl RarBackend {
    pub fn open(path: &Path) -> Result<Self> {
        // `open_for_listing` is enough to validate the archive without
        // committing to a processing pass.
        unrar::Archive::new(path)
            .open_for_listing()
            .map_err(|e| CodecError::Corrupt(e.to_string()))?;
        Ok(RarBackend {
            path: path.to_path_buf(),
        })
    }
}

impl ArchiveBackend for RarBackend {
    fn family(&self) -> ArchiveFamily {
        ArchiveFamily::Rar
    }

    fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        let archive = unrar::Archive::new(&self.path)
            .open_for_listing()
            .map_err(|e| CodecError::Corrupt(e.to_string()))?;

        let mut entries = Vec::new();
        for entry in archive {
            let entry = entry.map_err(|e| CodecError::Corrupt(e.to_string()))?;
            let packed_size = entry.packed_size as u64;
            let unpacked_size = entry.unpacked_size as u64;
            entries.push(ArchiveEntry {
                full_name: entry.filename.to_string_lossy().to_string(),
                is_directory: entry.is_directory(),
                compressed_size: packed_size,
                uncompressed_size: unpacked_size,
                last_modified: None,
                // RAR's own compression algorithms have no ZIP equivalent;
                // approximate "matching the source's compression type" by
                // storing uncompressed entries as Stored and everything
                // else as Deflated.
                compression_method: if packed_size == unpacked_size {
                    zip::CompressionMethod::Stored
                } else {
                    zip::CompressionMethod::Deflated
                },
            });
        }
        Ok(entries)
    }

    fn open_stream(&mut self, full_name: &str) -> Result<Vec<u8>> {
        let temp_dir = std::env::temp_dir().join(format!("comic_archive_{}", Uuid::new_v4()));
        std::fs::create_dir_all(&temp_dir)?;

        let result = (|| -> Result<Vec<u8>> {
            let mut current = unrar::Archive::new(&self.path)
                .open_for_processing()
                .map_err(|e| CodecError::Corrupt(e.to_string()))?;

            loop {
                match current.read_header() {
                    Ok(Some(header)) => {
                        let name = header.entry().filename.to_string_lossy().to_string();
                        if name == full_name {
                            header
                                .extract_to(&temp_dir)
                                .map_err(|e| CodecError::Corrupt(e.to_string()))?;
                            let extracted = temp_dir.join(&name);
                            return Ok(std::fs::read(&extracted)?);
                        }
                        current = header
                            .skip()
                            .map_err(|e| CodecError::Corrupt(e.to_string()))?;
                    }
                    Ok(None) => {
                        return Err(CodecError::EntryMissing(full_name.to_string()));
                    }
                    Err(e) => return Err(CodecError::Corrupt(e.to_string())),
                }
            }
        })();

        let _ = std::fs::remove_dir_all(&temp_dir);
        result
    }
}
