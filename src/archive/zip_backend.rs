//! ZIP-family backend (`.cbz`, `.zip`, `.epub`): wraps the `zip` crate.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use crate::error::{CodecError, Result};

use super::{ArchiveBackend, ArchiveEntry, ArchiveFamily};

pub struct ZipBackend {
    archive: zip::ZipArchive<File>,
}

impl ZipBackend {
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let archive = zip::ZipArchive::new(file)?;
        Ok(ZipBackend { archive })
    }
}

fn convert_timestamp(dt: zip::DateTime) -> Option<NaiveDateTime> {
    let date = NaiveDate::from_ymd_opt(dt.year() as i32, dt.month() as u32, dt.day() as u32)?;
    date.and_hms_opt(dt.hour() as u32, dt.minute() as u32, dt.second() as u32)
}

/// The inverse of [`convert_timestamp`], used when repacking to carry a
/// source entry's modification time into a freshly written ZIP entry.
pub fn to_zip_datetime(dt: NaiveDateTime) -> Option<zip::DateTime> {
    zip::DateTime::from_date_and_time(
        dt.year() as u16,
        dt.month() as u8,
        dt.day() as u8,
        dt.hour() as u8,
        dt.minute() as u8,
        dt.second() as u8,
    )
    .ok()
}

impl ArchiveBackend for ZipBackend {
    fn family(&self) -> ArchiveFamily {
        ArchiveFamily::Zip
    }

    fn entries(&mut self) -> Result<Vec<ArchiveEntry>> {
        let mut entries = Vec::with_capacity(self.archive.len());
        for i in 0..self.archive.len() {
            let entry = self
                .archive
                .by_index(i)
                .map_err(|e| CodecError::Corrupt(e.to_string()))?;
            entries.push(ArchiveEntry {
                full_name: entry.name().to_string(),
                is_directory: entry.is_dir(),
                compressed_size: entry.compressed_size(),
                uncompressed_size: entry.size(),
                last_modified: entry.last_modified().and_then(convert_timestamp),
                // Repack always re-deflates ZIP-sourced entries, regardless
                // of how the source stored them.
                compression_method: zip::CompressionMethod::Deflated,
            });
        }
        Ok(entries)
    }

    fn open_stream(&mut self, full_name: &str) -> Result<Vec<u8>> {
        let mut entry = self.archive.by_name(full_name)?;
        let mut buffer = Vec::with_capacity(entry.size() as usize);
        entry
            .read_to_end(&mut buffer)
            .map_err(|e| CodecError::Corrupt(e.to_string()))?;
        Ok(buffer)
    }
}
