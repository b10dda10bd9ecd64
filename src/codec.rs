//! Top-level archive codec (§4.G): the operations a surrounding library
//! scanner actually calls. Every operation is synchronous, opens and
//! closes its own archive handle, and fails in isolation — a corrupt
//! archive reports once and returns an empty value rather than aborting
//! the caller's batch.

use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;

use crate::archive;
use crate::chapter_extractor;
use crate::collaborators::{DirectoryService, EncodeFormat, ImageEncoder, MediaErrorReporter};
use crate::comic_info::{self, ComicInfo};
use crate::config::ArchiveServiceConfig;
use crate::cover_finder;
use crate::entry_selector;
use crate::error::{CodecError, Result};
use crate::models::{FileMetadata, PageInfo, ParserInfo};

fn is_comic_info_entry(full_name: &str) -> bool {
    full_name
        .rsplit('/')
        .next()
        .unwrap_or(full_name)
        .eq_ignore_ascii_case("ComicInfo.xml")
}

/// Write options for one rebuilt-ZIP entry: the source entry's own
/// compression method (Deflate for ZIP-sourced, derived for RAR-sourced),
/// carrying its original modification time when known.
fn zip_write_options(entry: &archive::ArchiveEntry) -> zip::write::SimpleFileOptions {
    let mut options = zip::write::SimpleFileOptions::default()
        .compression_method(entry.compression_method);
    if let Some(lm) = entry
        .last_modified
        .and_then(archive::zip_backend::to_zip_datetime)
    {
        options = options.last_modified_time(lm);
    }
    options
}

fn archive_stem(meta: &FileMetadata) -> String {
    meta.path()
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Stateless aside from its collaborator references (§5): no static
/// mutable state, no shared caches, safe to invoke from any number of
/// concurrent worker tasks as long as each holds its own `ArchiveCodec`.
pub struct ArchiveCodec<'a> {
    config: &'a ArchiveServiceConfig,
    image_encoder: &'a dyn ImageEncoder,
    directory_service: &'a dyn DirectoryService,
    error_reporter: &'a dyn MediaErrorReporter,
}

impl<'a> ArchiveCodec<'a> {
    pub fn new(
        config: &'a ArchiveServiceConfig,
        image_encoder: &'a dyn ImageEncoder,
        directory_service: &'a dyn DirectoryService,
        error_reporter: &'a dyn MediaErrorReporter,
    ) -> Self {
        ArchiveCodec {
            config,
            image_encoder,
            directory_service,
            error_reporter,
        }
    }

    fn report(&self, meta: &FileMetadata, err: &CodecError) {
        match err {
            CodecError::NotAnArchive(msg) => {
                warn!(path = %meta.path().display(), "not an archive: {msg}");
            }
            other => {
                warn!(path = %meta.path().display(), error = %other, "archive operation failed");
                self.error_reporter
                    .report(meta.path(), "ArchiveService", &other.to_string(), None);
            }
        }
    }

    fn list_pages_internal(&self, meta: &FileMetadata) -> Result<Vec<PageInfo>> {
        let mut backend = archive::open(meta.path())?;
        let entries = backend.entries()?;
        let selected = entry_selector::select(&entries, meta, true, self.config.cover_regex.as_ref())?;
        Ok(selected
            .into_iter()
            .enumerate()
            .map(|(idx, e)| PageInfo {
                name: e.full_name,
                index: idx,
                size: e.compressed_size,
            })
            .collect())
    }

    /// Counts filtered images; `0` on any failure.
    pub fn page_count(&self, meta: &FileMetadata) -> usize {
        match self.list_pages_internal(meta) {
            Ok(pages) => pages.len(),
            Err(e) => {
                self.report(meta, &e);
                0
            }
        }
    }

    /// The filtered, ordered image list; empty on any failure.
    pub fn list_pages(&self, meta: &FileMetadata) -> Vec<PageInfo> {
        match self.list_pages_internal(meta) {
            Ok(pages) => pages,
            Err(e) => {
                self.report(meta, &e);
                Vec::new()
            }
        }
    }

    fn cover_image_internal(
        &self,
        meta: &FileMetadata,
        out_name: &str,
        out_dir: &Path,
        format: EncodeFormat,
        size: (u32, u32),
    ) -> Result<PathBuf> {
        let mut backend = archive::open(meta.path())?;
        let entries = backend.entries()?;
        let filtered = entry_selector::raw_filter(&entries);

        let explicit = meta
            .cover_file
            .as_ref()
            .and_then(|name| backend.open_stream(name).ok());

        let bytes = match explicit {
            Some(bytes) => bytes,
            None => {
                let stem = archive_stem(meta);
                let cover_entry = cover_finder::find_cover(&filtered, &stem, self.config.cover_regex.as_ref())
                    .ok_or_else(|| CodecError::EntryMissing("no cover candidate found".to_string()))?;
                backend.open_stream(&cover_entry.full_name)?
            }
        };

        self.image_encoder
            .write_cover_thumbnail(&bytes, out_name, out_dir, format, size)
    }

    /// Resolves and writes the cover thumbnail; empty string on failure.
    pub fn cover_image(
        &self,
        meta: &FileMetadata,
        out_name: &str,
        out_dir: &Path,
        format: EncodeFormat,
        size: (u32, u32),
    ) -> String {
        match self.cover_image_internal(meta, out_name, out_dir, format, size) {
            Ok(path) => path.to_string_lossy().to_string(),
            Err(e) => {
                self.report(meta, &e);
                String::new()
            }
        }
    }

    fn find_comic_info_entry<'e>(
        &self,
        entries: &'e [archive::ArchiveEntry],
    ) -> Option<&'e archive::ArchiveEntry> {
        entries.iter().find(|e| {
            !e.is_directory
                && is_comic_info_entry(&e.full_name)
                && !crate::path_classifier::has_blacklisted_folder(&e.full_name)
                && !crate::path_classifier::is_macos_sidecar(&e.full_name)
        })
    }

    fn comic_info_internal(&self, meta: &FileMetadata) -> Result<Option<ComicInfo>> {
        let mut backend = archive::open(meta.path())?;
        let entries = backend.entries()?;
        let found = self.find_comic_info_entry(&entries).map(|e| e.full_name.clone());

        let Some(name) = found else {
            return Ok(None);
        };

        let bytes = backend.open_stream(&name)?;
        let xml = String::from_utf8_lossy(&bytes).into_owned();
        // MalformedSidecar is treated as "no sidecar" per the error table:
        // no report, just an absent result.
        Ok(comic_info::parse(&xml).ok())
    }

    /// Parses the archive's `ComicInfo.xml`, if present; `None` on any
    /// failure (a malformed sidecar is silently treated as absent).
    pub fn comic_info(&self, meta: &FileMetadata) -> Option<ComicInfo> {
        match self.comic_info_internal(meta) {
            Ok(info) => info,
            Err(e) => {
                self.report(meta, &e);
                None
            }
        }
    }

    /// True when every selected entry (other than a blacklisted folder)
    /// lives under a single shared top-level directory, meaning the
    /// archive was zipped with one redundant containing folder.
    fn is_nested_single_root(selected: &[archive::ArchiveEntry]) -> bool {
        if selected.is_empty() {
            return false;
        }
        let mut top_levels = selected
            .iter()
            .map(|e| e.full_name.split(['/', '\\']).next().unwrap_or(""));
        let first = top_levels.next().unwrap_or("");
        !first.is_empty() && top_levels.all(|t| t == first)
    }

    fn extract_to_dir_internal(&self, meta: &FileMetadata, dest: &Path) -> Result<()> {
        if dest.exists() {
            return Ok(());
        }

        let mut backend = archive::open(meta.path())?;
        let entries = backend.entries()?;
        let selected = entry_selector::select(&entries, meta, true, self.config.cover_regex.as_ref())?;

        self.directory_service.ensure_directory(dest)?;

        for entry in &selected {
            let bytes = backend.open_stream(&entry.full_name)?;
            let out_path = dest.join(&entry.full_name);
            if let Some(parent) = out_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&out_path, bytes)?;
        }

        if meta.page_range.present() && meta.page_range.min() == Some(0) {
            if let Some(ci_name) = self.find_comic_info_entry(&entries).map(|e| e.full_name.clone()) {
                let bytes = backend.open_stream(&ci_name)?;
                std::fs::write(dest.join(&ci_name), bytes)?;
            }
        }

        if Self::is_nested_single_root(&selected) {
            self.directory_service.flatten(dest)?;
        }

        Ok(())
    }

    /// Extracts the selected entries into `dest`. Idempotent: if `dest`
    /// already exists, returns immediately without recomputing.
    pub fn extract_to_dir(&self, meta: &FileMetadata, dest: &Path) -> Result<()> {
        self.extract_to_dir_internal(meta, dest).map_err(|e| {
            self.report(meta, &e);
            CodecError::ExtractFailed(e.to_string())
        })
    }

    fn repack_zip_stream_internal(&self, meta: &FileMetadata) -> Result<Vec<u8>> {
        if !meta.page_range.present() {
            return Ok(std::fs::read(meta.path())?);
        }

        let mut backend = archive::open(meta.path())?;
        let entries = backend.entries()?;
        let selected = entry_selector::select(&entries, meta, true, self.config.cover_regex.as_ref())?;

        let mut buffer = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut buffer);

            for entry in &selected {
                let bytes = backend.open_stream(&entry.full_name)?;
                writer.start_file(&entry.full_name, zip_write_options(entry))?;
                writer.write_all(&bytes)?;
            }

            if meta.page_range.min() == Some(0) {
                if let Some(ci_entry) = self.find_comic_info_entry(&entries).cloned() {
                    let bytes = backend.open_stream(&ci_entry.full_name)?;
                    writer.start_file(&ci_entry.full_name, zip_write_options(&ci_entry))?;
                    writer.write_all(&bytes)?;
                }
            }

            writer.finish()?;
        }

        Ok(buffer.into_inner())
    }

    /// Returns the archive's bytes, repackaged to `meta.page_range` when
    /// present; the file as-is when absent. Empty on any failure.
    pub fn repack_zip_stream(&self, meta: &FileMetadata) -> Vec<u8> {
        match self.repack_zip_stream_internal(meta) {
            Ok(bytes) => bytes,
            Err(e) => {
                self.report(meta, &e);
                Vec::new()
            }
        }
    }

    /// Splits one `ParserInfo` into its per-chapter records, per
    /// [`chapter_extractor::extract`]: fills in `comic_info` from the
    /// archive when the caller hasn't already parsed it, then derives
    /// page list and chapter boundaries from the same archive handle so
    /// callers don't have to stitch `list_pages`/`comic_info` together
    /// themselves. Falls back to `[info]` unchanged on any failure.
    pub fn chapters(&self, info: &ParserInfo) -> Vec<ParserInfo> {
        let pages = match self.list_pages_internal(&info.file_metadata) {
            Ok(pages) => pages,
            Err(e) => {
                self.report(&info.file_metadata, &e);
                return vec![info.clone()];
            }
        };

        let mut info = info.clone();
        if info.comic_info.is_none() {
            info.comic_info = self.comic_info(&info.file_metadata);
        }

        chapter_extractor::extract(&info, &pages, self.config)
    }

    /// Wraps [`Self::repack_zip_stream`] with the deterministic,
    /// content-ignorant temp-file cache described in §5: if a file for
    /// `label` already exists, its path is returned without recomputing.
    pub fn zip_for_download(&self, meta: &FileMetadata, label: &str) -> Result<PathBuf> {
        let ext = if meta.path().extension().and_then(|e| e.to_str()).map(|e| e.eq_ignore_ascii_case("zip")).unwrap_or(false) {
            "zip"
        } else {
            "cbz"
        };
        let date = Utc::now().format("%Y%m%d");
        let out_path = self
            .directory_service
            .temp_directory()
            .join(format!("comic_archive_{label}_{date}.{ext}"));

        if out_path.exists() {
            return Ok(out_path);
        }

        let bytes = self.repack_zip_stream(meta);
        if let Some(parent) = out_path.parent() {
            self.directory_service.ensure_directory(parent)?;
        }
        std::fs::write(&out_path, bytes)?;
        Ok(out_path)
    }
}
