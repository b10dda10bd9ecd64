//! Value types shared across the archive codec and chapter extractor.

use std::path::{Path, PathBuf};

use crate::comic_info::ComicInfo;
use crate::range_spec::RangeSpec;

/// Identifies one archive and the window of its filtered image list a
/// caller wants to operate on.
///
/// Small, deep-cloneable value type; it doubles as the codec's cache key
/// via [`FileMetadata::cache_key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Absolute filesystem path of the archive.
    pub path: PathBuf,
    /// Present iff the caller wants a sub-range of the filtered image list.
    pub page_range: RangeSpec,
    /// Informational; `-1` means unknown.
    pub file_size: i64,
    /// When present, used verbatim as the cover entry name, bypassing
    /// [`crate::cover_finder`].
    pub cover_file: Option<String>,
}

impl FileMetadata {
    /// Builds metadata for a whole-archive operation (no page range, no
    /// cover override, unknown size).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileMetadata {
            path: path.into(),
            page_range: RangeSpec::none(),
            file_size: -1,
            cover_file: None,
        }
    }

    /// Returns a copy restricted to `page_range`.
    pub fn with_page_range(&self, page_range: RangeSpec) -> Self {
        FileMetadata {
            page_range,
            ..self.clone()
        }
    }

    /// Returns a copy carrying an explicit cover-entry override.
    pub fn with_cover_file(&self, cover_file: impl Into<String>) -> Self {
        FileMetadata {
            cover_file: Some(cover_file.into()),
            ..self.clone()
        }
    }

    /// `(path, page_range_string)` — the codec's cache key.
    pub fn cache_key(&self) -> (PathBuf, String) {
        (self.path.clone(), self.page_range.to_range_string())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// One image entry surfaced by [`crate::codec::ArchiveCodec::list_pages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageInfo {
    /// Entry name inside the archive.
    pub name: String,
    /// Zero-based index into the filtered image list.
    pub index: usize,
    /// Compressed size in bytes, as reported by the archive backend.
    pub size: u64,
}

/// The scanner's result record for one archive file. Carries bibliographic
/// fields alongside the [`FileMetadata`] that addresses the archive, plus an
/// optional parsed sidecar. [`crate::chapter_extractor`] consumes and
/// produces these.
#[derive(Debug, Clone, PartialEq)]
pub struct ParserInfo {
    pub series: String,
    pub volumes: String,
    pub chapters: String,
    pub title: String,
    pub is_special: bool,
    pub file_metadata: FileMetadata,
    pub comic_info: Option<ComicInfo>,
}

impl ParserInfo {
    /// A minimal `ParserInfo` for one archive path, with no volume/chapter
    /// information yet assigned.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();
        ParserInfo {
            series: title.clone(),
            volumes: crate::config::LOOSE_LEAF_SENTINEL.to_string(),
            chapters: crate::config::DEFAULT_CHAPTER_SENTINEL.to_string(),
            title,
            is_special: false,
            file_metadata: FileMetadata::new(path),
            comic_info: None,
        }
    }
}
