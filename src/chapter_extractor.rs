//! Infers per-chapter boundaries for a volume archive that carries no
//! chapter information of its own, from `ComicInfo.xml` page bookmarks or,
//! failing that, from chapter numbers embedded in page filenames.

use std::collections::HashSet;

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::{ArchiveServiceConfig, DEFAULT_CHAPTER_SENTINEL, LOOSE_LEAF_SENTINEL};
use crate::models::{PageInfo, ParserInfo};
use crate::range_spec::RangeSpec;

lazy_static! {
    /// Strips bracketed/parenthesized edition tags (`(Digital)`, `[Scanlation]`)
    /// before a page filename is handed to the chapter-label regex.
    static ref EDITION_TAG: Regex = Regex::new(r"[\[(][^\])]*[\])]").expect("edition tag regex is valid");
}

fn strip_edition_tags(name: &str) -> String {
    EDITION_TAG.replace_all(name, " ").trim().to_string()
}

fn parse_label(raw: &str, config: &ArchiveServiceConfig) -> String {
    config
        .chapter_label_regex
        .captures(raw)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_CHAPTER_SENTINEL.to_string())
}

fn preconditions_hold(info: &ParserInfo) -> bool {
    !info.is_special
        && info.chapters == DEFAULT_CHAPTER_SENTINEL
        && info.volumes != LOOSE_LEAF_SENTINEL
}

struct Boundary {
    label: String,
    page: usize,
}

fn dedup_by_first_occurrence(candidates: impl Iterator<Item = (String, usize)>) -> Vec<Boundary> {
    let mut seen = HashSet::new();
    let mut boundaries = Vec::new();
    for (label, page) in candidates {
        if label == DEFAULT_CHAPTER_SENTINEL || seen.contains(&label) {
            continue;
        }
        seen.insert(label.clone());
        boundaries.push(Boundary { label, page });
    }
    boundaries
}

fn bookmark_boundaries(info: &ParserInfo, config: &ArchiveServiceConfig) -> Vec<Boundary> {
    let Some(comic_info) = &info.comic_info else {
        return Vec::new();
    };
    let mut pages = comic_info.pages.clone();
    pages.sort_by_key(|p| p.image);
    dedup_by_first_occurrence(pages.into_iter().filter_map(|p| {
        let bookmark = p.bookmark.trim();
        if bookmark.is_empty() {
            None
        } else {
            Some((parse_label(bookmark, config), p.image as usize))
        }
    }))
}

fn filename_boundaries(pages: &[PageInfo], config: &ArchiveServiceConfig) -> Vec<Boundary> {
    dedup_by_first_occurrence(
        pages
            .iter()
            .map(|p| (parse_label(&strip_edition_tags(&p.name), config), p.index)),
    )
}

fn cover_name_in_range(info: &ParserInfo, pages: &[PageInfo], start: usize, end: usize) -> String {
    let Some(comic_info) = &info.comic_info else {
        return String::new();
    };
    comic_info
        .pages
        .iter()
        .filter(|p| {
            let idx = p.image as usize;
            idx >= start && idx <= end && p.page_type.is_cover_like()
        })
        .min_by_key(|p| p.image)
        .and_then(|p| pages.get(p.image as usize))
        .map(|page| page.name.clone())
        .unwrap_or_default()
}

/// Splits `info` into per-chapter records, one per inferred chapter
/// boundary. `pages` is the archive's filtered image list in selection
/// order (produced upstream by [`crate::entry_selector::select`]); its
/// `.size` fields back the per-chapter byte-size total and its `.name`
/// fields back the per-chapter cover filename.
///
/// Returns `[info]` unchanged when the preconditions aren't met or neither
/// source yields a chapter boundary.
pub fn extract(info: &ParserInfo, pages: &[PageInfo], config: &ArchiveServiceConfig) -> Vec<ParserInfo> {
    if !preconditions_hold(info) || pages.is_empty() {
        return vec![info.clone()];
    }

    let mut boundaries = bookmark_boundaries(info, config);
    if boundaries.is_empty() {
        boundaries = filename_boundaries(pages, config);
    }
    if boundaries.is_empty() {
        return vec![info.clone()];
    }

    let page_count = pages.len();
    let k = boundaries.len();
    boundaries
        .iter()
        .enumerate()
        .map(|(i, boundary)| {
            let start = if i == 0 { 0 } else { boundary.page };
            let end = if i == k - 1 {
                page_count - 1
            } else {
                boundaries[i + 1].page - 1
            };

            let size: u64 = pages[start..=end].iter().map(|p| p.size).sum();
            let cover = cover_name_in_range(info, pages, start, end);

            let mut chapter = info.clone();
            chapter.chapters = boundary.label.clone();
            let page_range =
                RangeSpec::new(start, end).expect("start <= end by construction");
            chapter.file_metadata = chapter.file_metadata.with_page_range(page_range);
            chapter.file_metadata.file_size = size as i64;
            chapter.file_metadata.cover_file = if cover.is_empty() { None } else { Some(cover) };
            chapter
        })
        .collect()
}
