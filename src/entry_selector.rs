//! Orders, filters and (optionally) slices an archive's raw entry list into
//! the sequence an [`crate::codec::ArchiveCodec`] operation actually wants.

use regex::Regex;

use crate::archive::ArchiveEntry;
use crate::error::{CodecError, Result};
use crate::models::FileMetadata;
use crate::natural_order;
use crate::path_classifier;

/// Drops entries inside a blacklisted folder or named as a macOS sidecar.
/// Shared by every selection mode and by sidecar lookups that bypass
/// [`select`] entirely (e.g. `ComicInfo.xml` discovery).
pub fn raw_filter(entries: &[ArchiveEntry]) -> Vec<ArchiveEntry> {
    entries
        .iter()
        .filter(|e| {
            !path_classifier::has_blacklisted_folder(&e.full_name)
                && !path_classifier::is_macos_sidecar(&e.full_name)
        })
        .cloned()
        .collect()
}

/// Strips the final extension from `name`, keeping any directory
/// components, so `"A/001.jpg"` sorts by `"A/001"`.
fn without_extension(name: &str) -> String {
    match name.rsplit_once('.') {
        Some((stem, _ext)) => stem.to_string(),
        None => name.to_string(),
    }
}

/// Implements §4.E: raw filter, then (when slicing is wanted) image filter,
/// natural sort, and cover-aware range slicing.
///
/// `force_images=false` with an absent `page_range` returns the raw-filtered
/// list in archive order — used by sidecar probes (e.g. `ComicInfo.xml`
/// discovery) that need non-image entries too.
pub fn select(
    entries: &[ArchiveEntry],
    meta: &FileMetadata,
    force_images: bool,
    cover_regex: Option<&Regex>,
) -> Result<Vec<ArchiveEntry>> {
    let filtered = raw_filter(entries);

    if !force_images && !meta.page_range.present() {
        return Ok(filtered);
    }

    let mut images: Vec<ArchiveEntry> = filtered
        .into_iter()
        .filter(|e| {
            !e.is_directory
                && path_classifier::is_image(&e.full_name)
                && !path_classifier::is_macos_sidecar(&e.full_name)
                && !path_classifier::has_blacklisted_folder(&e.full_name)
        })
        .collect();

    images.sort_by(|a, b| {
        natural_order::compare(&without_extension(&a.full_name), &without_extension(&b.full_name))
    });

    if !meta.page_range.present() {
        return Ok(images);
    }

    let min = meta.page_range.min().expect("range present");
    let max = meta.page_range.max().expect("range present");

    let cover_position = images
        .iter()
        .position(|e| path_classifier::is_cover(&e.full_name, cover_regex));

    let cover_entry = cover_position.map(|pos| images.remove(pos));
    let rest = images;

    if min >= rest.len() || max >= rest.len() {
        return Err(CodecError::RangeOutOfBounds(format!(
            "range {min}-{max} exceeds {} filtered images",
            rest.len()
        )));
    }

    let mut slice: Vec<ArchiveEntry> = rest[min..=max].to_vec();

    if let Some(cover) = cover_entry {
        if min == 0 {
            slice.push(cover);
        }
    }

    Ok(slice)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::range_spec::RangeSpec;
    use std::path::PathBuf;

    fn entry(name: &str) -> ArchiveEntry {
        ArchiveEntry {
            full_name: name.to_string(),
            is_directory: false,
            compressed_size: 100,
            uncompressed_size: 200,
            last_modified: None,
            compression_method: zip::CompressionMethod::Deflated,
        }
    }

    fn meta(range: RangeSpec) -> FileMetadata {
        FileMetadata {
            path: PathBuf::from("/archives/a.cbz"),
            page_range: range,
            file_size: -1,
            cover_file: None,
        }
    }

    #[test]
    fn s1_cover_goes_last_when_min_is_zero() {
        let entries = vec![entry("001.jpg"), entry("002.jpg"), entry("cover.jpg")];
        let selected = select(&entries, &meta(RangeSpec::new(0, 1).unwrap()), true, None).unwrap();
        let names: Vec<_> = selected.iter().map(|e| e.full_name.clone()).collect();
        assert_eq!(names, vec!["001.jpg", "002.jpg", "cover.jpg"]);
    }

    #[test]
    fn s3_cover_omitted_when_min_is_not_zero() {
        let entries = vec![
            entry("001.jpg"),
            entry("002.jpg"),
            entry("003.jpg"),
            entry("cover.jpg"),
        ];
        let selected = select(&entries, &meta(RangeSpec::new(1, 2).unwrap()), true, None).unwrap();
        let names: Vec<_> = selected.iter().map(|e| e.full_name.clone()).collect();
        assert_eq!(names, vec!["002.jpg", "003.jpg"]);
    }

    #[test]
    fn s4_macos_junk_filtered() {
        let entries = vec![
            entry("001.jpg"),
            entry("__MACOSX/._001.jpg"),
            entry("._002.jpg"),
        ];
        let selected = select(&entries, &meta(RangeSpec::none()), true, None).unwrap();
        assert_eq!(selected.len(), 1);
    }

    #[test]
    fn range_out_of_bounds_is_an_error_not_a_clamp() {
        let entries = vec![entry("001.jpg"), entry("002.jpg")];
        let result = select(&entries, &meta(RangeSpec::new(0, 5).unwrap()), true, None);
        assert!(matches!(result, Err(CodecError::RangeOutOfBounds(_))));
    }

    #[test]
    fn non_image_mode_preserves_archive_order_when_range_absent() {
        let entries = vec![entry("ComicInfo.xml"), entry("001.jpg"), entry("002.jpg")];
        let selected = select(&entries, &meta(RangeSpec::none()), false, None).unwrap();
        let names: Vec<_> = selected.iter().map(|e| e.full_name.clone()).collect();
        assert_eq!(names, vec!["ComicInfo.xml", "001.jpg", "002.jpg"]);
    }

    #[test]
    fn sorted_natural_order_without_range() {
        let entries = vec![entry("page10.jpg"), entry("page2.jpg"), entry("page1.jpg")];
        let selected = select(&entries, &meta(RangeSpec::none()), true, None).unwrap();
        let names: Vec<_> = selected.iter().map(|e| e.full_name.clone()).collect();
        assert_eq!(names, vec!["page1.jpg", "page2.jpg", "page10.jpg"]);
    }
}
