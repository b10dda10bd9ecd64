//! Picks the single entry that represents an archive's cover, given an
//! already raw-filtered candidate list, per the priority order in §4.F.

use regex::Regex;

use crate::archive::ArchiveEntry;
use crate::natural_order;
use crate::path_classifier;

fn directory_of(full_name: &str) -> &str {
    match full_name.rfind('/') {
        Some(idx) => &full_name[..idx],
        None => "",
    }
}

fn base_name_without_extension(full_name: &str) -> String {
    let file_name = full_name.rsplit('/').next().unwrap_or(full_name);
    match file_name.rsplit_once('.') {
        Some((stem, _ext)) => stem.to_string(),
        None => file_name.to_string(),
    }
}

fn is_image_candidate(e: &ArchiveEntry) -> bool {
    !e.is_directory
        && path_classifier::is_image(&e.full_name)
        && !path_classifier::is_macos_sidecar(&e.full_name)
        && !path_classifier::has_blacklisted_folder(&e.full_name)
}

fn first_by_base_name<'a>(candidates: &[&'a ArchiveEntry]) -> Option<&'a ArchiveEntry> {
    candidates
        .iter()
        .copied()
        .min_by(|a, b| {
            natural_order::compare(
                &base_name_without_extension(&a.full_name),
                &base_name_without_extension(&b.full_name),
            )
        })
}

/// Returns the entry that should be treated as `archive_stem`'s cover, or
/// `None` if no candidate survives image filtering.
///
/// `archive_stem` is the archive's own base name (file stem, no
/// extension), used by priority step 2 to recognize a conventional
/// single-root-folder layout (`MySeries.cbz` containing `MySeries/001.jpg`).
pub fn find_cover<'a>(
    entries: &'a [ArchiveEntry],
    archive_stem: &str,
    cover_regex: Option<&Regex>,
) -> Option<&'a ArchiveEntry> {
    let images: Vec<&ArchiveEntry> = entries.iter().filter(|e| is_image_candidate(e)).collect();
    if images.is_empty() {
        return None;
    }

    // 1. An image whose base name satisfies is_cover, by natural order over base name.
    let regex_matches: Vec<&ArchiveEntry> = images
        .iter()
        .copied()
        .filter(|e| path_classifier::is_cover(&e.full_name, cover_regex))
        .collect();
    if let Some(found) = first_by_base_name(&regex_matches) {
        return Some(found);
    }

    // 2. Lexicographically-first image at the archive root (directory == archive's base name).
    let at_root: Vec<&ArchiveEntry> = images
        .iter()
        .copied()
        .filter(|e| directory_of(&e.full_name).eq_ignore_ascii_case(archive_stem))
        .collect();
    if let Some(found) = first_by_base_name(&at_root) {
        return Some(found);
    }

    // 3. First directory in natural order, then first base name within it.
    let mut best_dir: Option<&str> = None;
    for image in &images {
        let dir = directory_of(&image.full_name);
        best_dir = match best_dir {
            None => Some(dir),
            Some(current) if natural_order::compare(dir, current) == std::cmp::Ordering::Less => {
                Some(dir)
            }
            Some(current) => Some(current),
        };
    }
    let in_best_dir: Vec<&ArchiveEntry> = images
        .iter()
        .copied()
        .filter(|e| directory_of(&e.full_name) == best_dir.unwrap_or(""))
        .collect();
    if let Some(found) = first_by_base_name(&in_best_dir) {
        return Some(found);
    }

    // 4. Fallback: first image by natural order of base name.
    first_by_base_name(&images)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> ArchiveEntry {
        ArchiveEntry {
            full_name: name.to_string(),
            is_directory: false,
            compressed_size: 10,
            uncompressed_size: 20,
            last_modified: None,
            compression_method: zip::CompressionMethod::Deflated,
        }
    }

    #[test]
    fn regex_match_wins_over_position() {
        let entries = vec![entry("001.jpg"), entry("folder.jpg")];
        let cover = find_cover(&entries, "MySeries", None).unwrap();
        assert_eq!(cover.full_name, "folder.jpg");
    }

    #[test]
    fn archive_root_folder_wins_when_no_regex_match() {
        let entries = vec![
            entry("extras/001.jpg"),
            entry("MySeries/002.jpg"),
            entry("MySeries/001.jpg"),
        ];
        let cover = find_cover(&entries, "MySeries", None).unwrap();
        assert_eq!(cover.full_name, "MySeries/001.jpg");
    }

    #[test]
    fn falls_back_to_shallowest_directory_then_basename() {
        let entries = vec![entry("chapter2/001.jpg"), entry("chapter1/001.jpg")];
        let cover = find_cover(&entries, "Archive", None).unwrap();
        assert_eq!(cover.full_name, "chapter1/001.jpg");
    }

    #[test]
    fn no_images_returns_none() {
        let entries = vec![entry("ComicInfo.xml")];
        assert!(find_cover(&entries, "Archive", None).is_none());
    }

    #[test]
    fn custom_regex_is_honored() {
        let custom = Regex::new(r"(?i)^title").unwrap();
        let entries = vec![entry("001.jpg"), entry("title_page.jpg")];
        let cover = find_cover(&entries, "Archive", Some(&custom)).unwrap();
        assert_eq!(cover.full_name, "title_page.jpg");
    }
}
