//! Property tests for [`chapter_extractor::extract`] driven by synthetic
//! bookmark placements.

use comic_archive::chapter_extractor;
use comic_archive::comic_info::{ComicInfo, ComicPageInfo, PageType};
use comic_archive::config::{ArchiveServiceConfig, LOOSE_LEAF_SENTINEL};
use comic_archive::models::{FileMetadata, PageInfo, ParserInfo};
use proptest::prelude::*;

fn pages(count: usize) -> Vec<PageInfo> {
    (0..count)
        .map(|i| PageInfo {
            name: format!("{i:04}.jpg"),
            index: i,
            size: (i as u64 + 1) * 10,
        })
        .collect()
}

/// Picks a strictly increasing set of bookmark positions within
/// `0..page_count`, each labeled `"Chapter {n}"` for a distinct `n`, and
/// returns `(positions, comic_info)`.
fn arb_bookmarked_archive() -> impl Strategy<Value = (usize, Vec<usize>)> {
    (2usize..40).prop_flat_map(|page_count| {
        let max_bookmarks = page_count.min(6);
        (1usize..=max_bookmarks).prop_flat_map(move |k| {
            prop::collection::btree_set(0usize..page_count, k)
                .prop_map(move |positions| (page_count, positions.into_iter().collect()))
        })
    })
}

fn build_info(page_count: usize, positions: &[usize]) -> (ParserInfo, Vec<PageInfo>) {
    let pages = pages(page_count);
    let comic_pages: Vec<ComicPageInfo> = positions
        .iter()
        .enumerate()
        .map(|(i, &pos)| ComicPageInfo {
            image: pos as i64,
            bookmark: format!("Chapter {}", i + 1),
            page_type: if i == 0 { PageType::FrontCover } else { PageType::Story },
        })
        .collect();

    let mut info = ParserInfo::new("series/book01.cbz");
    info.volumes = "1".to_string();
    info.comic_info = Some(ComicInfo {
        pages: comic_pages,
        ..Default::default()
    });
    (info, pages)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Chapters always tile `0..page_count` exactly: the first chapter
    /// starts at 0, the last ends at `page_count - 1`, and consecutive
    /// chapters have no gap and no overlap.
    #[test]
    fn chapters_exactly_tile_the_page_range((page_count, positions) in arb_bookmarked_archive()) {
        let (info, pages) = build_info(page_count, &positions);
        let config = ArchiveServiceConfig::default();

        let chapters = chapter_extractor::extract(&info, &pages, &config);

        prop_assert_eq!(chapters.len(), positions.len());

        let mut prev_end: Option<usize> = None;
        for (i, chapter) in chapters.iter().enumerate() {
            let start = chapter.file_metadata.page_range.min().unwrap();
            let end = chapter.file_metadata.page_range.max().unwrap();

            if i == 0 {
                prop_assert_eq!(start, 0);
            } else {
                prop_assert_eq!(Some(start), prev_end.map(|e| e + 1));
            }
            if i == chapters.len() - 1 {
                prop_assert_eq!(end, page_count - 1);
            }
            prop_assert!(start <= end);
            prev_end = Some(end);
        }
    }

    /// Each chapter's recorded size equals the sum of its pages' sizes.
    #[test]
    fn chapter_size_is_sum_of_its_pages((page_count, positions) in arb_bookmarked_archive()) {
        let (info, pages) = build_info(page_count, &positions);
        let config = ArchiveServiceConfig::default();

        let chapters = chapter_extractor::extract(&info, &pages, &config);

        for chapter in &chapters {
            let start = chapter.file_metadata.page_range.min().unwrap();
            let end = chapter.file_metadata.page_range.max().unwrap();
            let expected: u64 = pages[start..=end].iter().map(|p| p.size).sum();
            prop_assert_eq!(chapter.file_metadata.file_size as u64, expected);
        }
    }

    /// Loose-leaf volumes (the sentinel value) are never split into
    /// chapters, however many bookmarks are present.
    #[test]
    fn loose_leaf_volume_is_never_split((page_count, positions) in arb_bookmarked_archive()) {
        let (mut info, pages) = build_info(page_count, &positions);
        info.volumes = LOOSE_LEAF_SENTINEL.to_string();
        let config = ArchiveServiceConfig::default();

        let chapters = chapter_extractor::extract(&info, &pages, &config);
        prop_assert_eq!(chapters.len(), 1);
        prop_assert_eq!(&chapters[0], &info);
    }

    /// A special-issue archive is returned unchanged regardless of
    /// bookmarks.
    #[test]
    fn special_archive_is_never_split((page_count, positions) in arb_bookmarked_archive()) {
        let (mut info, pages) = build_info(page_count, &positions);
        info.is_special = true;
        let config = ArchiveServiceConfig::default();

        let chapters = chapter_extractor::extract(&info, &pages, &config);
        prop_assert_eq!(chapters.len(), 1);
        prop_assert_eq!(&chapters[0], &info);
    }
}
