//! Configuration for the archive codec.
//!
//! Splits compiled-in defaults from environment overrides, scaled down to
//! the handful of knobs the codec itself needs.

use regex::Regex;

/// The sentinel meaning "chapters unknown" on a `ParserInfo`.
pub const DEFAULT_CHAPTER_SENTINEL: &str = "-100000";

/// The sentinel meaning "volume unknown / loose leaf".
pub const LOOSE_LEAF_SENTINEL: &str = "-100000";

/// Tunables for [`crate::codec::ArchiveCodec`] and [`crate::cover_finder`].
#[derive(Clone)]
pub struct ArchiveServiceConfig {
    /// Overrides the default `cover`/`folder` cover-filename heuristic.
    pub cover_regex: Option<Regex>,
    /// Regex used by [`crate::chapter_extractor`] to pull a chapter label
    /// out of a bookmark string or filename.
    pub chapter_label_regex: Regex,
}

impl ArchiveServiceConfig {
    /// Reads `ARCHIVE_COVER_REGEX` / `ARCHIVE_CHAPTER_REGEX` from the
    /// environment when present, falling back to the compiled-in defaults.
    pub fn from_env() -> Self {
        let cover_regex = std::env::var("ARCHIVE_COVER_REGEX")
            .ok()
            .and_then(|pattern| Regex::new(&pattern).ok());

        let chapter_label_regex = std::env::var("ARCHIVE_CHAPTER_REGEX")
            .ok()
            .and_then(|pattern| Regex::new(&pattern).ok())
            .unwrap_or_else(Self::default_chapter_label_regex);

        ArchiveServiceConfig {
            cover_regex,
            chapter_label_regex,
        }
    }

    fn default_chapter_label_regex() -> Regex {
        Regex::new(r"(?i)c(?:hapter)?\.?\s*(\d+(?:\.\d+)?)")
            .expect("default chapter label regex is valid")
    }
}

impl Default for ArchiveServiceConfig {
    fn default() -> Self {
        ArchiveServiceConfig {
            cover_regex: None,
            chapter_label_regex: Self::default_chapter_label_regex(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_chapter_regex_matches_common_forms() {
        let cfg = ArchiveServiceConfig::default();
        let caps = cfg.chapter_label_regex.captures("Chapter 12").unwrap();
        assert_eq!(&caps[1], "12");

        let caps = cfg.chapter_label_regex.captures("ch.5").unwrap();
        assert_eq!(&caps[1], "5");
    }
}
