//! Pure predicates over archive entry/file paths.
//!
//! Every function here is side-effect free and takes only borrowed string
//! data, so the test suite can exercise them directly without touching the
//! filesystem.

use lazy_static::lazy_static;
use regex::Regex;

const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "avif", "jxl", "bmp", "tiff",
];

const ARCHIVE_EXTENSIONS: &[&str] = &["cbz", "zip", "cbr", "rar", "cb7", "7z", "cbt", "tar.gz"];

const BLACKLISTED_SEGMENTS: &[&str] = &["__MACOSX"];

lazy_static! {
    /// Default cover-filename heuristic: a base name of `cover` or `folder`.
    static ref DEFAULT_COVER_REGEX: Regex =
        Regex::new(r"(?i)^(cover|folder)$").expect("default cover regex is valid");
}

/// Returns the lowercased final extension, with the special case of
/// `tar.gz` being treated as a single two-segment extension.
fn lower_extension(name: &str) -> String {
    let lower = name.to_lowercase();
    if lower.ends_with(".tar.gz") {
        return "tar.gz".to_string();
    }
    match lower.rsplit_once('.') {
        Some((_, ext)) => ext.to_string(),
        None => String::new(),
    }
}

/// Base name (final path segment) without its extension.
fn base_name_without_extension(name: &str) -> String {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let ext = lower_extension(file_name);
    if ext.is_empty() {
        file_name.to_string()
    } else if ext == "tar.gz" {
        file_name
            .strip_suffix(".tar.gz")
            .or_else(|| file_name.strip_suffix(".TAR.GZ"))
            .unwrap_or(file_name)
            .to_string()
    } else {
        file_name[..file_name.len() - ext.len() - 1].to_string()
    }
}

/// True iff `name`'s final extension is one of the supported image formats.
pub fn is_image(name: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&lower_extension(name).as_str())
}

/// True iff `name`'s final extension is a supported archive (ZIP- or
/// RAR-family, 7z, tar.gz).
pub fn is_archive(name: &str) -> bool {
    ARCHIVE_EXTENSIONS.contains(&lower_extension(name).as_str())
}

/// True iff `name`'s extension is `epub`.
pub fn is_epub(name: &str) -> bool {
    lower_extension(name) == "epub"
}

/// True iff `name` (without extension, case-insensitive) equals `cover` or
/// `folder`, or matches the supplied cover regex. When `cover_regex` is
/// `None`, [`DEFAULT_COVER_REGEX`] is used.
pub fn is_cover(name: &str, cover_regex: Option<&Regex>) -> bool {
    let base = base_name_without_extension(name);
    let regex = cover_regex.unwrap_or(&DEFAULT_COVER_REGEX);
    regex.is_match(&base)
}

/// True iff any path segment of `path` equals `__MACOSX` or begins with `.`.
pub fn has_blacklisted_folder(path: &str) -> bool {
    let mut segments: Vec<&str> = path.split(['/', '\\']).collect();
    // The final segment is the entry's own file name, not a containing folder.
    segments.pop();
    segments.iter().any(|seg| {
        !seg.is_empty() && (BLACKLISTED_SEGMENTS.contains(seg) || seg.starts_with('.'))
    })
}

/// True iff `name` begins with the macOS AppleDouble sidecar prefix.
pub fn is_macos_sidecar(name: &str) -> bool {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    file_name.starts_with("._")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extensions() {
        assert!(is_image("001.jpg"));
        assert!(is_image("a/b/page.PNG"));
        assert!(is_image("scan.webp"));
        assert!(!is_image("ComicInfo.xml"));
        assert!(!is_image("archive.cbz"));
    }

    #[test]
    fn archive_extensions() {
        assert!(is_archive("book.cbz"));
        assert!(is_archive("book.CBR"));
        assert!(is_archive("book.tar.gz"));
        assert!(!is_archive("book.epub"));
        assert!(!is_archive("page.jpg"));
    }

    #[test]
    fn epub_extension() {
        assert!(is_epub("book.EPUB"));
        assert!(!is_epub("book.cbz"));
    }

    #[test]
    fn cover_default_heuristic() {
        assert!(is_cover("cover.jpg", None));
        assert!(is_cover("Folder.png", None));
        assert!(is_cover("A/cover.jpg", None));
        assert!(!is_cover("001.jpg", None));
    }

    #[test]
    fn cover_custom_regex() {
        let re = Regex::new(r"(?i)^front$").unwrap();
        assert!(is_cover("Front.jpg", Some(&re)));
        assert!(!is_cover("cover.jpg", Some(&re)));
    }

    #[test]
    fn blacklisted_folder_detection() {
        assert!(has_blacklisted_folder("__MACOSX/001.jpg"));
        assert!(has_blacklisted_folder(".hidden/page.jpg"));
        assert!(!has_blacklisted_folder("A/001.jpg"));
        assert!(!has_blacklisted_folder("001.jpg"));
    }

    #[test]
    fn macos_sidecar_detection() {
        assert!(is_macos_sidecar("._001.jpg"));
        assert!(is_macos_sidecar("__MACOSX/._001.jpg"));
        assert!(!is_macos_sidecar("001.jpg"));
    }
}
