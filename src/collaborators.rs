//! External-collaborator interfaces consumed by [`crate::codec::ArchiveCodec`]
//! (§6): image encoding, filesystem access, error reporting, and the book
//! parser. The codec is generic over these so a host can substitute test
//! doubles, and each ships one concrete, filesystem-backed implementation
//! suitable for the demo CLI.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::ImageReader;
use tracing::warn;

use crate::error::{CodecError, Result};

/// Desired output format for a written cover thumbnail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeFormat {
    Jpeg,
    Png,
    WebP,
}

impl EncodeFormat {
    fn image_format(self) -> image::ImageFormat {
        match self {
            EncodeFormat::Jpeg => image::ImageFormat::Jpeg,
            EncodeFormat::Png => image::ImageFormat::Png,
            EncodeFormat::WebP => image::ImageFormat::WebP,
        }
    }

    fn extension(self) -> &'static str {
        match self {
            EncodeFormat::Jpeg => "jpg",
            EncodeFormat::Png => "png",
            EncodeFormat::WebP => "webp",
        }
    }
}

/// Resizes and re-encodes a raw image byte stream, writing the result under
/// `out_dir` and returning the final path.
pub trait ImageEncoder: Send + Sync {
    fn write_cover_thumbnail(
        &self,
        stream: &[u8],
        out_name: &str,
        out_dir: &Path,
        format: EncodeFormat,
        size: (u32, u32),
    ) -> Result<PathBuf>;
}

/// Filesystem abstraction the codec uses for temp directories and
/// extraction targets, so tests can substitute an in-memory double.
pub trait DirectoryService: Send + Sync {
    fn temp_directory(&self) -> PathBuf;
    fn ensure_directory(&self, path: &Path) -> Result<()>;
    fn clear_and_delete(&self, path: &Path) -> Result<()>;
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()>;
    /// Removes one redundant containing folder level: if `dir` contains
    /// exactly one entry and that entry is itself a directory, its contents
    /// are moved up into `dir` and the now-empty inner folder is removed.
    fn flatten(&self, dir: &Path) -> Result<()>;
}

/// Reports a per-archive failure without aborting the surrounding scan.
pub trait MediaErrorReporter: Send + Sync {
    fn report(&self, path: &Path, producer: &str, message: &str, cause: Option<&str>);
}

/// Minimal contract for the EPUB/book parser, modeled only through its
/// consumed interface per §1.
pub trait BookService: Send + Sync {
    fn parse_info(&self, path: &Path) -> Option<crate::models::ParserInfo>;
}

/// `image`-crate-backed [`ImageEncoder`]: guessed-format decode,
/// `thumbnail()` resize, re-encode to an arbitrary target size and format.
pub struct DefaultImageEncoder;

impl ImageEncoder for DefaultImageEncoder {
    fn write_cover_thumbnail(
        &self,
        stream: &[u8],
        out_name: &str,
        out_dir: &Path,
        format: EncodeFormat,
        size: (u32, u32),
    ) -> Result<PathBuf> {
        let decoded = ImageReader::new(Cursor::new(stream))
            .with_guessed_format()
            .map_err(|e| CodecError::ExtractFailed(format!("failed to read image format: {e}")))?
            .decode()
            .map_err(|e| CodecError::ExtractFailed(format!("failed to decode image: {e}")))?;

        let thumbnail = decoded.thumbnail(size.0, size.1);

        std::fs::create_dir_all(out_dir)?;
        let out_path = out_dir.join(format!("{out_name}.{}", format.extension()));
        thumbnail
            .save_with_format(&out_path, format.image_format())
            .map_err(|e| CodecError::ExtractFailed(format!("failed to encode thumbnail: {e}")))?;

        Ok(out_path)
    }
}

/// Plain-filesystem [`DirectoryService`] built directly on `std::fs`.
pub struct FilesystemDirectoryService;

impl DirectoryService for FilesystemDirectoryService {
    fn temp_directory(&self) -> PathBuf {
        std::env::temp_dir()
    }

    fn ensure_directory(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn clear_and_delete(&self, path: &Path) -> Result<()> {
        if path.exists() {
            std::fs::remove_dir_all(path)?;
        }
        Ok(())
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<()> {
        if let Some(parent) = dst.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::copy(src, dst)?;
        Ok(())
    }

    fn flatten(&self, dir: &Path) -> Result<()> {
        let mut entries = std::fs::read_dir(dir)?.collect::<std::io::Result<Vec<_>>>()?;
        if entries.len() != 1 {
            return Ok(());
        }
        let only = entries.remove(0);
        if !only.file_type()?.is_dir() {
            return Ok(());
        }

        let inner = only.path();
        for child in std::fs::read_dir(&inner)? {
            let child = child?;
            let dest = dir.join(child.file_name());
            std::fs::rename(child.path(), dest)?;
        }
        std::fs::remove_dir(&inner)?;
        Ok(())
    }
}

/// `tracing`-backed [`MediaErrorReporter`], logging at `warn` level for
/// recoverable per-archive failures.
pub struct TracingErrorReporter;

impl MediaErrorReporter for TracingErrorReporter {
    fn report(&self, path: &Path, producer: &str, message: &str, cause: Option<&str>) {
        warn!(
            path = %path.display(),
            producer,
            cause = cause.unwrap_or(""),
            "{message}"
        );
    }
}

/// No-op [`BookService`]: the EPUB/book parser is an external collaborator
/// (§1) this crate doesn't implement; hosts that need it supply their own.
pub struct NoBookService;

impl BookService for NoBookService {
    fn parse_info(&self, _path: &Path) -> Option<crate::models::ParserInfo> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn flatten_removes_one_redundant_folder_level() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("Series Vol 1");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(inner.join("001.jpg"), b"data").unwrap();

        let service = FilesystemDirectoryService;
        service.flatten(dir.path()).unwrap();

        assert!(dir.path().join("001.jpg").exists());
        assert!(!inner.exists());
    }

    #[test]
    fn flatten_is_a_no_op_with_multiple_entries() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.jpg"), b"1").unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"2").unwrap();

        let service = FilesystemDirectoryService;
        service.flatten(dir.path()).unwrap();

        assert!(dir.path().join("a.jpg").exists());
        assert!(dir.path().join("b.jpg").exists());
    }

    #[test]
    fn clear_and_delete_is_idempotent_on_missing_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nonexistent");
        let service = FilesystemDirectoryService;
        assert!(service.clear_and_delete(&missing).is_ok());
    }
}
