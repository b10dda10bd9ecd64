//! Archive codec for manga/comic libraries: uniform ZIP/RAR-family entry
//! access, natural-order page listing, cover election, page-range
//! repackaging, `ComicInfo.xml` sidecar parsing, and chapter-boundary
//! inference from bookmarks or filenames.
//!
//! The HTTP surface, persistent store, scheduling, and EPUB parser
//! internals are out of scope; hosts supply those and consume this crate
//! through [`collaborators`] and [`codec::ArchiveCodec`].

pub mod archive;
pub mod chapter_extractor;
pub mod codec;
pub mod collaborators;
pub mod comic_info;
pub mod config;
pub mod cover_finder;
pub mod entry_selector;
pub mod error;
pub mod models;
pub mod natural_order;
pub mod path_classifier;
pub mod range_spec;

pub use codec::ArchiveCodec;
pub use config::ArchiveServiceConfig;
pub use error::{CodecError, Result};
pub use models::{FileMetadata, PageInfo, ParserInfo};
