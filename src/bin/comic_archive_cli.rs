//! Demo CLI exercising `ArchiveCodec` against a single archive file.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use comic_archive::codec::ArchiveCodec;
use comic_archive::collaborators::{
    DefaultImageEncoder, EncodeFormat, FilesystemDirectoryService, TracingErrorReporter,
};
use comic_archive::config::ArchiveServiceConfig;
use comic_archive::models::FileMetadata;
use comic_archive::range_spec::RangeSpec;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Inspect and repackage comic archives", long_about = None)]
struct Cli {
    /// Archive path (.cbz/.zip/.cbr/.rar/.epub)
    archive: PathBuf,

    /// Restrict to a "min-max" page range
    #[arg(long)]
    range: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the filtered, ordered page list
    ListPages,
    /// Print the page count
    PageCount,
    /// Print the parsed ComicInfo.xml, if present
    ComicInfo,
    /// Write the cover thumbnail to the given directory
    Cover {
        #[arg(long, default_value = "cover")]
        out_name: String,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Extract the selected pages into the given directory
    Extract { dest: PathBuf },
    /// Split the archive into chapters inferred from bookmarks or filenames
    Chapters,
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();
}

fn main() -> comic_archive::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let config = ArchiveServiceConfig::from_env();
    let encoder = DefaultImageEncoder;
    let directories = FilesystemDirectoryService;
    let reporter = TracingErrorReporter;
    let codec = ArchiveCodec::new(&config, &encoder, &directories, &reporter);

    let page_range = match &cli.range {
        Some(raw) => RangeSpec::parse(raw)?,
        None => RangeSpec::none(),
    };
    let meta = FileMetadata::new(cli.archive).with_page_range(page_range);

    match cli.command {
        Command::PageCount => {
            println!("{}", codec.page_count(&meta));
        }
        Command::ListPages => {
            for page in codec.list_pages(&meta) {
                println!("{:>4}  {}  ({} bytes)", page.index, page.name, page.size);
            }
        }
        Command::ComicInfo => match codec.comic_info(&meta) {
            Some(info) => println!("{info:#?}"),
            None => println!("no ComicInfo.xml sidecar found"),
        },
        Command::Cover { out_name, out_dir } => {
            let path = codec.cover_image(&meta, &out_name, &out_dir, EncodeFormat::Jpeg, (300, 450));
            if path.is_empty() {
                println!("no cover found");
            } else {
                println!("wrote {path}");
            }
        }
        Command::Extract { dest } => {
            codec.extract_to_dir(&meta, &dest)?;
            println!("extracted to {}", dest.display());
        }
        Command::Chapters => {
            let mut info = comic_archive::models::ParserInfo::new(meta.path());
            info.volumes = "1".to_string();
            info.file_metadata = meta;
            for chapter in codec.chapters(&info) {
                let range = chapter.file_metadata.page_range;
                println!(
                    "chapter {:>8}  pages {}-{}",
                    chapter.chapters,
                    range.min().unwrap_or(0),
                    range.max().unwrap_or(0)
                );
            }
        }
    }

    Ok(())
}
