use std::fs;
use std::path::Path;

fn main() {
    // Read the version from the VERSION file in the crate root
    let version_path = Path::new("VERSION");

    println!("cargo:rerun-if-changed={}", version_path.display());

    if let Ok(version) = fs::read_to_string(version_path) {
        let version = version.trim();
        println!("cargo:rustc-env=COMIC_ARCHIVE_VERSION={}", version);
    } else {
        // Fallback or warning if VERSION file is missing
        println!("cargo:warning=VERSION file not found, defaulting COMIC_ARCHIVE_VERSION to 'unknown'");
        println!("cargo:rustc-env=COMIC_ARCHIVE_VERSION=unknown");
    }
}
