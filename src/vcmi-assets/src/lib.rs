//! # vcmi-assets
//!
//! Asset resolution and override-aware deployment for VCMI mods.
//!
//! A VCMI mod describes its creatures, artifacts and interface elements in
//! JSON configuration documents that reference game assets by name
//! (`"animation" : "creatures/dragon"`). The assets themselves ship inside the
//! original game archives. This library turns those scattered references into
//! a copy plan and executes it:
//!
//! 1. [`reference`] walks each document tree and yields asset references.
//! 2. [`classify`] derives the canonical destination path of each reference.
//! 3. [`mapping`] writes the resolved `destination : source` pairs into a
//!    line-oriented mapping artifact.
//! 4. [`overrides`] records files a mod already carries on disk that the
//!    mapping does not account for.
//! 5. [`deploy`] copies assets out of the raw pool, generic entries first and
//!    overrides last.
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//! use vcmi_assets::{deploy, mapping, ContentLayout};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mods = Path::new("Mods/succession_wars");
//! let artifact = Path::new("out/assets_to_paths_mapping.txt");
//!
//! let scan = mapping::scan_documents(mods, artifact, ContentLayout::Flatten)?;
//! println!("{} entries from {} documents", scan.entries_written, scan.documents_with_assets);
//!
//! let report = deploy::deploy(artifact, Path::new("out/mod_data"), mods)?;
//! println!("copied {}, missing {}", report.copied, report.missing.len());
//! # Ok(())
//! # }
//! ```

pub mod artifact;
pub mod category;
pub mod classify;
pub mod deploy;
pub mod document;
pub mod extract;
pub mod mapping;
pub mod overrides;
pub mod pipeline;
pub mod reference;
pub mod relpath;
pub mod stats;

use std::path::PathBuf;

#[doc(inline)]
pub use artifact::{ArtifactLine, MappingEntry};
#[doc(inline)]
pub use category::Category;
#[doc(inline)]
pub use classify::{classify, ClassifiedAsset, ContentLayout, ModGroup};
#[doc(inline)]
pub use deploy::{deploy, DeployReport};
#[doc(inline)]
pub use document::ConfigDocument;
#[doc(inline)]
pub use extract::{ArchiveExtractor, ExtractedDirectory, ProcessExtractor};
#[doc(inline)]
pub use mapping::{MappingTable, MappingWriter, ScanReport};
#[doc(inline)]
pub use overrides::{OverrideRecord, OverrideReport, OVERRIDE_ARTIFACT_NAME};
#[doc(inline)]
pub use reference::AssetReference;
#[doc(inline)]
pub use relpath::RelPath;

/// Errors raised while resolving or deploying mod assets.
///
/// Only [`Error::DestinationMissing`], [`Error::SourceMissing`] and
/// [`Error::Io`] on an output artifact abort a run. Every other variant is
/// collected into the report of the stage that hit it.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Failed to parse document {path}: {source}")]
    DocumentParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Document {path} is not valid UTF-8: {source}")]
    Encoding {
        path: PathBuf,
        #[source]
        source: std::string::FromUtf8Error,
    },

    #[error("Source asset not found in pool: {source_file} (for {destination})")]
    MissingSourceAsset {
        source_file: String,
        destination: String,
    },

    #[error("Mod path does not exist: {0}")]
    MissingModPath(PathBuf),

    #[error("Extraction failed for {archive}: {reason}")]
    Extraction { archive: PathBuf, reason: String },

    #[error("Invalid artifact line {line_no} in {path}: {line}")]
    InvalidArtifactLine {
        path: PathBuf,
        line_no: usize,
        line: String,
    },

    #[error("Failed to copy to {destination}: {source}")]
    CopyFailed {
        destination: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Destination mod folder does not exist: {0}")]
    DestinationMissing(PathBuf),

    #[error("Mod data folder does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Keep a directory-walk entry, logging the ones that could not be read.
pub(crate) fn readable(entry: walkdir::Result<walkdir::DirEntry>) -> Option<walkdir::DirEntry> {
    match entry {
        Ok(entry) => Some(entry),
        Err(err) => {
            tracing::warn!("Skipping unreadable entry: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkdir::WalkDir;

    #[test]
    fn test_readable_skips_walk_errors() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.json"), "{}").unwrap();

        let found: Vec<_> = WalkDir::new(dir.path()).into_iter().filter_map(readable).collect();
        assert_eq!(found.len(), 2);

        let missing: Vec<_> = WalkDir::new(dir.path().join("missing"))
            .into_iter()
            .filter_map(readable)
            .collect();
        assert!(missing.is_empty());
    }
}
