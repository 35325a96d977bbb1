//! Raw-pool population.
//!
//! Game archives are unpacked by an external tool (e.g. `vcmiextract`) that
//! writes the archive's files into a sibling directory named after the
//! archive. The extracted files are then copied flat into the raw pool, where
//! deployment looks them up by basename.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::{Error, Result};

/// Extensions removed from the pool after each archive: palettes, fonts,
/// masks and text tables that are never deployed.
pub const UNWANTED_POOL_EXTENSIONS: &[&str] = &["txt", "msk", "msg", "fnt", "pal"];

/// Folder next to the data folder holding loose music files.
pub const MUSIC_FOLDER: &str = "mp3";

/// Directory produced by a successful extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDirectory(pub PathBuf);

impl ExtractedDirectory {
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// Something that can unpack a game archive.
pub trait ArchiveExtractor {
    /// Unpack `archive`, returning [`Error::Extraction`] on failure.
    fn extract(&self, archive: &Path) -> Result<ExtractedDirectory>;
}

/// Runs an external extractor binary as `<program> <archive>`.
#[derive(Debug, Clone)]
pub struct ProcessExtractor {
    pub program: PathBuf,
}

impl ProcessExtractor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        ProcessExtractor {
            program: program.into(),
        }
    }
}

impl ArchiveExtractor for ProcessExtractor {
    fn extract(&self, archive: &Path) -> Result<ExtractedDirectory> {
        let failure = |reason: String| Error::Extraction {
            archive: archive.to_path_buf(),
            reason,
        };

        let archive = archive.canonicalize()?;
        let output = Command::new(&self.program)
            .arg(&archive)
            .output()
            .map_err(|e| failure(format!("could not run {}: {e}", self.program.display())))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !stdout.trim().is_empty() {
            tracing::debug!("{}: {}", self.program.display(), stdout.trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(failure(format!("{} ({})", output.status, stderr.trim())));
        }

        let dir = archive.with_extension("");
        if !dir.is_dir() {
            return Err(failure(format!(
                "expected output directory {} was not created",
                dir.display()
            )));
        }

        Ok(ExtractedDirectory(dir))
    }
}

#[derive(Debug, Default)]
pub struct PoolReport {
    pub extracted: Vec<PathBuf>,
    pub failed: Vec<Error>,
    pub missing_archives: Vec<PathBuf>,
    pub files_copied: usize,
    pub files_removed: usize,
    pub music_copied: usize,
}

/// True when `pool` exists and holds at least one entry.
pub fn pool_is_populated(pool: &Path) -> bool {
    fs::read_dir(pool)
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}

/// Extract `archives` from `data_folder` into `pool`.
///
/// Missing archives and failed extractions are logged and skipped; their
/// assets will surface as missing sources during deployment.
pub fn populate_pool(
    data_folder: &Path,
    archives: &[String],
    pool: &Path,
    extractor: &dyn ArchiveExtractor,
) -> Result<PoolReport> {
    if !data_folder.is_dir() {
        return Err(Error::SourceMissing(data_folder.to_path_buf()));
    }
    fs::create_dir_all(pool)?;

    let mut report = PoolReport::default();

    for name in archives.iter().map(|a| a.trim()).filter(|a| !a.is_empty()) {
        let archive = data_folder.join(name);
        if !archive.is_file() {
            tracing::warn!("Archive not found: {}", archive.display());
            report.missing_archives.push(archive);
            continue;
        }

        tracing::info!("Extracting {}", name);
        match extractor.extract(&archive) {
            Ok(dir) => {
                report.files_copied += copy_flat(dir.path(), pool)?;
                report.files_removed += remove_unwanted(pool)?;
                report.extracted.push(archive);
            }
            Err(e) => {
                tracing::warn!("{e}");
                report.failed.push(e);
            }
        }
    }

    let music = data_folder
        .parent()
        .map(|p| p.join(MUSIC_FOLDER))
        .filter(|p| p.is_dir());
    match music {
        Some(dir) => report.music_copied = copy_flat(&dir, pool)?,
        None => tracing::warn!("No {} folder next to {}", MUSIC_FOLDER, data_folder.display()),
    }

    tracing::info!(
        "Pool ready: {} archives extracted, {} files copied, {} music files",
        report.extracted.len(),
        report.files_copied,
        report.music_copied
    );
    Ok(report)
}

/// Copy the files directly inside `source` into `target`, overwriting.
fn copy_flat(source: &Path, target: &Path) -> Result<usize> {
    let mut copied = 0;
    for entry in fs::read_dir(source)? {
        let path = entry?.path();
        if let (true, Some(name)) = (path.is_file(), path.file_name()) {
            fs::copy(&path, target.join(name))?;
            copied += 1;
        }
    }
    Ok(copied)
}

fn remove_unwanted(pool: &Path) -> Result<usize> {
    let mut removed = 0;
    for entry in fs::read_dir(pool)? {
        let path = entry?.path();
        let unwanted = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| UNWANTED_POOL_EXTENSIONS.iter().any(|u| u.eq_ignore_ascii_case(e)));
        if unwanted && path.is_file() {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => tracing::warn!("Failed to delete {}: {e}", path.display()),
            }
        }
    }
    Ok(removed)
}
