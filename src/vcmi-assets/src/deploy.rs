//! Deployment.
//!
//! Copies assets out of the raw pool into the destination mod tree in two
//! passes: every mapping entry first, then every override recorded in the
//! tree's override artifacts. A missing source file is reported and skipped,
//! never fatal. Copies overwrite, so repeated runs converge on the same tree.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::artifact::{Artifact, MappingEntry};
use crate::mapping::MappingTable;
use crate::overrides::OVERRIDE_ARTIFACT_NAME;
use crate::relpath::RelPath;
use crate::{Error, Result};

#[derive(Debug, Default)]
pub struct DeployReport {
    pub copied: usize,
    /// Mapping entries whose source file is not in the pool.
    pub missing: Vec<Error>,
    /// Mapping entries skipped because an override owns the destination.
    pub protected: usize,
    pub overrides_copied: usize,
    pub overrides_missing: Vec<Error>,
    /// Copies that failed on the destination side, and override artifacts
    /// that could not be read.
    pub failed: Vec<Error>,
    /// Unparseable lines in the mapping or override artifacts, and entries
    /// whose destination would leave the mod folder.
    pub invalid: Vec<Error>,
}

/// Deploy a mapping artifact from `pool` into `mod_folder`.
///
/// Only a missing `mod_folder` or an unreadable mapping artifact aborts the
/// run; every per-file problem lands in the report.
pub fn deploy(mapping: &Path, pool: &Path, mod_folder: &Path) -> Result<DeployReport> {
    if !mod_folder.is_dir() {
        return Err(Error::DestinationMissing(mod_folder.to_path_buf()));
    }

    let mut table = MappingTable::load(mapping)?;
    let mut report = DeployReport {
        invalid: std::mem::take(&mut table.invalid),
        ..Default::default()
    };

    let (overrides, unreadable) = override_artifacts(mod_folder);
    report.failed.extend(unreadable);

    let mut override_entries = Vec::new();
    for artifact in &overrides {
        report.invalid.extend(artifact.invalid_lines());
        let (entries, escaping) = artifact.contained_entries();
        report.invalid.extend(escaping);
        override_entries.extend(entries);
    }

    let protected: HashSet<RelPath> = override_entries
        .iter()
        .map(|e| RelPath::parse(&e.key))
        .collect();

    for entry in table.resolved() {
        let destination = RelPath::parse(&entry.key);
        if protected.contains(&destination) {
            tracing::warn!("Skipping {}: destination is a recorded override", entry.key);
            report.protected += 1;
            continue;
        }

        match copy_from_pool(pool, &entry, mod_folder) {
            Ok(()) => report.copied += 1,
            Err(e @ Error::MissingSourceAsset { .. }) => report.missing.push(e),
            Err(e) => report.failed.push(e),
        }
    }

    for entry in override_entries {
        match copy_from_pool(pool, entry, mod_folder) {
            Ok(()) => report.overrides_copied += 1,
            Err(e @ Error::MissingSourceAsset { .. }) => report.overrides_missing.push(e),
            Err(e) => report.failed.push(e),
        }
    }

    tracing::info!(
        "Deployed {} assets ({} missing), {} overrides ({} missing), {} failed",
        report.copied,
        report.missing.len(),
        report.overrides_copied,
        report.overrides_missing.len(),
        report.failed.len()
    );
    Ok(report)
}

/// Read every override artifact under `mod_folder`, in path order.
///
/// Artifacts that cannot be read are logged and returned as errors next to
/// the ones that could.
pub fn override_artifacts(mod_folder: &Path) -> (Vec<Artifact>, Vec<Error>) {
    let paths: Vec<PathBuf> = WalkDir::new(mod_folder)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !e.file_name().to_str().is_some_and(|n| n.starts_with('.')) || e.depth() == 0)
        .filter_map(crate::readable)
        .filter(|e| e.file_type().is_file() && e.file_name() == OVERRIDE_ARTIFACT_NAME)
        .map(|e| e.into_path())
        .collect();

    let mut artifacts = Vec::new();
    let mut errors = Vec::new();
    for path in paths {
        match Artifact::read(&path) {
            Ok(artifact) => artifacts.push(artifact),
            Err(e) => {
                tracing::warn!("Skipping override list {}: {e}", path.display());
                errors.push(e);
            }
        }
    }
    (artifacts, errors)
}

/// Copy one entry out of the pool.
///
/// Fails with [`Error::MissingSourceAsset`] when the pool lacks the file and
/// with [`Error::CopyFailed`] when the destination cannot be written.
fn copy_from_pool(pool: &Path, entry: &MappingEntry, mod_folder: &Path) -> Result<()> {
    let source_name = RelPath::parse(&entry.value);
    let Some(source_name) = source_name.file_name() else {
        return Err(missing(entry));
    };

    let source = pool.join(source_name);
    if !source.is_file() {
        let err = missing(entry);
        tracing::warn!("{err}");
        return Err(err);
    }

    let destination = RelPath::parse(&entry.key).to_path(mod_folder);
    let copy = |destination: &Path| -> std::io::Result<u64> {
        if let Some(parent) = destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(&source, destination)
    };

    if let Err(source) = copy(&destination) {
        let err = Error::CopyFailed {
            destination,
            source,
        };
        tracing::warn!("{err}");
        return Err(err);
    }
    tracing::debug!("Copied {} -> {}", source.display(), destination.display());

    Ok(())
}

fn missing(entry: &MappingEntry) -> Error {
    Error::MissingSourceAsset {
        source_file: entry.value.clone(),
        destination: entry.key.clone(),
    }
}
