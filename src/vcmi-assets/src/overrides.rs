//! Override detection.
//!
//! Files a mod already carries on disk that the mapping table does not
//! declare are overrides: the mod author put them there on purpose and a
//! generic copy must never replace them. Each mod's overrides are recorded in
//! an [`OVERRIDE_ARTIFACT_NAME`] file next to its `Content` folder.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::artifact::MappingEntry;
use crate::classify::{ContentLayout, ModGroup};
use crate::mapping::MappingTable;
use crate::relpath::RelPath;
use crate::{Error, Result};

pub const OVERRIDE_ARTIFACT_NAME: &str = "overridden_assets.txt";

/// Configuration and documentation files that are never asset payloads.
pub const NON_ASSET_EXTENSIONS: &[&str] = &["json", "txt", "md", "bmp", "pdn"];

/// A file protected from generic deployment.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct OverrideRecord {
    /// Path relative to the destination mod folder.
    pub path: RelPath,
    pub file_name: String,
}

impl OverrideRecord {
    pub fn to_entry(&self) -> MappingEntry {
        MappingEntry::new(self.path.to_string(), self.file_name.clone())
    }
}

/// Overrides found for one mod.
#[derive(Debug)]
pub struct ModOverrides {
    pub group: ModGroup,
    pub records: Vec<OverrideRecord>,
    /// The artifact written for this mod, if any overrides were found.
    pub artifact: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct OverrideReport {
    pub mods: Vec<ModOverrides>,
    /// Mods whose asset folder does not exist.
    pub missing: Vec<Error>,
    /// Unparseable mapping lines.
    pub invalid: Vec<Error>,
}

impl OverrideReport {
    pub fn total(&self) -> usize {
        self.mods.iter().map(|m| m.records.len()).sum()
    }
}

/// Detect overrides for every mod named in the mapping artifact and write
/// one override artifact per mod.
pub fn detect(mapping: &Path, mod_folder: &Path, layout: ContentLayout) -> Result<OverrideReport> {
    if !mod_folder.is_dir() {
        return Err(Error::DestinationMissing(mod_folder.to_path_buf()));
    }

    let table = MappingTable::load(mapping)?;
    let groups = table.groups(layout);
    let mod_roots: BTreeSet<RelPath> = groups.keys().map(|g| g.root.clone()).collect();

    let mut report = OverrideReport {
        invalid: table.invalid,
        ..Default::default()
    };

    for (group, declared) in &groups {
        let records = match find_overrides(mod_folder, group, declared, &mod_roots, layout) {
            Ok(records) => records,
            Err(e @ Error::MissingModPath(_)) => {
                tracing::warn!("{e}, no overrides recorded");
                report.missing.push(e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let artifact = write_artifact(mod_folder, group, &records)?;
        report.mods.push(ModOverrides {
            group: group.clone(),
            records,
            artifact,
        });
    }

    tracing::info!(
        "Detected {} overrides across {} mods",
        report.total(),
        report.mods.len()
    );
    Ok(report)
}

/// Files under the group's asset folder whose name is not in `declared`.
///
/// Sub-mods and, for the flattened layout, the mod's own `Content` folder are
/// not descended into.
pub fn find_overrides(
    mod_folder: &Path,
    group: &ModGroup,
    declared: &BTreeSet<String>,
    mod_roots: &BTreeSet<RelPath>,
    layout: ContentLayout,
) -> Result<Vec<OverrideRecord>> {
    let scan_root = group.asset_root.to_path(mod_folder);
    if !scan_root.is_dir() {
        return Err(Error::MissingModPath(scan_root));
    }

    let is_pruned = |dir: &RelPath| {
        if *dir == group.asset_root {
            return false;
        }
        if dir.file_name().is_some_and(|n| n.starts_with('.')) {
            return true;
        }
        if layout == ContentLayout::Flatten && *dir == group.content_dir {
            return true;
        }
        mod_roots.contains(dir)
    };

    let mut records = Vec::new();
    for entry in WalkDir::new(&scan_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if !e.file_type().is_dir() {
                return true;
            }
            e.path()
                .strip_prefix(mod_folder)
                .map(|rel| !is_pruned(&RelPath::from_path(rel)))
                .unwrap_or(true)
        })
        .filter_map(crate::readable)
        .filter(|e| e.file_type().is_file())
    {
        let Some(file_name) = entry.file_name().to_str() else {
            continue;
        };
        if !is_asset_payload(file_name) || declared.contains(file_name) {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(mod_folder) else {
            continue;
        };

        records.push(OverrideRecord {
            path: RelPath::from_path(relative),
            file_name: file_name.to_string(),
        });
    }

    records.sort();
    Ok(records)
}

fn is_asset_payload(file_name: &str) -> bool {
    if file_name.eq_ignore_ascii_case(OVERRIDE_ARTIFACT_NAME) {
        return false;
    }
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");
    !NON_ASSET_EXTENSIONS
        .iter()
        .any(|skip| skip.eq_ignore_ascii_case(ext))
}

/// Write (or remove a stale) override artifact for a mod.
fn write_artifact(
    mod_folder: &Path,
    group: &ModGroup,
    records: &[OverrideRecord],
) -> Result<Option<PathBuf>> {
    let path = group.root.to_path(mod_folder).join(OVERRIDE_ARTIFACT_NAME);

    if records.is_empty() {
        if path.exists() {
            tracing::info!("Removing stale override list {}", path.display());
            fs::remove_file(&path)?;
        }
        return Ok(None);
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(&path)?);
    for record in records {
        writeln!(out, "{}", record.to_entry().to_line())?;
    }
    out.flush()?;

    tracing::info!("Wrote {} overrides to {}", records.len(), path.display());
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Artifact;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, relative).unwrap();
    }

    fn mapping(dir: &Path, text: &str) -> PathBuf {
        let path = dir.join("mapping.txt");
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_detect_records_undeclared_files() {
        let work = tempfile::tempdir().unwrap();
        let mods = tempfile::tempdir().unwrap();
        touch(mods.path(), "ModX/Sprites/dragon.def");
        touch(mods.path(), "ModX/Sprites/custom.def");
        touch(mods.path(), "ModX/Data/ui/panel.png");
        touch(mods.path(), "ModX/Data/ui/panel.bmp");
        touch(mods.path(), "ModX/Content/config/creatures.json");
        touch(mods.path(), "ModX/Content/Sprites/ignored.def");
        touch(mods.path(), "ModX/README.md");
        touch(mods.path(), "ModX/.git/objects/blob.def");

        let mapping = mapping(
            work.path(),
            "// Source file: ModX/Content/config/creatures.json\n\
             \"ModX/Sprites/dragon.def\" : \"dragon.def\",\n",
        );

        let report = detect(&mapping, mods.path(), ContentLayout::Flatten).unwrap();
        assert_eq!(report.mods.len(), 1);
        assert!(report.missing.is_empty());

        let records = &report.mods[0].records;
        let paths: Vec<_> = records.iter().map(|r| r.path.to_string()).collect();
        assert_eq!(paths, ["ModX/Data/ui/panel.png", "ModX/Sprites/custom.def"]);

        let artifact_path = mods.path().join("ModX").join(OVERRIDE_ARTIFACT_NAME);
        assert_eq!(report.mods[0].artifact.as_deref(), Some(artifact_path.as_path()));

        let artifact = Artifact::read(&artifact_path).unwrap();
        let entries: Vec<_> = artifact.entries().cloned().collect();
        assert_eq!(
            entries,
            [
                MappingEntry::new("ModX/Data/ui/panel.png", "panel.png"),
                MappingEntry::new("ModX/Sprites/custom.def", "custom.def"),
            ]
        );
    }

    #[test]
    fn test_overrides_disjoint_from_declared() {
        let work = tempfile::tempdir().unwrap();
        let mods = tempfile::tempdir().unwrap();
        for name in ["a.def", "b.def", "c.wav", "d.png"] {
            touch(mods.path(), &format!("M/Sprites/{name}"));
        }
        let mapping = mapping(
            work.path(),
            "// Source file: M/Content/x.json\n\
             \"M/Sprites/a.def\" : \"a.def\",\n\
             \"M/Sounds/c.wav\" : \"c.wav\",\n",
        );

        let report = detect(&mapping, mods.path(), ContentLayout::Flatten).unwrap();
        let table = MappingTable::load(&mapping).unwrap();
        let declared: BTreeSet<_> = table.records.iter().map(|r| r.entry.value.clone()).collect();

        for record in &report.mods[0].records {
            assert!(!declared.contains(&record.file_name));
        }
        assert_eq!(report.total(), 2);
    }

    #[test]
    fn test_nested_layout_skips_submods() {
        let work = tempfile::tempdir().unwrap();
        let mods = tempfile::tempdir().unwrap();
        touch(mods.path(), "A/Content/Sprites/own.def");
        touch(mods.path(), "A/Content/Mods/B/Content/Sprites/sub.def");

        let mapping = mapping(
            work.path(),
            "// Source file: A/Content/config/a.json\n\
             \"A/Content/Sprites/x.def\" : \"x.def\",\n\
             // Source file: A/Content/Mods/B/Content/config/b.json\n\
             \"A/Content/Mods/B/Content/Sprites/y.def\" : \"y.def\",\n",
        );

        let report = detect(&mapping, mods.path(), ContentLayout::Nested).unwrap();
        let found: Vec<_> = report
            .mods
            .iter()
            .flat_map(|m| m.records.iter().map(|r| r.path.to_string()))
            .collect();
        assert_eq!(
            found,
            ["A/Content/Sprites/own.def", "A/Content/Mods/B/Content/Sprites/sub.def"]
        );
    }

    #[test]
    fn test_missing_mod_path_is_not_fatal() {
        let work = tempfile::tempdir().unwrap();
        let mods = tempfile::tempdir().unwrap();
        let mapping = mapping(
            work.path(),
            "// Source file: Gone/Content/a.json\n\"Gone/Sprites/a.def\" : \"a.def\",\n",
        );

        let report = detect(&mapping, mods.path(), ContentLayout::Flatten).unwrap();
        assert!(report.mods.is_empty());
        assert_eq!(report.missing.len(), 1);
        assert!(matches!(report.missing[0], Error::MissingModPath(_)));
    }

    #[test]
    fn test_stale_artifact_removed_when_no_overrides() {
        let work = tempfile::tempdir().unwrap();
        let mods = tempfile::tempdir().unwrap();
        touch(mods.path(), "M/Sprites/a.def");
        fs::write(mods.path().join("M").join(OVERRIDE_ARTIFACT_NAME), "\"M/Sprites/old.def\" : \"old.def\",\n").unwrap();

        let mapping = mapping(
            work.path(),
            "// Source file: M/Content/x.json\n\"M/Sprites/a.def\" : \"a.def\",\n",
        );

        let report = detect(&mapping, mods.path(), ContentLayout::Flatten).unwrap();
        assert_eq!(report.total(), 0);
        assert!(!mods.path().join("M").join(OVERRIDE_ARTIFACT_NAME).exists());
    }
}
