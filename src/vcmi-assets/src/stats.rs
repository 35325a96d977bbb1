//! Mapping vs. pool statistics.
//!
//! Useful when a deployment reports missing sources: lists what the mapping
//! asks for that the pool lacks, what the pool holds that nothing asks for,
//! and names that appear on both sides with a different extension.

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::artifact::MappingEntry;
use crate::mapping::MappingTable;
use crate::Result;

pub const MISSING_REPORT: &str = "missing_files.txt";
pub const UNREFERENCED_REPORT: &str = "files_without_entries.txt";
pub const INTERSECTION_REPORT: &str = "intersection_files.txt";

#[derive(Debug, Default, PartialEq, Eq)]
pub struct MappingStats {
    /// Entries whose source file is absent from the pool.
    pub missing: Vec<MappingEntry>,
    /// Pool files no entry refers to.
    pub unreferenced: Vec<String>,
    /// Stems present on both sides above, `.wav` files excluded.
    pub intersection: BTreeSet<String>,
}

pub fn compute(mapping: &Path, pool: &Path) -> Result<MappingStats> {
    let table = MappingTable::load(mapping)?;
    let entries: Vec<MappingEntry> = table.records.into_iter().map(|r| r.entry).collect();

    let missing: Vec<MappingEntry> = entries
        .iter()
        .filter(|e| !pool.join(&e.value).is_file())
        .cloned()
        .collect();

    let declared: BTreeSet<&str> = entries.iter().map(|e| e.value.as_str()).collect();
    let mut unreferenced: Vec<String> = fs::read_dir(pool)?
        .filter_map(|e| match e {
            Ok(e) => Some(e),
            Err(err) => {
                tracing::warn!("Skipping unreadable pool entry: {err}");
                None
            }
        })
        .filter(|e| e.path().is_file())
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| !declared.contains(name.as_str()))
        .collect();
    unreferenced.sort();

    let missing_stems = stems(missing.iter().map(|e| e.value.as_str()));
    let unreferenced_stems = stems(unreferenced.iter().map(String::as_str));
    let intersection = missing_stems
        .intersection(&unreferenced_stems)
        .cloned()
        .collect();

    Ok(MappingStats {
        missing,
        unreferenced,
        intersection,
    })
}

fn stems<'a>(names: impl Iterator<Item = &'a str>) -> BTreeSet<String> {
    names
        .filter(|n| !n.to_ascii_lowercase().ends_with(".wav"))
        .filter_map(|n| Path::new(n).file_stem().and_then(|s| s.to_str()))
        .map(str::to_string)
        .collect()
}

/// Write the three report files into `dir`.
pub fn write_reports(stats: &MappingStats, dir: &Path) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let unreferenced = dir.join(UNREFERENCED_REPORT);
    let mut out = BufWriter::new(File::create(&unreferenced)?);
    writeln!(out, "Files in the pool without a mapping entry:")?;
    for name in &stats.unreferenced {
        writeln!(out, "{name}")?;
    }
    out.flush()?;

    let missing = dir.join(MISSING_REPORT);
    let mut out = BufWriter::new(File::create(&missing)?);
    writeln!(out, "Mapping entries without a file in the pool:")?;
    for entry in &stats.missing {
        writeln!(out, "{} : {}", entry.key, entry.value)?;
    }
    out.flush()?;

    let intersection = dir.join(INTERSECTION_REPORT);
    let mut out = BufWriter::new(File::create(&intersection)?);
    writeln!(out, "Names on both lists, ignoring extensions (.wav excluded):")?;
    for stem in &stats.intersection {
        writeln!(out, "{stem}")?;
    }
    out.flush()?;

    Ok(vec![unreferenced, missing, intersection])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_stats() {
        let dir = tempfile::tempdir().unwrap();
        let pool = dir.path().join("pool");
        fs::create_dir_all(&pool).unwrap();
        for name in ["dragon.def", "hero.png", "roar.wav", "extra.def"] {
            fs::write(pool.join(name), name).unwrap();
        }
        let mapping = dir.path().join("mapping.txt");
        fs::write(
            &mapping,
            "// Source file: A/Content/a.json\n\
             \"A/Sprites/dragon.def\" : \"dragon.def\",\n\
             \"A/Sprites/hero.def\" : \"hero.def\",\n\
             \"A/Sounds/roar.mp3\" : \"roar.mp3\",\n",
        )
        .unwrap();

        let stats = compute(&mapping, &pool).unwrap();
        assert_eq!(
            stats.missing,
            [
                MappingEntry::new("A/Sprites/hero.def", "hero.def"),
                MappingEntry::new("A/Sounds/roar.mp3", "roar.mp3"),
            ]
        );
        assert_eq!(stats.unreferenced, ["extra.def", "hero.png", "roar.wav"]);
        assert_eq!(stats.intersection.iter().collect::<Vec<_>>(), ["hero"]);

        let written = write_reports(&stats, &dir.path().join("reports")).unwrap();
        assert_eq!(written.len(), 3);
        let missing = fs::read_to_string(dir.path().join("reports").join(MISSING_REPORT)).unwrap();
        assert!(missing.contains("A/Sprites/hero.def : hero.def"));
    }
}
