//! Mapping artifact generation

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;
use vcmi_assets::mapping::{self, ScanReport};
use vcmi_assets::ContentLayout;

use super::print_problems;

/// Handle the scan command
pub fn handle(
    config: &Config,
    folder: Option<PathBuf>,
    output: Option<PathBuf>,
    layout: Option<ContentLayout>,
) -> Result<()> {
    let folder = match folder {
        Some(f) => f,
        None => config.mod_folder()?,
    };
    let output = output.unwrap_or_else(|| config.mapping());
    let layout = layout.unwrap_or(config.layout.content_layout);

    let report = mapping::scan_documents(&folder, &output, layout)
        .with_context(|| format!("Failed to scan {}", folder.display()))?;

    print_report(&report);
    println!("Mapping written to: {}", output.display());
    Ok(())
}

pub(crate) fn print_report(report: &ScanReport) {
    println!(
        "Scanned {} documents ({} with assets): {} entries, {} duplicates, {} conflicts",
        report.documents_scanned,
        report.documents_with_assets,
        report.entries_written,
        report.duplicates,
        report.conflicts
    );
    print_problems("Skipped documents", &report.skipped);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_scan_explicit_paths() {
        let dir = tempfile::tempdir().unwrap();
        let mods = dir.path().join("Mods");
        fs::create_dir_all(mods.join("ModX/Content/config")).unwrap();
        fs::write(
            mods.join("ModX/Content/config/a.json"),
            r#"{ "image": "heroes/portrait.bmp" }"#,
        )
        .unwrap();
        let output = dir.path().join("mapping.txt");

        handle(&Config::default(), Some(mods), Some(output.clone()), None).unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.contains(r#""ModX/Data/heroes/portrait.png" : "portrait.png","#));
    }

    #[test]
    fn test_scan_needs_a_folder() {
        assert!(handle(&Config::default(), None, None, None).is_err());
    }
}
