//! Override detection

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;
use vcmi_assets::overrides::{self, OverrideReport};
use vcmi_assets::ContentLayout;

use super::print_problems;

/// Handle the overrides command
pub fn handle(
    config: &Config,
    mapping: Option<PathBuf>,
    mod_folder: Option<PathBuf>,
    layout: Option<ContentLayout>,
) -> Result<()> {
    let mapping = mapping.unwrap_or_else(|| config.mapping());
    let mod_folder = match mod_folder {
        Some(m) => m,
        None => config.mod_folder()?,
    };

    let layout = layout.unwrap_or(config.layout.content_layout);

    let report = overrides::detect(&mapping, &mod_folder, layout)
        .with_context(|| format!("Failed to detect overrides in {}", mod_folder.display()))?;

    print_report(&report);
    Ok(())
}

pub(crate) fn print_report(report: &OverrideReport) {
    println!("Found {} overrides in {} mods", report.total(), report.mods.len());
    for m in &report.mods {
        if let Some(artifact) = &m.artifact {
            println!("  {}: {} ({})", m.group.root, m.records.len(), artifact.display());
        }
    }
    print_problems("Missing mod folders", &report.missing);
    print_problems("Unparseable mapping lines", &report.invalid);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use vcmi_assets::OVERRIDE_ARTIFACT_NAME;

    #[test]
    fn test_layout_argument_overrides_config() {
        let dir = tempfile::tempdir().unwrap();
        let mods = dir.path().join("mods");
        fs::create_dir_all(mods.join("M/Content/Sprites")).unwrap();
        fs::write(mods.join("M/Content/Sprites/own.def"), "OWN").unwrap();
        let mapping = dir.path().join("mapping.txt");
        fs::write(
            &mapping,
            "// Source file: M/Content/config/a.json\n\"M/Content/Sprites/x.def\" : \"x.def\",\n",
        )
        .unwrap();

        // Flatten (the config default) never looks inside Content
        handle(&Config::default(), Some(mapping.clone()), Some(mods.clone()), None).unwrap();
        assert!(!mods.join("M").join(OVERRIDE_ARTIFACT_NAME).exists());

        handle(
            &Config::default(),
            Some(mapping),
            Some(mods.clone()),
            Some(ContentLayout::Nested),
        )
        .unwrap();
        let list = fs::read_to_string(mods.join("M").join(OVERRIDE_ARTIFACT_NAME)).unwrap();
        assert!(list.contains(r#""M/Content/Sprites/own.def" : "own.def","#));
    }
}
