//! Re-classification of raw reference artifacts

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::Path;
use vcmi_assets::mapping;
use vcmi_assets::ContentLayout;

use super::print_problems;

/// Handle the classify command
pub fn handle(
    config: &Config,
    input: &Path,
    output: &Path,
    layout: Option<ContentLayout>,
) -> Result<()> {
    let layout = layout.unwrap_or(config.layout.content_layout);
    let report = mapping::reclassify(input, output, layout)
        .with_context(|| format!("Failed to classify {}", input.display()))?;

    println!("Classified {} entries into {}", report.entries, output.display());
    if report.unowned > 0 {
        println!("  {} entries had no source file line and were kept as-is", report.unowned);
    }
    print_problems("Unparseable lines", &report.invalid);
    Ok(())
}
