//! Mapping vs. pool statistics

use anyhow::{Context, Result};
use std::path::Path;
use vcmi_assets::stats;

/// Handle the stats command
pub fn handle(mapping: &Path, pool: &Path, output_dir: Option<&Path>) -> Result<()> {
    let stats = stats::compute(mapping, pool)
        .with_context(|| format!("Failed to compare {} with {}", mapping.display(), pool.display()))?;

    println!("Entries without a pool file: {}", stats.missing.len());
    for entry in &stats.missing {
        println!("  {} : {}", entry.key, entry.value);
    }
    println!("Pool files without an entry: {}", stats.unreferenced.len());
    if !stats.intersection.is_empty() {
        println!("Names on both lists (extension mismatch?):");
        for stem in &stats.intersection {
            println!("  {}", stem);
        }
    }

    if let Some(dir) = output_dir {
        let written = stats::write_reports(&stats, dir)
            .with_context(|| format!("Failed to write reports to {}", dir.display()))?;
        for path in written {
            println!("Report written to: {}", path.display());
        }
    }

    Ok(())
}
