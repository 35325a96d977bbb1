//! Raw pool population

use crate::config::Config;
use anyhow::{Context, Result};
use vcmi_assets::extract::{self, PoolReport, ProcessExtractor};

use super::print_problems;

/// Handle the extract command
pub fn handle(config: &Config, force: bool) -> Result<()> {
    let pool = config.pool();
    if !force && extract::pool_is_populated(&pool) {
        println!("Pool {} already holds files (use --force to extract again)", pool.display());
        return Ok(());
    }

    let data_folder = config.mod_data_folder()?;
    if config.archives.files.is_empty() {
        println!("No archives configured. Use: vcmi-assets configure --archives A,B");
    }

    let extractor = ProcessExtractor::new(config.extractor());
    let report = extract::populate_pool(&data_folder, &config.archives.files, &pool, &extractor)
        .with_context(|| format!("Failed to populate pool from {}", data_folder.display()))?;

    print_report(&report);
    Ok(())
}

pub(crate) fn print_report(report: &PoolReport) {
    println!(
        "Extracted {} archives: {} files copied, {} removed, {} music files",
        report.extracted.len(),
        report.files_copied,
        report.files_removed,
        report.music_copied
    );
    for archive in &report.missing_archives {
        println!("  Archive not found: {}", archive.display());
    }
    print_problems("Failed extractions", &report.failed);
}
