//! Asset deployment

use crate::config::Config;
use anyhow::{Context, Result};
use std::path::PathBuf;
use vcmi_assets::deploy::{self, DeployReport};

use super::print_problems;

/// Handle the deploy command
pub fn handle(
    config: &Config,
    mapping: Option<PathBuf>,
    pool: Option<PathBuf>,
    mod_folder: Option<PathBuf>,
) -> Result<()> {
    let mapping = mapping.unwrap_or_else(|| config.mapping());
    let pool = pool.unwrap_or_else(|| config.pool());
    let mod_folder = match mod_folder {
        Some(m) => m,
        None => config.mod_folder()?,
    };

    let report = deploy::deploy(&mapping, &pool, &mod_folder)
        .with_context(|| format!("Failed to deploy into {}", mod_folder.display()))?;

    print_report(&report);
    Ok(())
}

pub(crate) fn print_report(report: &DeployReport) {
    println!(
        "Copied {} assets and {} overrides ({} destinations protected)",
        report.copied, report.overrides_copied, report.protected
    );
    print_problems("Missing assets", &report.missing);
    print_problems("Missing overrides", &report.overrides_missing);
    print_problems("Failed copies", &report.failed);
    print_problems("Unparseable lines", &report.invalid);
}
