//! Full install: extract, scan, detect overrides, deploy

use crate::config::Config;
use anyhow::{Context, Result};
use vcmi_assets::pipeline;
use vcmi_assets::ProcessExtractor;

/// Handle the install command
///
/// The pool is reused when `reuse_pool` is set or, unless `force` is set,
/// when it already holds files.
pub fn handle(config: &Config, reuse_pool: bool, force: bool) -> Result<()> {
    let options = config.pipeline_options(reuse_pool || !force)?;
    let extractor = ProcessExtractor::new(config.extractor());

    let report = pipeline::run(&options, &extractor)
        .with_context(|| format!("Install into {} failed", options.mod_folder.display()))?;

    match &report.pool {
        Some(pool) => super::extract::print_report(pool),
        None => println!("Reused pool {}", options.pool().display()),
    }
    super::scan::print_report(&report.scan);
    match &report.overrides {
        Some(overrides) => super::overrides::print_report(overrides),
        None => println!("Override detection disabled"),
    }
    super::deploy::print_report(&report.deploy);

    Ok(())
}
