//! Command handlers for the vcmi-assets CLI
//!
//! Each subcommand has its own module with a `handle` function.

pub mod classify;
pub mod configure;
pub mod deploy;
pub mod extract;
pub mod install;
pub mod overrides;
pub mod scan;
pub mod stats;

use vcmi_assets::Error;

/// Print a titled list of non-fatal problems, if there are any
pub(crate) fn print_problems(title: &str, problems: &[Error]) {
    if problems.is_empty() {
        return;
    }
    println!("{} ({}):", title, problems.len());
    for problem in problems {
        println!("  {}", problem);
    }
}
