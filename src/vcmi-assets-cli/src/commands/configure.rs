//! Configuration command handlers
//!
//! Handles the `configure` subcommand for setting up vcmi-assets defaults.

use crate::config::Config;
use anyhow::Result;
use std::path::{Path, PathBuf};
use vcmi_assets::ContentLayout;

/// Values given on the command line; `None` leaves the setting untouched
#[derive(Debug, Default)]
pub struct Changes {
    pub mod_data_folder: Option<PathBuf>,
    pub mod_folder: Option<PathBuf>,
    pub work_folder: Option<PathBuf>,
    pub extractor: Option<PathBuf>,
    pub archives: Option<Vec<String>>,
    pub layout: Option<ContentLayout>,
    pub detect_overrides: Option<bool>,
}

impl Changes {
    fn is_empty(&self) -> bool {
        self.mod_data_folder.is_none()
            && self.mod_folder.is_none()
            && self.work_folder.is_none()
            && self.extractor.is_none()
            && self.archives.is_none()
            && self.layout.is_none()
            && self.detect_overrides.is_none()
    }

    fn apply(self, config: &mut Config) {
        if let Some(p) = self.mod_data_folder {
            config.paths.mod_data_folder = Some(p);
        }
        if let Some(p) = self.mod_folder {
            config.paths.mod_folder = Some(p);
        }
        if let Some(p) = self.work_folder {
            config.paths.work_folder = Some(p);
        }
        if let Some(p) = self.extractor {
            config.paths.extractor = Some(p);
        }
        if let Some(files) = self.archives {
            config.archives.files = files
                .into_iter()
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .collect();
        }
        if let Some(layout) = self.layout {
            config.layout.content_layout = layout;
        }
        if let Some(detect) = self.detect_overrides {
            config.layout.detect_overrides = detect;
        }
    }
}

/// Handle the configure command
pub fn handle(config_path: &Path, changes: Changes, show: bool) -> Result<()> {
    let mut config = Config::load(config_path)?;

    if show {
        show_config(&config, config_path);
        return Ok(());
    }

    if changes.is_empty() {
        show_usage();
        return Ok(());
    }

    changes.apply(&mut config);
    config.save(config_path)?;
    println!("Config saved to: {}", config_path.display());

    Ok(())
}

/// Display current configuration
fn show_config(config: &Config, config_path: &Path) {
    let show_path = |label: &str, value: &Option<PathBuf>| match value {
        Some(p) => println!("{:<18} {}", label, p.display()),
        None => println!("{:<18} (not set)", label),
    };

    show_path("Data folder:", &config.paths.mod_data_folder);
    show_path("Mod folder:", &config.paths.mod_folder);
    println!("{:<18} {}", "Work folder:", config.work_folder().display());
    println!("{:<18} {}", "Extractor:", config.extractor().display());

    if config.archives.files.is_empty() {
        println!("{:<18} (none)", "Archives:");
    } else {
        println!("{:<18} {}", "Archives:", config.archives.files.join(", "));
    }

    let layout = match config.layout.content_layout {
        ContentLayout::Flatten => "flatten",
        ContentLayout::Nested => "nested",
    };
    println!("{:<18} {}", "Layout:", layout);
    println!("{:<18} {}", "Detect overrides:", config.layout.detect_overrides);
    println!("{:<18} {}", "Config file:", config_path.display());
}

/// Show usage help for the configure command
fn show_usage() {
    println!("Usage: vcmi-assets configure --mod-data-folder PATH --mod-folder PATH");
    println!("                             --archives H3sw.lod,H3swspr.lod");
    println!("   or: vcmi-assets configure --show");
    println!();
    println!("Other settings: --work-folder, --extractor, --layout flatten|nested,");
    println!("                --detect-overrides true|false");
}
