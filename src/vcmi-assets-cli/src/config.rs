//! Configuration management for the vcmi-assets CLI

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use vcmi_assets::pipeline::{self, PipelineOptions};
use vcmi_assets::ContentLayout;

/// Extractor used when none is configured.
pub const DEFAULT_EXTRACTOR: &str = "./vcmi_extract/vcmiextract";

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub archives: ArchivesConfig,
    pub layout: LayoutConfig,
}

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct PathsConfig {
    /// Folder holding the game archives
    pub mod_data_folder: Option<PathBuf>,
    /// Destination mod tree
    pub mod_folder: Option<PathBuf>,
    pub work_folder: Option<PathBuf>,
    pub extractor: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ArchivesConfig {
    pub files: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub content_layout: ContentLayout,
    pub detect_overrides: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        LayoutConfig {
            content_layout: ContentLayout::default(),
            detect_overrides: true,
        }
    }
}

impl Config {
    /// Get the path to the default config file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("vcmi-assets");

        Ok(config_dir.join("settings.toml"))
    }

    /// Load configuration from `path`, or defaults if it doesn't exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Save configuration to `path`
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory at {}", parent.display())
            })?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;

        Ok(())
    }

    pub fn work_folder(&self) -> PathBuf {
        self.paths
            .work_folder
            .clone()
            .unwrap_or_else(pipeline::default_work_folder)
    }

    pub fn pool(&self) -> PathBuf {
        self.work_folder().join(pipeline::POOL_FOLDER)
    }

    pub fn mapping(&self) -> PathBuf {
        self.work_folder().join(pipeline::MAPPING_ARTIFACT_NAME)
    }

    pub fn extractor(&self) -> PathBuf {
        self.paths
            .extractor
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_EXTRACTOR))
    }

    pub fn mod_folder(&self) -> Result<PathBuf> {
        self.paths
            .mod_folder
            .clone()
            .context("No mod folder configured. Use: vcmi-assets configure --mod-folder PATH")
    }

    pub fn mod_data_folder(&self) -> Result<PathBuf> {
        self.paths
            .mod_data_folder
            .clone()
            .context("No data folder configured. Use: vcmi-assets configure --mod-data-folder PATH")
    }

    /// Options for a full install run
    pub fn pipeline_options(&self, reuse_pool: bool) -> Result<PipelineOptions> {
        Ok(PipelineOptions {
            data_folder: self.mod_data_folder()?,
            archives: self.archives.files.clone(),
            mod_folder: self.mod_folder()?,
            work_folder: self.work_folder(),
            layout: self.layout.content_layout,
            detect_overrides: self.layout.detect_overrides,
            reuse_pool,
        })
    }
}
