//! End-to-end install: populate the pool, scan, detect overrides, deploy.

use std::path::{Path, PathBuf};

use crate::classify::ContentLayout;
use crate::deploy::{self, DeployReport};
use crate::extract::{self, ArchiveExtractor, PoolReport};
use crate::mapping::{self, ScanReport};
use crate::overrides::{self, OverrideReport};
use crate::{Error, Result};

/// File name of the mapping artifact inside the work folder.
pub const MAPPING_ARTIFACT_NAME: &str = "assets_to_paths_mapping.txt";

/// Folder of the raw pool inside the work folder.
pub const POOL_FOLDER: &str = "mod_data";

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Folder holding the game archives.
    pub data_folder: PathBuf,
    pub archives: Vec<String>,
    /// Destination mod tree; also the folder scanned for documents.
    pub mod_folder: PathBuf,
    /// Folder receiving the mapping artifact and the raw pool.
    pub work_folder: PathBuf,
    pub layout: ContentLayout,
    pub detect_overrides: bool,
    /// Keep an already populated pool instead of extracting again.
    pub reuse_pool: bool,
}

impl PipelineOptions {
    pub fn pool(&self) -> PathBuf {
        self.work_folder.join(POOL_FOLDER)
    }

    pub fn mapping(&self) -> PathBuf {
        self.work_folder.join(MAPPING_ARTIFACT_NAME)
    }
}

#[derive(Debug)]
pub struct PipelineReport {
    /// `None` when an existing pool was reused.
    pub pool: Option<PoolReport>,
    pub scan: ScanReport,
    pub overrides: Option<OverrideReport>,
    pub deploy: DeployReport,
}

/// Run every stage in order.
///
/// Fails only when the mod folder or (if extraction is needed) the data
/// folder does not exist, or when an artifact cannot be written.
pub fn run(options: &PipelineOptions, extractor: &dyn ArchiveExtractor) -> Result<PipelineReport> {
    if !options.mod_folder.is_dir() {
        return Err(Error::DestinationMissing(options.mod_folder.clone()));
    }

    let pool = options.pool();
    let pool_report = if options.reuse_pool && extract::pool_is_populated(&pool) {
        tracing::info!("Reusing extracted files in {}", pool.display());
        None
    } else {
        Some(extract::populate_pool(
            &options.data_folder,
            &options.archives,
            &pool,
            extractor,
        )?)
    };

    let mapping = options.mapping();
    tracing::info!("Calculating needed assets for {}", options.mod_folder.display());
    let scan = mapping::scan_documents(&options.mod_folder, &mapping, options.layout)?;

    let overrides = if options.detect_overrides {
        Some(overrides::detect(&mapping, &options.mod_folder, options.layout)?)
    } else {
        None
    };

    let deploy = deploy::deploy(&mapping, &pool, &options.mod_folder)?;

    Ok(PipelineReport {
        pool: pool_report,
        scan,
        overrides,
        deploy,
    })
}

/// Default work folder: `out` under the current directory.
pub fn default_work_folder() -> PathBuf {
    Path::new("out").to_path_buf()
}
