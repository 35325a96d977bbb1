//! Core CLI definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vcmi_assets::ContentLayout;

#[derive(Parser)]
#[command(name = "vcmi-assets")]
#[command(about = "Resolve and deploy the game assets a VCMI mod refers to", long_about = None)]
pub struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(long, global = true, env = "VCMI_ASSETS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Configure default settings
    #[command(visible_alias = "c")]
    Configure {
        /// Folder holding the game archives
        #[arg(long)]
        mod_data_folder: Option<PathBuf>,

        /// Destination mod folder
        #[arg(long)]
        mod_folder: Option<PathBuf>,

        /// Folder for the mapping artifact and extracted files
        #[arg(long)]
        work_folder: Option<PathBuf>,

        /// Archive extractor executable
        #[arg(long)]
        extractor: Option<PathBuf>,

        /// Archives to extract, comma separated (e.g. H3sw.lod,H3swspr.lod)
        #[arg(long, value_delimiter = ',')]
        archives: Option<Vec<String>>,

        /// Where category folders go: flatten or nested
        #[arg(long)]
        layout: Option<ContentLayout>,

        /// Enable or disable override detection during install
        #[arg(long)]
        detect_overrides: Option<bool>,

        /// Show current configuration
        #[arg(long)]
        show: bool,
    },

    /// Extract the configured archives into the raw pool
    #[command(visible_alias = "x")]
    Extract {
        /// Extract again even if the pool already holds files
        #[arg(short, long)]
        force: bool,
    },

    /// Scan mod documents and write the mapping artifact
    Scan {
        /// Folder to scan (defaults to the configured mod folder)
        #[arg(long)]
        folder: Option<PathBuf>,

        /// Mapping artifact to write
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Where category folders go: flatten or nested
        #[arg(long)]
        layout: Option<ContentLayout>,
    },

    /// Turn a raw reference artifact into a classified mapping artifact
    Classify {
        /// Raw artifact (references under provenance lines)
        input: PathBuf,

        /// Classified artifact to write
        output: PathBuf,

        /// Where category folders go: flatten or nested
        #[arg(long)]
        layout: Option<ContentLayout>,
    },

    /// Record files mod authors ship that the mapping does not declare
    #[command(visible_alias = "o")]
    Overrides {
        /// Mapping artifact (defaults to the one in the work folder)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Destination mod folder
        #[arg(long)]
        mod_folder: Option<PathBuf>,

        /// Where category folders go: flatten or nested
        #[arg(long)]
        layout: Option<ContentLayout>,
    },

    /// Copy mapped assets and overrides from the pool into the mod folder
    #[command(visible_alias = "d")]
    Deploy {
        /// Mapping artifact (defaults to the one in the work folder)
        #[arg(short, long)]
        mapping: Option<PathBuf>,

        /// Raw pool (defaults to the one in the work folder)
        #[arg(short, long)]
        pool: Option<PathBuf>,

        /// Destination mod folder
        #[arg(long)]
        mod_folder: Option<PathBuf>,
    },

    /// Compare a mapping artifact against a raw pool
    Stats {
        /// Mapping artifact
        mapping: PathBuf,

        /// Raw pool folder
        pool: PathBuf,

        /// Write the three report files into this folder
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Extract, scan, detect overrides and deploy in one go
    #[command(visible_alias = "i")]
    Install {
        /// Reuse an already populated pool instead of extracting again
        #[arg(long, conflicts_with = "force")]
        reuse_pool: bool,

        /// Always extract, even if the pool already holds files
        #[arg(short, long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_configure_archives() {
        let cli = Cli::parse_from([
            "vcmi-assets",
            "configure",
            "--archives",
            "H3sw.lod,H3swspr.lod",
            "--layout",
            "nested",
        ]);
        match cli.command {
            Commands::Configure {
                archives, layout, ..
            } => {
                assert_eq!(archives.unwrap(), ["H3sw.lod", "H3swspr.lod"]);
                assert_eq!(layout, Some(ContentLayout::Nested));
            }
            _ => panic!("expected configure"),
        }
    }

    #[test]
    fn test_parse_overrides_layout() {
        let cli = Cli::parse_from(["vcmi-assets", "overrides", "--layout", "nested"]);
        match cli.command {
            Commands::Overrides { layout, .. } => assert_eq!(layout, Some(ContentLayout::Nested)),
            _ => panic!("expected overrides"),
        }
    }

    #[test]
    fn test_install_flags_conflict() {
        let result = Cli::try_parse_from(["vcmi-assets", "install", "--reuse-pool", "--force"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["vcmi-assets", "deploy", "-v", "--config", "s.toml"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("s.toml")));
    }
}
