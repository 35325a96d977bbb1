mod cli;
mod commands;
mod config;

use anyhow::Result;
use clap::Parser;
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "vcmi_assets=debug,vcmi_assets_cli=debug"
    } else {
        "vcmi_assets=info,vcmi_assets_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config_path = match cli.config {
        Some(path) => path,
        None => Config::config_path()?,
    };
    tracing::debug!("Using settings from {}", config_path.display());

    let config = Config::load(&config_path)?;

    match cli.command {
        Commands::Configure {
            mod_data_folder,
            mod_folder,
            work_folder,
            extractor,
            archives,
            layout,
            detect_overrides,
            show,
        } => {
            let changes = commands::configure::Changes {
                mod_data_folder,
                mod_folder,
                work_folder,
                extractor,
                archives,
                layout,
                detect_overrides,
            };
            commands::configure::handle(&config_path, changes, show)?;
        }

        Commands::Extract { force } => {
            commands::extract::handle(&config, force)?;
        }

        Commands::Scan {
            folder,
            output,
            layout,
        } => {
            commands::scan::handle(&config, folder, output, layout)?;
        }

        Commands::Classify {
            input,
            output,
            layout,
        } => {
            commands::classify::handle(&config, &input, &output, layout)?;
        }

        Commands::Overrides {
            mapping,
            mod_folder,
            layout,
        } => {
            commands::overrides::handle(&config, mapping, mod_folder, layout)?;
        }

        Commands::Deploy {
            mapping,
            pool,
            mod_folder,
        } => {
            commands::deploy::handle(&config, mapping, pool, mod_folder)?;
        }

        Commands::Stats {
            mapping,
            pool,
            output_dir,
        } => {
            commands::stats::handle(&mapping, &pool, output_dir.as_deref())?;
        }

        Commands::Install { reuse_pool, force } => {
            commands::install::handle(&config, reuse_pool, force)?;
        }
    }

    Ok(())
}
