//! Drops and recreates the staging and star-schema tables.

use anyhow::{Context, Result};
use clap::Parser;
use songplays_etl::cli::{get_styles, init_logging, parse_path, prepare_run};
use songplays_etl::config::DEFAULT_CONFIG_FILE;
use songplays_etl::{create_tables, CliConfig, CommitMode, EtlConfig, FileConfig, Warehouse};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "create-tables", styles = get_styles())]
#[command(about = "Drop and recreate every warehouse table")]
struct CliArgs {
    /// Path to the warehouse configuration file.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Commit after every statement, or once per phase.
    #[clap(long)]
    pub commit_mode: Option<CommitMode>,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_logging()?;

    let file_config = FileConfig::load(&cli_args.config)?;
    let cli_config = CliConfig {
        commit_mode: cli_args.commit_mode,
        legacy_time_reinsert: false,
    };
    let config = EtlConfig::resolve(&cli_config, file_config)
        .with_context(|| format!("Invalid configuration in {:?}", cli_args.config))?;

    let (catalog, mut warehouse) = prepare_run(&config)?;

    create_tables(warehouse.as_mut(), &catalog, config.commit_mode)
        .context("Failed to reset the warehouse schema")?;
    info!(
        "Done, {} tables ready on the {:?} warehouse",
        catalog.creates.len(),
        warehouse.dialect()
    );
    Ok(())
}
