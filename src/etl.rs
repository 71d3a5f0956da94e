//! Loads the raw datasets into staging and fills the star schema.

use anyhow::{Context, Result};
use clap::Parser;
use songplays_etl::cli::{get_styles, init_logging, parse_path, prepare_run};
use songplays_etl::config::DEFAULT_CONFIG_FILE;
use songplays_etl::{run_etl, CliConfig, CommitMode, EtlConfig, FileConfig};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "etl", styles = get_styles())]
#[command(about = "Load staging tables and populate the star schema")]
struct CliArgs {
    /// Path to the warehouse configuration file.
    #[clap(long, value_parser = parse_path, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Commit after every statement, or once per phase.
    #[clap(long)]
    pub commit_mode: Option<CommitMode>,

    /// Run the time dimension insert a second time before songplays.
    #[clap(long, default_value_t = false)]
    pub legacy_time_reinsert: bool,
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    init_logging()?;

    let file_config = FileConfig::load(&cli_args.config)?;
    let cli_config = CliConfig {
        commit_mode: cli_args.commit_mode,
        legacy_time_reinsert: cli_args.legacy_time_reinsert,
    };
    let config = EtlConfig::resolve(&cli_config, file_config)
        .with_context(|| format!("Invalid configuration in {:?}", cli_args.config))?;
    info!(
        "Loading events from {} and songs from {}",
        config.sources.log_data, config.sources.song_data
    );

    let (catalog, mut warehouse) = prepare_run(&config)?;

    let counts = run_etl(warehouse.as_mut(), &catalog, config.commit_mode)
        .context("ETL run failed")?;
    info!(
        "Done, {} songplays recorded",
        counts.get("songplays").unwrap_or_default()
    );
    Ok(())
}
