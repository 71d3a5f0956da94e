//! Helpers shared by the two binaries.

use crate::config::EtlConfig;
use crate::sql::StatementCatalog;
use crate::warehouse::{open_warehouse, Warehouse};
use anyhow::{Context, Result};
use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn get_styles() -> Styles {
    let heading = AnsiColor::Cyan.on_default().bold().underline();
    Styles::styled()
        .header(heading)
        .usage(heading)
        .literal(AnsiColor::Green.on_default().bold())
        .placeholder(AnsiColor::BrightBlack.on_default())
}

/// Absolute form of a CLI path. Existing paths are canonicalized, missing
/// ones are joined to the working directory and left for the loader to report.
pub fn parse_path(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    match path.canonicalize() {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(std::env::current_dir()?.join(path)),
        Err(e) => Err(e).with_context(|| format!("Cannot resolve path {}", s)),
    }
}

/// Render every statement, then connect. A configuration that cannot be
/// turned into SQL never reaches the warehouse.
pub fn prepare_run(config: &EtlConfig) -> Result<(StatementCatalog, Box<dyn Warehouse>)> {
    let catalog = StatementCatalog::new(config).context("Failed to build SQL statements")?;
    let warehouse = open_warehouse(config).context("Failed to connect to the warehouse")?;
    Ok((catalog, warehouse))
}

/// Log to stderr, INFO unless `LOG_LEVEL` says otherwise.
pub fn init_logging() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")
}
