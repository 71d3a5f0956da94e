//! Songplays ETL
//!
//! Resets a star-schema warehouse, bulk loads raw song and event data into
//! staging tables and transforms it into songplays, users, songs, artists
//! and time.

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod schema;
pub mod sql;
pub mod staging;
pub mod warehouse;

pub use config::{CliConfig, EtlConfig, FileConfig};
pub use error::{EtlError, Result};
pub use pipeline::{create_tables, run_etl, CommitMode, TableCounts};
pub use sql::StatementCatalog;
pub use warehouse::{open_warehouse, SqliteWarehouse, Warehouse};
