//! Common test infrastructure
//!
//! Every test gets its own temporary directory holding the raw datasets, a
//! config file and a SQLite warehouse.

mod constants;
mod fixtures;

pub use constants::*;
pub use fixtures::{home_event, next_song_event, song_record, test_song};

use serde_json::Value;
use songplays_etl::config::CliConfig;
use songplays_etl::pipeline::{create_tables, run_etl, CommitMode, TableCounts};
use songplays_etl::schema::STAGING_EVENTS_TABLE;
use songplays_etl::{EtlConfig, FileConfig, SqliteWarehouse, StatementCatalog};
use std::path::PathBuf;
use tempfile::TempDir;

pub struct TestWarehouse {
    _dir: TempDir,
    pub config_path: PathBuf,
    pub db_path: PathBuf,
}

impl TestWarehouse {
    pub fn with_data(events: &[Value], songs: &[Value]) -> Self {
        Self::build(events, songs, false)
    }

    /// Same datasets, but the events are loaded through a JSONPaths file.
    pub fn with_jsonpaths(events: &[Value], songs: &[Value]) -> Self {
        Self::build(events, songs, true)
    }

    fn build(events: &[Value], songs: &[Value], use_jsonpaths: bool) -> Self {
        let dir = TempDir::new().unwrap();
        fixtures::write_datasets(dir.path(), events, songs).unwrap();

        let jsonpaths = if use_jsonpaths {
            let path = dir.path().join("log_json_path.json");
            fixtures::write_jsonpaths(&path, &STAGING_EVENTS_TABLE.column_names()).unwrap();
            Some(path)
        } else {
            None
        };

        let db_path = dir.path().join("dwh.db");
        let config_path = dir.path().join("dwh.cfg");
        fixtures::write_config(&config_path, dir.path(), &db_path, jsonpaths.as_deref()).unwrap();

        TestWarehouse {
            _dir: dir,
            config_path,
            db_path,
        }
    }

    pub fn config(&self, cli: &CliConfig) -> EtlConfig {
        let file = FileConfig::load(&self.config_path).unwrap();
        EtlConfig::resolve(cli, file).unwrap()
    }

    pub fn open(&self) -> SqliteWarehouse {
        SqliteWarehouse::open(&self.db_path).unwrap()
    }

    pub fn create_tables(&self) {
        let config = self.config(&CliConfig::default());
        let catalog = StatementCatalog::new(&config).unwrap();
        let mut warehouse = self.open();
        create_tables(&mut warehouse, &catalog, CommitMode::PerStatement).unwrap();
    }

    /// Reset the schema, then run the whole ETL with the given CLI overrides.
    pub fn run(&self, cli: &CliConfig) -> TableCounts {
        self.create_tables();
        let config = self.config(cli);
        let catalog = StatementCatalog::new(&config).unwrap();
        let mut warehouse = self.open();
        run_etl(&mut warehouse, &catalog, config.commit_mode).unwrap()
    }

    pub fn count(&self, table: &str) -> i64 {
        self.open()
            .connection()
            .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })
            .unwrap()
    }
}
