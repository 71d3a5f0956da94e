mod redshift;
mod sqlite;

pub use redshift::RedshiftWarehouse;
pub use sqlite::SqliteWarehouse;

use crate::config::{Backend, EtlConfig};
use crate::error::Result;
use crate::sql::{Dialect, Statement};
use tracing::info;

/// A single connection to the analytics database. All calls block until the
/// server is done with the statement.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Warehouse {
    fn dialect(&self) -> Dialect;

    /// Execute one statement, returns the number of affected rows.
    fn execute(&mut self, sql: &str) -> Result<u64>;

    fn begin(&mut self) -> Result<()>;
    fn commit(&mut self) -> Result<()>;
    fn rollback(&mut self) -> Result<()>;

    /// Run a query returning a single integer, such as `SELECT COUNT(*)`.
    fn query_count(&mut self, sql: &str) -> Result<i64>;

    /// Run a COPY statement, returns the number of loaded rows.
    fn bulk_load(&mut self, statement: &Statement) -> Result<u64>;
}

/// Open the warehouse described by the configuration.
pub fn open_warehouse(config: &EtlConfig) -> Result<Box<dyn Warehouse>> {
    match &config.backend {
        Backend::Redshift(cluster) => {
            info!(
                "Connecting to Redshift at {}:{}/{}",
                cluster.host, cluster.port, cluster.db_name
            );
            Ok(Box::new(RedshiftWarehouse::connect(cluster)?))
        }
        Backend::Sqlite(path) => {
            info!("Opening SQLite warehouse at {:?}", path);
            Ok(Box::new(SqliteWarehouse::open(path)?))
        }
    }
}
