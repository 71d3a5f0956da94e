//! Redshift backend, spoken to over the Postgres wire protocol.
//!
//! Redshift only partially implements the extended query protocol, so every
//! statement goes through `raw_sql()` in simple query mode. The pipeline is
//! sequential, calls block on a single-threaded runtime owned by the backend.

use super::Warehouse;
use crate::config::{ClusterSettings, SslMode};
use crate::error::{EtlError, Result};
use crate::sql::{Dialect, Statement};
use sqlx::postgres::{PgConnectOptions, PgConnection, PgSslMode};
use sqlx::{ConnectOptions, Row};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

pub struct RedshiftWarehouse {
    runtime: Runtime,
    conn: PgConnection,
}

impl RedshiftWarehouse {
    pub fn connect(cluster: &ClusterSettings) -> Result<Self> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| EtlError::Connection {
                source: Box::new(e),
            })?;

        let options = PgConnectOptions::new()
            .host(&cluster.host)
            .port(cluster.port)
            .database(&cluster.db_name)
            .username(&cluster.user)
            .password(&cluster.password)
            .ssl_mode(pg_ssl_mode(cluster.ssl_mode));
        let conn = runtime
            .block_on(options.connect())
            .map_err(|e| EtlError::Connection {
                source: Box::new(e),
            })?;

        Ok(RedshiftWarehouse { runtime, conn })
    }

    fn simple_query(&mut self, sql: &str) -> Result<u64> {
        let result = self
            .runtime
            .block_on(sqlx::raw_sql(sql).execute(&mut self.conn))?;
        Ok(result.rows_affected())
    }
}

fn pg_ssl_mode(mode: SslMode) -> PgSslMode {
    match mode {
        SslMode::Disable => PgSslMode::Disable,
        SslMode::Allow => PgSslMode::Allow,
        SslMode::Prefer => PgSslMode::Prefer,
        SslMode::Require => PgSslMode::Require,
        SslMode::VerifyCa => PgSslMode::VerifyCa,
        SslMode::VerifyFull => PgSslMode::VerifyFull,
    }
}

impl Warehouse for RedshiftWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Redshift
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        self.simple_query(sql)
    }

    fn begin(&mut self) -> Result<()> {
        self.simple_query("BEGIN;")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.simple_query("COMMIT;")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.simple_query("ROLLBACK;")?;
        Ok(())
    }

    fn query_count(&mut self, sql: &str) -> Result<i64> {
        let row = self
            .runtime
            .block_on(sqlx::raw_sql(sql).fetch_one(&mut self.conn))?;
        // raw_sql rows are only reliably addressable by index
        Ok(row.try_get::<i64, _>(0)?)
    }

    /// COPY runs server side; the cluster fetches the objects itself.
    fn bulk_load(&mut self, statement: &Statement) -> Result<u64> {
        debug!("Sending {} to the cluster", statement.name);
        self.simple_query(&statement.sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ssl_modes_map_onto_the_driver() {
        assert!(matches!(pg_ssl_mode(SslMode::default()), PgSslMode::Prefer));
        assert!(matches!(pg_ssl_mode(SslMode::Require), PgSslMode::Require));
        assert!(matches!(pg_ssl_mode(SslMode::VerifyCa), PgSslMode::VerifyCa));
        assert!(matches!(pg_ssl_mode(SslMode::Disable), PgSslMode::Disable));
    }
}
