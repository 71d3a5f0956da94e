//! Local SQLite warehouse, for development runs against files on disk.

use super::Warehouse;
use crate::error::{EtlError, Result};
use crate::schema::Table;
use crate::sql::{Dialect, Statement};
use crate::staging;
use rusqlite::{params, Connection};
use std::path::Path;

pub struct SqliteWarehouse {
    conn: Connection,
}

impl SqliteWarehouse {
    pub fn open<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open_with_flags(
            db_path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI
                | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| EtlError::Connection {
            source: Box::new(e),
        })?;
        Ok(SqliteWarehouse { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| EtlError::Connection {
            source: Box::new(e),
        })?;
        Ok(SqliteWarehouse { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// User tables currently in the database, sorted by name.
    pub fn list_tables(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        let names = stmt
            .query_map(params![], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Check that every table exists with the expected columns, in order,
    /// with matching types, nullability and primary keys.
    pub fn validate_schema(&self, tables: &[Table]) -> Result<()> {
        for table in tables {
            let mut stmt = self
                .conn
                .prepare(&format!("PRAGMA table_info({});", table.name))?;
            let actual_columns: Vec<(String, String, bool, bool)> = stmt
                .query_map(params![], |row| {
                    Ok((
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i32>(3)? == 1,
                        row.get::<_, i32>(5)? > 0,
                    ))
                })?
                .collect::<Result<_, _>>()?;

            if actual_columns.is_empty() {
                return Err(EtlError::schema(format!("table {} does not exist", table.name)));
            }
            if actual_columns.len() != table.columns.len() {
                return Err(EtlError::schema(format!(
                    "table {} has {} columns, expected {}. Found column names: {}",
                    table.name,
                    actual_columns.len(),
                    table.columns.len(),
                    actual_columns
                        .iter()
                        .map(|(name, ..)| name.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                )));
            }

            for ((name, sql_type, non_null, is_primary_key), expected) in
                actual_columns.iter().zip(table.columns.iter())
            {
                if name != expected.name {
                    return Err(EtlError::schema(format!(
                        "table {} column name mismatch: expected {}, got {}",
                        table.name, expected.name, name
                    )));
                }
                let expected_type = expected.sql_type.render(Dialect::Sqlite);
                if !sql_type.eq_ignore_ascii_case(expected_type) {
                    return Err(EtlError::schema(format!(
                        "table {} column {} type mismatch: expected {}, got {}",
                        table.name, expected.name, expected_type, sql_type
                    )));
                }
                if *non_null != expected.non_null {
                    return Err(EtlError::schema(format!(
                        "table {} column {} non-null mismatch: expected {}, got {}",
                        table.name, expected.name, expected.non_null, non_null
                    )));
                }
                if *is_primary_key != expected.is_primary_key {
                    return Err(EtlError::schema(format!(
                        "table {} column {} primary key mismatch: expected {}, got {}",
                        table.name, expected.name, expected.is_primary_key, is_primary_key
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Warehouse for SqliteWarehouse {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn execute(&mut self, sql: &str) -> Result<u64> {
        let changed = self.conn.execute(sql, params![])?;
        Ok(changed as u64)
    }

    fn begin(&mut self) -> Result<()> {
        self.conn.execute_batch("BEGIN;")?;
        Ok(())
    }

    fn commit(&mut self) -> Result<()> {
        self.conn.execute_batch("COMMIT;")?;
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(())
    }

    fn query_count(&mut self, sql: &str) -> Result<i64> {
        Ok(self.conn.query_row(sql, params![], |row| row.get(0))?)
    }

    fn bulk_load(&mut self, statement: &Statement) -> Result<u64> {
        let spec = statement.copy.as_ref().ok_or_else(|| {
            EtlError::load(
                statement.name.clone(),
                "statement does not describe a COPY",
            )
        })?;
        staging::load_copy(&self.conn, spec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ALL_TABLES, USERS_TABLE};

    fn create_all(warehouse: &mut SqliteWarehouse) {
        for table in ALL_TABLES {
            warehouse.execute(&table.create_sql(Dialect::Sqlite)).unwrap();
        }
    }

    #[test]
    fn test_create_and_validate_schema() {
        let mut warehouse = SqliteWarehouse::open_in_memory().unwrap();
        create_all(&mut warehouse);

        warehouse.validate_schema(ALL_TABLES).unwrap();
        assert_eq!(
            warehouse.list_tables().unwrap(),
            vec![
                "artists",
                "songplays",
                "songs",
                "staging_events",
                "staging_songs",
                "time",
                "users"
            ]
        );
    }

    #[test]
    fn test_validate_detects_missing_table() {
        let warehouse = SqliteWarehouse::open_in_memory().unwrap();
        assert!(warehouse.validate_schema(&[USERS_TABLE]).is_err());
    }

    #[test]
    fn test_validate_detects_column_mismatch() {
        let mut warehouse = SqliteWarehouse::open_in_memory().unwrap();
        warehouse
            .execute("CREATE TABLE users (user_id INTEGER PRIMARY KEY, first_name TEXT);")
            .unwrap();
        let err = warehouse.validate_schema(&[USERS_TABLE]).unwrap_err();
        assert!(err.to_string().contains("has 2 columns, expected 5"));
    }

    #[test]
    fn test_rollback_discards_changes() {
        let mut warehouse = SqliteWarehouse::open_in_memory().unwrap();
        create_all(&mut warehouse);

        warehouse.begin().unwrap();
        warehouse
            .execute("INSERT INTO users (user_id, level) VALUES (1, 'free');")
            .unwrap();
        warehouse.rollback().unwrap();
        assert_eq!(warehouse.query_count("SELECT COUNT(*) FROM users;").unwrap(), 0);

        warehouse.begin().unwrap();
        let inserted = warehouse
            .execute("INSERT INTO users (user_id, level) VALUES (1, 'free');")
            .unwrap();
        warehouse.commit().unwrap();
        assert_eq!(inserted, 1);
        assert_eq!(warehouse.query_count("SELECT COUNT(*) FROM users;").unwrap(), 1);
    }

    #[test]
    fn test_bulk_load_requires_copy_spec() {
        let mut warehouse = SqliteWarehouse::open_in_memory().unwrap();
        let statement = Statement {
            name: "not_a_copy".to_string(),
            sql: "SELECT 1;".to_string(),
            copy: None,
        };
        assert!(matches!(
            warehouse.bulk_load(&statement),
            Err(EtlError::Load { .. })
        ));
    }
}
