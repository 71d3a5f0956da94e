//! Runs the catalog's statement lists against a warehouse, phase by phase.

use crate::error::{EtlError, Result};
use crate::schema::ALL_TABLES;
use crate::sql::{transform, Statement, StatementCatalog};
use crate::warehouse::Warehouse;
use std::fmt;
use tracing::{debug, info, warn};

/// Transaction granularity used while running a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CommitMode {
    /// Commit after every statement. A failure leaves earlier statements applied.
    #[default]
    #[value(name = "statement")]
    PerStatement,
    /// One transaction per phase, rolled back as a whole on failure.
    #[value(name = "phase")]
    PerPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    DropTables,
    CreateTables,
    LoadStaging,
    InsertTables,
}

impl Phase {
    /// COPY and INSERT text is logged at info level, DDL only at debug.
    fn logs_sql(&self) -> bool {
        matches!(self, Phase::LoadStaging | Phase::InsertTables)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::DropTables => "drop tables",
            Phase::CreateTables => "create tables",
            Phase::LoadStaging => "load staging tables",
            Phase::InsertTables => "insert tables",
        };
        f.write_str(name)
    }
}

/// Row counts per table, in schema order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TableCounts {
    pub counts: Vec<(&'static str, i64)>,
}

impl TableCounts {
    pub fn get(&self, table: &str) -> Option<i64> {
        self.counts
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, count)| *count)
    }
}

fn execute_statement(
    warehouse: &mut dyn Warehouse,
    phase: Phase,
    statement: &Statement,
) -> Result<u64> {
    if phase.logs_sql() {
        info!("{}:\n{}", statement.name, statement.sql);
    } else {
        debug!("{}:\n{}", statement.name, statement.sql);
    }

    let result = match &statement.copy {
        Some(_) => warehouse.bulk_load(statement),
        None => warehouse.execute(&statement.sql),
    };
    let rows = result.map_err(|e| EtlError::statement(statement.name.clone(), e))?;
    debug!("{} affected {} rows", statement.name, rows);
    Ok(rows)
}

/// Roll back after a failed statement. The original failure is what gets
/// reported, a rollback error is only logged.
fn rollback_after_failure(warehouse: &mut dyn Warehouse, phase: Phase) {
    if let Err(e) = warehouse.rollback() {
        warn!("Rollback of {} failed: {}", phase, e);
    }
}

/// Execute statements in order, stopping at the first failure. Returns the
/// total number of affected rows.
pub fn run_statements(
    warehouse: &mut dyn Warehouse,
    phase: Phase,
    statements: &[Statement],
    commit_mode: CommitMode,
) -> Result<u64> {
    info!(
        "Running {} ({} statements, {:?})",
        phase,
        statements.len(),
        commit_mode
    );

    let mut total = 0u64;
    match commit_mode {
        CommitMode::PerStatement => {
            for statement in statements {
                warehouse.begin()?;
                match execute_statement(warehouse, phase, statement) {
                    Ok(rows) => {
                        warehouse.commit()?;
                        total += rows;
                    }
                    Err(e) => {
                        rollback_after_failure(warehouse, phase);
                        return Err(e);
                    }
                }
            }
        }
        CommitMode::PerPhase => {
            warehouse.begin()?;
            for statement in statements {
                match execute_statement(warehouse, phase, statement) {
                    Ok(rows) => total += rows,
                    Err(e) => {
                        rollback_after_failure(warehouse, phase);
                        return Err(e);
                    }
                }
            }
            warehouse.commit()?;
        }
    }
    Ok(total)
}

/// Drop every table, then create them again, empty.
pub fn reset_schema(
    warehouse: &mut dyn Warehouse,
    catalog: &StatementCatalog,
    commit_mode: CommitMode,
) -> Result<()> {
    run_statements(warehouse, Phase::DropTables, &catalog.drops, commit_mode)?;
    run_statements(warehouse, Phase::CreateTables, &catalog.creates, commit_mode)?;
    info!("Schema reset, {} tables created", catalog.creates.len());
    Ok(())
}

pub fn create_tables(
    warehouse: &mut dyn Warehouse,
    catalog: &StatementCatalog,
    commit_mode: CommitMode,
) -> Result<()> {
    reset_schema(warehouse, catalog, commit_mode)
}

pub fn load_staging_tables(
    warehouse: &mut dyn Warehouse,
    catalog: &StatementCatalog,
    commit_mode: CommitMode,
) -> Result<u64> {
    let rows = run_statements(warehouse, Phase::LoadStaging, &catalog.copies, commit_mode)?;
    info!("Loaded {} staging rows", rows);
    Ok(rows)
}

pub fn insert_tables(
    warehouse: &mut dyn Warehouse,
    catalog: &StatementCatalog,
    commit_mode: CommitMode,
) -> Result<u64> {
    // users keeps one row per id, so a level change only survives as the latest level
    let conflicted = warehouse.query_count(&transform::user_level_conflicts_query())?;
    if conflicted > 0 {
        warn!(
            "{} users changed subscription level, keeping the level of their latest event",
            conflicted
        );
    }

    let rows = run_statements(warehouse, Phase::InsertTables, &catalog.inserts, commit_mode)?;
    info!("Inserted {} rows into the star schema", rows);
    Ok(rows)
}

/// Count the rows of every table and log the summary.
pub fn report(warehouse: &mut dyn Warehouse) -> Result<TableCounts> {
    let mut counts = Vec::with_capacity(ALL_TABLES.len());
    for table in ALL_TABLES {
        let count = warehouse.query_count(&transform::row_count_query(table.name))?;
        counts.push((table.name, count));
    }

    info!("Table row counts:");
    for (name, count) in &counts {
        info!("- {}: {}", name, count);
    }
    Ok(TableCounts { counts })
}

/// Load staging, populate the star schema and report the resulting counts.
pub fn run_etl(
    warehouse: &mut dyn Warehouse,
    catalog: &StatementCatalog,
    commit_mode: CommitMode,
) -> Result<TableCounts> {
    load_staging_tables(warehouse, catalog, commit_mode)?;
    insert_tables(warehouse, catalog, commit_mode)?;
    report(warehouse)
}
