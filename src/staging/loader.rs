use super::jsonpath::{parse_jsonpaths_file, JsonPath};
use crate::error::{EtlError, Result};
use crate::schema::{find_table, Column, SqlType, Table};
use crate::sql::{CopySpec, JsonFormat, TimeFormat};
use chrono::DateTime;
use rusqlite::types::Value as SqlValue;
use rusqlite::Connection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// How a JSON record is projected onto the table's columns.
enum ColumnMapping {
    ByName { ignore_case: bool },
    ByPath(Vec<JsonPath>),
}

impl ColumnMapping {
    fn for_spec(spec: &CopySpec, table: &Table) -> Result<Self> {
        match &spec.format {
            JsonFormat::Auto => Ok(ColumnMapping::ByName { ignore_case: false }),
            JsonFormat::AutoIgnoreCase => Ok(ColumnMapping::ByName { ignore_case: true }),
            JsonFormat::JsonPaths(uri) => {
                let path = local_path(uri).map_err(|e| EtlError::load(table.name, e))?;
                let content = std::fs::read_to_string(&path).map_err(|e| {
                    EtlError::load(
                        table.name,
                        format!("failed to read JSONPaths file {:?}: {}", path, e),
                    )
                })?;
                let paths =
                    parse_jsonpaths_file(&content).map_err(|e| EtlError::load(table.name, e))?;
                if paths.len() != table.columns.len() {
                    return Err(EtlError::load(
                        table.name,
                        format!(
                            "JSONPaths file has {} expressions but the table has {} columns",
                            paths.len(),
                            table.columns.len()
                        ),
                    ));
                }
                Ok(ColumnMapping::ByPath(paths))
            }
        }
    }

    fn extract<'a>(&self, record: &'a Value, table: &Table) -> Vec<Option<&'a Value>> {
        match self {
            // Unquoted identifiers are folded to lower case by the warehouse,
            // so `auto` only ever matches lower-case field names.
            ColumnMapping::ByName { ignore_case } => {
                let object = record.as_object();
                table
                    .columns
                    .iter()
                    .map(|column| {
                        let wanted = column.name.to_lowercase();
                        object.and_then(|fields| {
                            fields
                                .iter()
                                .find(|(key, _)| {
                                    if *ignore_case {
                                        key.to_lowercase() == wanted
                                    } else {
                                        **key == wanted
                                    }
                                })
                                .map(|(_, value)| value)
                        })
                    })
                    .collect()
            }
            ColumnMapping::ByPath(paths) => paths.iter().map(|path| path.resolve(record)).collect(),
        }
    }
}

/// Accepts `file://` URIs and plain paths. Remote object stores are only
/// reachable from the cluster itself.
fn local_path(uri: &str) -> std::result::Result<PathBuf, String> {
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(PathBuf::from(path));
    }
    if let Some((scheme, _)) = uri.split_once("://") {
        return Err(format!(
            "cannot read '{}' locally: {}:// sources need a Redshift warehouse",
            uri, scheme
        ));
    }
    Ok(PathBuf::from(uri))
}

/// A single file, or every `.json` file below a directory in path order.
fn collect_source_files(source: &Path) -> std::result::Result<Vec<PathBuf>, String> {
    if source.is_file() {
        return Ok(vec![source.to_path_buf()]);
    }
    if !source.is_dir() {
        return Err(format!("source {:?} does not exist", source));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(source).sort_by_file_name() {
        let entry = entry.map_err(|e| format!("failed to walk {:?}: {}", source, e))?;
        let is_json = entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false);
        if entry.file_type().is_file() && is_json {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn format_epoch_millis(millis: i64) -> std::result::Result<String, String> {
    let timestamp = DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| format!("timestamp out of range: {}", millis))?;
    if millis % 1000 == 0 {
        Ok(timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
    } else {
        Ok(timestamp.format("%Y-%m-%d %H:%M:%S%.3f").to_string())
    }
}

fn coerce(
    value: Option<&Value>,
    column: &Column,
    spec: &CopySpec,
) -> std::result::Result<SqlValue, String> {
    let value = match value {
        None | Some(Value::Null) => return Ok(SqlValue::Null),
        Some(value) => value,
    };

    if let Value::String(s) = value {
        if (spec.empty_as_null && s.is_empty()) || (spec.blanks_as_null && s.trim().is_empty()) {
            return Ok(SqlValue::Null);
        }
    }

    match column.sql_type {
        SqlType::Integer => match value {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64))
                .map(SqlValue::Integer)
                .ok_or_else(|| format!("{} is not an integer for column {}", n, column.name)),
            Value::String(s) => s
                .trim()
                .parse::<i64>()
                .map(SqlValue::Integer)
                .map_err(|_| format!("'{}' is not an integer for column {}", s, column.name)),
            other => Err(format!(
                "{} is not an integer for column {}",
                other, column.name
            )),
        },
        SqlType::Decimal | SqlType::Float => match value {
            Value::Number(n) => n
                .as_f64()
                .map(SqlValue::Real)
                .ok_or_else(|| format!("{} is not a number for column {}", n, column.name)),
            Value::String(s) => s
                .trim()
                .parse::<f64>()
                .map(SqlValue::Real)
                .map_err(|_| format!("'{}' is not a number for column {}", s, column.name)),
            other => Err(format!("{} is not a number for column {}", other, column.name)),
        },
        SqlType::Timestamp => match (value, spec.time_format) {
            (Value::Number(n), Some(TimeFormat::EpochMillisecs)) => {
                let millis = n
                    .as_i64()
                    .or_else(|| n.as_f64().map(|f| f.round() as i64))
                    .ok_or_else(|| format!("{} is not an epoch timestamp", n))?;
                format_epoch_millis(millis).map(SqlValue::Text)
            }
            (Value::String(s), Some(TimeFormat::EpochMillisecs)) if s.trim().parse::<i64>().is_ok() => {
                let millis = s.trim().parse::<i64>().map_err(|e| e.to_string())?;
                format_epoch_millis(millis).map(SqlValue::Text)
            }
            (Value::String(s), _) => Ok(SqlValue::Text(s.clone())),
            (other, _) => Err(format!(
                "{} is not a timestamp for column {}",
                other, column.name
            )),
        },
        SqlType::Varchar | SqlType::Text => match value {
            Value::String(s) => Ok(SqlValue::Text(s.clone())),
            other => Ok(SqlValue::Text(other.to_string())),
        },
    }
}

/// Load the rows described by a COPY statement from local JSON files.
pub fn load_copy(conn: &Connection, spec: &CopySpec) -> Result<u64> {
    let table = find_table(spec.table)
        .ok_or_else(|| EtlError::load(spec.table, "not a staging table"))?;
    let source = local_path(&spec.source).map_err(|e| EtlError::load(table.name, e))?;
    let mapping = ColumnMapping::for_spec(spec, table)?;
    let files = collect_source_files(&source).map_err(|e| EtlError::load(table.name, e))?;

    let placeholders = (1..=table.columns.len())
        .map(|i| format!("?{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let insert_sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        table.column_names().join(", "),
        placeholders
    );
    let mut stmt = conn.prepare(&insert_sql)?;

    let mut loaded = 0u64;
    for file in &files {
        debug!("Loading {:?} into {}", file, table.name);
        let content = std::fs::read_to_string(file).map_err(|e| {
            EtlError::load(table.name, format!("failed to read {:?}: {}", file, e))
        })?;

        for (index, record) in serde_json::Deserializer::from_str(&content)
            .into_iter::<Value>()
            .enumerate()
        {
            let record = record.map_err(|e| {
                EtlError::load(
                    table.name,
                    format!("malformed JSON in {:?}, record {}: {}", file, index + 1, e),
                )
            })?;
            if !record.is_object() {
                return Err(EtlError::load(
                    table.name,
                    format!("{:?}, record {} is not a JSON object", file, index + 1),
                ));
            }
            let values = mapping
                .extract(&record, table)
                .into_iter()
                .zip(table.columns.iter())
                .map(|(value, column)| coerce(value, column, spec))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map_err(|e| {
                    EtlError::load(
                        table.name,
                        format!("{:?}, record {}: {}", file, index + 1, e),
                    )
                })?;
            stmt.execute(rusqlite::params_from_iter(values))?;
            loaded += 1;
        }
    }

    info!(
        "Loaded {} rows into {} from {} files",
        loaded,
        table.name,
        files.len()
    );
    Ok(loaded)
}
