//! COPY bulk-load statements.

use super::quote::quote_literal;
use crate::error::Result;

/// How JSON fields are mapped onto the target table's columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonFormat {
    /// Field names must equal column names.
    Auto,
    /// Field names match column names case-insensitively.
    AutoIgnoreCase,
    /// A JSONPaths file lists one path expression per column, in column order.
    JsonPaths(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    EpochMillisecs,
}

/// Everything a COPY statement says, kept as data so that backends which
/// cannot run COPY server side can still honour it.
#[derive(Debug, Clone, PartialEq)]
pub struct CopySpec {
    pub table: &'static str,
    pub source: String,
    pub iam_role: Option<String>,
    pub format: JsonFormat,
    pub region: String,
    pub time_format: Option<TimeFormat>,
    pub truncate_columns: bool,
    pub blanks_as_null: bool,
    pub empty_as_null: bool,
}

impl CopySpec {
    pub fn to_sql(&self) -> Result<String> {
        let mut sql = format!("COPY {}\nFROM {}\n", self.table, quote_literal(&self.source)?);
        if let Some(role) = &self.iam_role {
            sql.push_str(&format!("IAM_ROLE {}\n", quote_literal(role)?));
        }
        let format = match &self.format {
            JsonFormat::Auto => quote_literal("auto")?,
            JsonFormat::AutoIgnoreCase => quote_literal("auto ignorecase")?,
            JsonFormat::JsonPaths(path) => quote_literal(path)?,
        };
        sql.push_str(&format!("JSON {}\n", format));
        sql.push_str(&format!("REGION {}\n", quote_literal(&self.region)?));
        if let Some(TimeFormat::EpochMillisecs) = self.time_format {
            sql.push_str("TIMEFORMAT AS 'epochmillisecs'\n");
        }

        let flags = [
            (self.truncate_columns, "TRUNCATECOLUMNS"),
            (self.blanks_as_null, "BLANKSASNULL"),
            (self.empty_as_null, "EMPTYASNULL"),
        ]
        .iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, flag)| *flag)
        .collect::<Vec<_>>();
        if flags.is_empty() {
            // drop the trailing newline so the terminator sits on the last clause
            sql.pop();
        } else {
            sql.push_str(&flags.join(" "));
        }
        sql.push(';');
        Ok(sql)
    }
}
