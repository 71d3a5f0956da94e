//! Error kinds surfaced by the pipeline.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Every failure aborts the run; nothing here is retried.
#[derive(Debug, Error)]
pub enum EtlError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Failed to connect to warehouse: {source}")]
    Connection {
        #[source]
        source: BoxError,
    },

    #[error("Statement '{name}' failed: {source}")]
    Statement {
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("Bulk load into {table} failed: {message}")]
    Load { table: String, message: String },

    #[error("Schema validation failed: {message}")]
    Schema { message: String },

    #[error("Refusing to quote unsafe literal {value:?}")]
    UnsafeLiteral { value: String },

    #[error("Database error: {0}")]
    Database(#[source] BoxError),
}

impl EtlError {
    pub fn config(message: impl Into<String>) -> Self {
        EtlError::Config {
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        EtlError::Schema {
            message: message.into(),
        }
    }

    pub fn load(table: impl Into<String>, message: impl Into<String>) -> Self {
        EtlError::Load {
            table: table.into(),
            message: message.into(),
        }
    }

    pub fn statement<E>(name: impl Into<String>, source: E) -> Self
    where
        E: Into<BoxError>,
    {
        EtlError::Statement {
            name: name.into(),
            source: source.into(),
        }
    }
}

impl From<rusqlite::Error> for EtlError {
    fn from(err: rusqlite::Error) -> Self {
        EtlError::Database(Box::new(err))
    }
}

impl From<sqlx::Error> for EtlError {
    fn from(err: sqlx::Error) -> Self {
        EtlError::Database(Box::new(err))
    }
}

pub type Result<T, E = EtlError> = std::result::Result<T, E>;
