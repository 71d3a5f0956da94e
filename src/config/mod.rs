mod file_config;

pub use file_config::{
    ClusterConfig, FileConfig, IamRoleConfig, PipelineConfig, PortValue, S3Config,
    WarehouseConfig,
};

use crate::error::{EtlError, Result};
use crate::pipeline::CommitMode;
use crate::sql::Dialect;
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_CONFIG_FILE: &str = "dwh.cfg";

/// Connection parameters for the Redshift cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSettings {
    pub host: String,
    pub db_name: String,
    pub user: String,
    pub password: String,
    pub port: u16,
    pub ssl_mode: SslMode,
}

/// TLS negotiation with the cluster, named as in libpq's `sslmode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SslMode {
    Disable,
    Allow,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

/// Where the two raw datasets live.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceSettings {
    pub log_data: String,
    /// JSONPaths file for the event logs, `None` means `auto ignorecase`.
    pub log_jsonpath: Option<String>,
    pub song_data: String,
    pub region: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Redshift(ClusterSettings),
    Sqlite(PathBuf),
}

impl Backend {
    pub fn dialect(&self) -> Dialect {
        match self {
            Backend::Redshift(_) => Dialect::Redshift,
            Backend::Sqlite(_) => Dialect::Sqlite,
        }
    }
}

/// CLI arguments that can be used for config resolution.
/// Present values override the file.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub commit_mode: Option<CommitMode>,
    pub legacy_time_reinsert: bool,
}

#[derive(Debug, Clone)]
pub struct EtlConfig {
    pub backend: Backend,
    pub iam_role_arn: Option<String>,
    pub sources: SourceSettings,
    pub commit_mode: CommitMode,
    pub legacy_time_reinsert: bool,
}

impl EtlConfig {
    /// Resolve configuration from CLI arguments and the parsed file.
    pub fn resolve(cli: &CliConfig, file: FileConfig) -> Result<Self> {
        let warehouse = file.warehouse.unwrap_or_default();
        let backend_name = warehouse
            .backend
            .as_deref()
            .map(|s| s.trim().to_lowercase())
            .unwrap_or_else(|| "redshift".to_string());

        let backend = match backend_name.as_str() {
            "redshift" => {
                let cluster = file
                    .cluster
                    .ok_or_else(|| EtlError::config("missing [CLUSTER] section"))?;
                Backend::Redshift(resolve_cluster(cluster)?)
            }
            "sqlite" => {
                let path = warehouse
                    .sqlite_path
                    .as_deref()
                    .map(strip_wrapping_quotes)
                    .filter(|s| !s.is_empty())
                    .ok_or_else(|| {
                        EtlError::config("WAREHOUSE.sqlite_path is required for the sqlite backend")
                    })?;
                Backend::Sqlite(PathBuf::from(path))
            }
            other => {
                return Err(EtlError::config(format!(
                    "unknown warehouse backend '{}', expected 'redshift' or 'sqlite'",
                    other
                )))
            }
        };

        let iam_role_arn = file
            .iam_role
            .and_then(|role| role.arn)
            .map(|arn| strip_wrapping_quotes(&arn).to_string())
            .filter(|arn| !arn.is_empty());
        if matches!(backend, Backend::Redshift(_)) && iam_role_arn.is_none() {
            return Err(EtlError::config("missing IAM_ROLE.ARN"));
        }

        let s3 = file
            .s3
            .ok_or_else(|| EtlError::config("missing [S3] section"))?;
        let sources = SourceSettings {
            log_data: required(s3.log_data, "S3.LOG_DATA")?,
            log_jsonpath: s3
                .log_jsonpath
                .map(|p| strip_wrapping_quotes(&p).to_string())
                .filter(|p| !p.is_empty()),
            song_data: required(s3.song_data, "S3.SONG_DATA")?,
            region: s3
                .region
                .map(|r| strip_wrapping_quotes(&r).to_string())
                .filter(|r| !r.is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
        };

        let pipeline = file.pipeline.unwrap_or_default();
        let commit_mode = match (cli.commit_mode, pipeline.commit_mode) {
            (Some(mode), _) => mode,
            (None, Some(raw)) => parse_commit_mode(&raw).ok_or_else(|| {
                EtlError::config(format!(
                    "invalid PIPELINE.commit_mode '{}', expected 'statement' or 'phase'",
                    raw
                ))
            })?,
            (None, None) => CommitMode::default(),
        };
        let legacy_time_reinsert =
            cli.legacy_time_reinsert || pipeline.legacy_time_reinsert.unwrap_or(false);

        Ok(EtlConfig {
            backend,
            iam_role_arn,
            sources,
            commit_mode,
            legacy_time_reinsert,
        })
    }
}

fn resolve_cluster(cluster: ClusterConfig) -> Result<ClusterSettings> {
    let port = match cluster.db_port {
        Some(PortValue::Number(n)) => u16::try_from(n)
            .map_err(|_| EtlError::config(format!("CLUSTER.DB_PORT out of range: {}", n)))?,
        Some(PortValue::Text(s)) => strip_wrapping_quotes(&s)
            .parse::<u16>()
            .map_err(|_| EtlError::config(format!("CLUSTER.DB_PORT is not a port: '{}'", s)))?,
        None => return Err(EtlError::config("missing CLUSTER.DB_PORT")),
    };
    let ssl_mode = match cluster.sslmode.as_deref().map(strip_wrapping_quotes) {
        None | Some("") => SslMode::default(),
        Some(raw) => SslMode::from_str(raw, true).map_err(|_| {
            EtlError::config(format!(
                "invalid CLUSTER.SSLMODE '{}', expected one of disable, allow, prefer, require, verify-ca, verify-full",
                raw
            ))
        })?,
    };
    Ok(ClusterSettings {
        host: required(cluster.host, "CLUSTER.HOST")?,
        db_name: required(cluster.db_name, "CLUSTER.DB_NAME")?,
        user: required(cluster.db_user, "CLUSTER.DB_USER")?,
        password: required(cluster.db_password, "CLUSTER.DB_PASSWORD")?,
        port,
        ssl_mode,
    })
}

fn required(value: Option<String>, key: &str) -> Result<String> {
    value
        .map(|v| strip_wrapping_quotes(&v).to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| EtlError::config(format!("missing {}", key)))
}

pub fn parse_commit_mode(s: &str) -> Option<CommitMode> {
    CommitMode::from_str(s.trim(), true).ok()
}

/// `dwh.cfg` files traditionally carry values like `'s3://bucket/path'`
/// with the quotes as part of the value.
pub fn strip_wrapping_quotes(s: &str) -> &str {
    let s = s.trim();
    for quote in ['\'', '"'] {
        if s.len() >= 2 && s.starts_with(quote) && s.ends_with(quote) {
            return &s[1..s.len() - 1];
        }
    }
    s
}
