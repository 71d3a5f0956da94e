use anyhow::{anyhow, bail, Context, Result};
use ini::{Ini, ParseOption};
use serde::Deserialize;
use std::path::Path;

/// Raw contents of the `dwh.cfg` file. Every field is optional here,
/// [`super::EtlConfig::resolve`] decides what is actually required.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    #[serde(rename = "CLUSTER", alias = "cluster")]
    pub cluster: Option<ClusterConfig>,
    #[serde(rename = "IAM_ROLE", alias = "iam_role")]
    pub iam_role: Option<IamRoleConfig>,
    #[serde(rename = "S3", alias = "s3")]
    pub s3: Option<S3Config>,
    #[serde(rename = "WAREHOUSE", alias = "warehouse")]
    pub warehouse: Option<WarehouseConfig>,
    #[serde(rename = "PIPELINE", alias = "pipeline")]
    pub pipeline: Option<PipelineConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct ClusterConfig {
    #[serde(rename = "HOST", alias = "host")]
    pub host: Option<String>,
    #[serde(rename = "DB_NAME", alias = "db_name")]
    pub db_name: Option<String>,
    #[serde(rename = "DB_USER", alias = "db_user")]
    pub db_user: Option<String>,
    #[serde(rename = "DB_PASSWORD", alias = "db_password")]
    pub db_password: Option<String>,
    #[serde(rename = "DB_PORT", alias = "db_port")]
    pub db_port: Option<PortValue>,
    /// libpq-style `sslmode`, defaults to "prefer"
    #[serde(rename = "SSLMODE", alias = "sslmode")]
    pub sslmode: Option<String>,
}

/// `DB_PORT = 5439` and `DB_PORT = '5439'` are both accepted.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum PortValue {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct IamRoleConfig {
    #[serde(rename = "ARN", alias = "arn")]
    pub arn: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct S3Config {
    #[serde(rename = "LOG_DATA", alias = "log_data")]
    pub log_data: Option<String>,
    #[serde(rename = "LOG_JSONPATH", alias = "log_jsonpath")]
    pub log_jsonpath: Option<String>,
    #[serde(rename = "SONG_DATA", alias = "song_data")]
    pub song_data: Option<String>,
    #[serde(rename = "REGION", alias = "region")]
    pub region: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct WarehouseConfig {
    /// Warehouse backend: "redshift" or "sqlite"
    pub backend: Option<String>,
    pub sqlite_path: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PipelineConfig {
    /// "statement" or "phase"
    pub commit_mode: Option<String>,
    pub legacy_time_reinsert: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// TOML first. Files in the classic INI form, with bare values and keys
    /// in any case, are read through the INI parser instead.
    pub fn parse(content: &str) -> Result<Self> {
        match toml::from_str(content) {
            Ok(config) => Ok(config),
            Err(toml_err) => Self::parse_ini(content).map_err(|ini_err| {
                anyhow!(
                    "neither TOML ({}) nor INI ({})",
                    toml_err.message(),
                    ini_err
                )
            }),
        }
    }

    fn parse_ini(content: &str) -> Result<Self> {
        let options = ParseOption {
            enabled_quote: false,
            enabled_escape: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(content, options)?;

        let mut root = toml::Table::new();
        for (section, properties) in ini.iter() {
            let Some(section) = section else {
                if properties.is_empty() {
                    continue;
                }
                bail!("key outside of any [SECTION]");
            };
            let mut table = toml::Table::new();
            for (key, value) in properties.iter() {
                let key = key.trim().to_lowercase();
                let value = ini_value(&key, value.trim())?;
                table.insert(key, value);
            }
            root.insert(section.trim().to_lowercase(), toml::Value::Table(table));
        }
        Ok(toml::Value::Table(root).try_into()?)
    }
}

/// INI values are all text; the one boolean key is converted here.
fn ini_value(key: &str, raw: &str) -> Result<toml::Value> {
    if key != "legacy_time_reinsert" {
        return Ok(toml::Value::String(raw.to_string()));
    }
    match raw.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Ok(toml::Value::Boolean(true)),
        "0" | "no" | "false" | "off" => Ok(toml::Value::Boolean(false)),
        _ => bail!("legacy_time_reinsert is not a boolean: '{}'", raw),
    }
}
