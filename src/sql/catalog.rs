use super::copy::{CopySpec, JsonFormat, TimeFormat};
use super::{transform, Dialect};
use crate::config::EtlConfig;
use crate::error::Result;
use crate::schema::{ALL_TABLES, STAGING_EVENTS_TABLE, STAGING_SONGS_TABLE};

/// A named SQL statement. COPY statements also carry their [`CopySpec`].
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub name: String,
    pub sql: String,
    pub copy: Option<CopySpec>,
}

impl Statement {
    fn sql(name: impl Into<String>, sql: impl Into<String>) -> Self {
        Statement {
            name: name.into(),
            sql: sql.into(),
            copy: None,
        }
    }

    fn copy(name: impl Into<String>, spec: CopySpec) -> Result<Self> {
        Ok(Statement {
            name: name.into(),
            sql: spec.to_sql()?,
            copy: Some(spec),
        })
    }
}

/// Every statement the pipeline runs, in execution order.
#[derive(Debug, Clone)]
pub struct StatementCatalog {
    pub dialect: Dialect,
    pub drops: Vec<Statement>,
    pub creates: Vec<Statement>,
    pub copies: Vec<Statement>,
    pub inserts: Vec<Statement>,
}

impl StatementCatalog {
    /// Build the catalog for the configured backend's dialect.
    pub fn new(config: &EtlConfig) -> Result<Self> {
        Self::for_dialect(config, config.backend.dialect())
    }

    pub fn for_dialect(config: &EtlConfig, dialect: Dialect) -> Result<Self> {
        let drops = ALL_TABLES
            .iter()
            .map(|table| Statement::sql(format!("drop_{}", table.name), table.drop_sql()))
            .collect();
        let creates = ALL_TABLES
            .iter()
            .map(|table| {
                Statement::sql(format!("create_{}", table.name), table.create_sql(dialect))
            })
            .collect();

        let sources = &config.sources;
        let events_format = match &sources.log_jsonpath {
            Some(path) => JsonFormat::JsonPaths(path.clone()),
            None => JsonFormat::AutoIgnoreCase,
        };
        let copies = vec![
            Statement::copy(
                format!("copy_{}", STAGING_EVENTS_TABLE.name),
                CopySpec {
                    table: STAGING_EVENTS_TABLE.name,
                    source: sources.log_data.clone(),
                    iam_role: config.iam_role_arn.clone(),
                    format: events_format,
                    region: sources.region.clone(),
                    time_format: Some(TimeFormat::EpochMillisecs),
                    truncate_columns: false,
                    blanks_as_null: true,
                    empty_as_null: true,
                },
            )?,
            Statement::copy(
                format!("copy_{}", STAGING_SONGS_TABLE.name),
                CopySpec {
                    table: STAGING_SONGS_TABLE.name,
                    source: sources.song_data.clone(),
                    iam_role: config.iam_role_arn.clone(),
                    format: JsonFormat::Auto,
                    region: sources.region.clone(),
                    time_format: None,
                    truncate_columns: true,
                    blanks_as_null: true,
                    empty_as_null: true,
                },
            )?,
        ];

        let mut inserts = vec![
            Statement::sql("insert_time", transform::time_table_insert(dialect)),
            Statement::sql("insert_users", transform::user_table_insert()),
            Statement::sql("insert_songs", transform::song_table_insert()),
            Statement::sql("insert_artists", transform::artist_table_insert()),
        ];
        if config.legacy_time_reinsert {
            inserts.push(Statement::sql(
                "insert_time_again",
                transform::time_table_insert(dialect),
            ));
        }
        inserts.push(Statement::sql(
            "insert_songplays",
            transform::songplay_table_insert(),
        ));

        Ok(StatementCatalog {
            dialect,
            drops,
            creates,
            copies,
            inserts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Backend, ClusterSettings, SourceSettings, SslMode};
    use crate::error::EtlError;
    use crate::pipeline::CommitMode;

    fn redshift_config() -> EtlConfig {
        EtlConfig {
            backend: Backend::Redshift(ClusterSettings {
                host: "localhost".to_string(),
                db_name: "dwh".to_string(),
                user: "dwhuser".to_string(),
                password: "secret".to_string(),
                port: 5439,
                ssl_mode: SslMode::Require,
            }),
            iam_role_arn: Some("arn:aws:iam::123456789012:role/dwhRole".to_string()),
            sources: SourceSettings {
                log_data: "s3://udacity-dend/log_data".to_string(),
                log_jsonpath: Some("s3://udacity-dend/log_json_path.json".to_string()),
                song_data: "s3://udacity-dend/song_data".to_string(),
                region: "us-west-2".to_string(),
            },
            commit_mode: CommitMode::PerStatement,
            legacy_time_reinsert: false,
        }
    }

    fn names(statements: &[Statement]) -> Vec<&str> {
        statements.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn drops_and_creates_cover_all_seven_tables_in_order() {
        let catalog = StatementCatalog::new(&redshift_config()).unwrap();
        assert_eq!(catalog.dialect, Dialect::Redshift);
        assert_eq!(
            names(&catalog.drops),
            vec![
                "drop_staging_events",
                "drop_staging_songs",
                "drop_songplays",
                "drop_users",
                "drop_songs",
                "drop_artists",
                "drop_time",
            ]
        );
        assert_eq!(catalog.creates.len(), 7);
        assert!(catalog.drops[6].sql.contains("DROP TABLE IF EXISTS time;"));
        assert!(catalog.creates[2]
            .sql
            .contains("songplay_id INTEGER IDENTITY(0,1) PRIMARY KEY"));
        assert!(catalog
            .creates
            .iter()
            .all(|s| s.sql.starts_with("CREATE TABLE IF NOT EXISTS")));
    }

    #[test]
    fn copies_render_redshift_options() {
        let catalog = StatementCatalog::new(&redshift_config()).unwrap();
        let events = &catalog.copies[0];
        assert_eq!(events.name, "copy_staging_events");
        assert!(events.sql.contains("FROM 's3://udacity-dend/log_data'"));
        assert!(events
            .sql
            .contains("IAM_ROLE 'arn:aws:iam::123456789012:role/dwhRole'"));
        assert!(events.sql.contains("JSON 's3://udacity-dend/log_json_path.json'"));
        assert!(events.sql.contains("TIMEFORMAT AS 'epochmillisecs'"));

        let songs = &catalog.copies[1];
        assert!(songs.sql.contains("JSON 'auto'"));
        assert!(songs.sql.contains("TRUNCATECOLUMNS BLANKSASNULL EMPTYASNULL;"));
        assert_eq!(songs.copy.as_ref().unwrap().table, "staging_songs");
    }

    #[test]
    fn inserts_follow_declared_order() {
        let catalog = StatementCatalog::new(&redshift_config()).unwrap();
        assert_eq!(
            names(&catalog.inserts),
            vec![
                "insert_time",
                "insert_users",
                "insert_songs",
                "insert_artists",
                "insert_songplays",
            ]
        );
    }

    #[test]
    fn legacy_mode_repeats_time_insert() {
        let mut config = redshift_config();
        config.legacy_time_reinsert = true;
        let catalog = StatementCatalog::new(&config).unwrap();
        assert_eq!(
            names(&catalog.inserts),
            vec![
                "insert_time",
                "insert_users",
                "insert_songs",
                "insert_artists",
                "insert_time_again",
                "insert_songplays",
            ]
        );
        assert_eq!(catalog.inserts[0].sql, catalog.inserts[4].sql);
    }

    #[test]
    fn missing_jsonpath_falls_back_to_auto_ignorecase() {
        let mut config = redshift_config();
        config.sources.log_jsonpath = None;
        let catalog = StatementCatalog::new(&config).unwrap();
        assert!(catalog.copies[0].sql.contains("JSON 'auto ignorecase'"));
    }

    #[test]
    fn unsafe_role_fails_the_build() {
        let mut config = redshift_config();
        config.iam_role_arn = Some("arn:aws:iam::1:role/x\nDROP".to_string());
        assert!(matches!(
            StatementCatalog::new(&config),
            Err(EtlError::UnsafeLiteral { .. })
        ));
    }

    #[test]
    fn sqlite_dialect_renders_portable_ddl() {
        let catalog = StatementCatalog::for_dialect(&redshift_config(), Dialect::Sqlite).unwrap();
        assert!(catalog.creates[2]
            .sql
            .contains("songplay_id INTEGER PRIMARY KEY AUTOINCREMENT"));
        assert!(!catalog.creates.iter().any(|s| s.sql.contains("IDENTITY")));
    }
}
