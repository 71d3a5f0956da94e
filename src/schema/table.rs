use crate::sql::Dialect;

#[macro_export]
macro_rules! warehouse_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            // Allow unused_mut because the variable is only mutated when optional
            // field assignments are passed to the macro (e.g., `is_primary_key = true`)
            #[allow(unused_mut)]
            let mut column = Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                is_identity: false,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum SqlType {
    Varchar,
    Text,
    Integer,
    Decimal,
    Float,
    Timestamp,
}

impl SqlType {
    pub fn render(&self, dialect: Dialect) -> &'static str {
        match (dialect, self) {
            (Dialect::Redshift, SqlType::Varchar) => "VARCHAR",
            (Dialect::Redshift, SqlType::Text) => "TEXT",
            (Dialect::Redshift, SqlType::Integer) => "INTEGER",
            (Dialect::Redshift, SqlType::Decimal) => "DECIMAL",
            (Dialect::Redshift, SqlType::Float) => "FLOAT",
            (Dialect::Redshift, SqlType::Timestamp) => "TIMESTAMP",
            (Dialect::Sqlite, SqlType::Integer) => "INTEGER",
            (Dialect::Sqlite, SqlType::Decimal | SqlType::Float) => "REAL",
            (Dialect::Sqlite, SqlType::Varchar | SqlType::Text | SqlType::Timestamp) => "TEXT",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub sql_type: SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    /// Auto-incrementing surrogate key, only meaningful on an integer primary key.
    pub is_identity: bool,
}

impl Column {
    fn render(&self, dialect: Dialect) -> String {
        let mut sql = format!("{} {}", self.name, self.sql_type.render(dialect));
        if self.is_identity && dialect == Dialect::Redshift {
            sql.push_str(" IDENTITY(0,1)");
        }
        if self.is_primary_key {
            sql.push_str(" PRIMARY KEY");
        }
        if self.is_identity && dialect == Dialect::Sqlite {
            sql.push_str(" AUTOINCREMENT");
        }
        if self.non_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

#[derive(Debug)]
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
}

impl Table {
    pub fn drop_sql(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.name)
    }

    pub fn create_sql(&self, dialect: Dialect) -> String {
        let columns = self
            .columns
            .iter()
            .map(|column| format!("    {}", column.render(dialect)))
            .collect::<Vec<_>>()
            .join(",\n");
        format!("CREATE TABLE IF NOT EXISTS {}\n(\n{}\n);", self.name, columns)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}
