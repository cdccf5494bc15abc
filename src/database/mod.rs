use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub mod postgres;
pub mod queries;
pub mod snapshot;
pub mod sqlite;

use crate::db::models::{
    ColumnInfo, ForeignKeyInfo, IndexInfo, PrimaryKeyInfo, SchemaSnapshot, TableStructure,
};
use crate::error::{ConfigError, SchemaReadError};

/// Read-only access to a database's structural metadata.
///
/// Every per-table method fails with [`SchemaReadError::TableNotFound`] when
/// the table does not exist; only `has_table` answers that question without
/// failing.
#[async_trait]
pub trait SchemaInspector: Send + Sync {
    /// Whether a base table with this name exists
    async fn has_table(&self, table: &str) -> Result<bool, SchemaReadError>;

    /// Columns of a table keyed by column name
    async fn get_columns(&self, table: &str)
        -> Result<HashMap<String, ColumnInfo>, SchemaReadError>;

    async fn get_primary_key(&self, table: &str)
        -> Result<Option<PrimaryKeyInfo>, SchemaReadError>;

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, SchemaReadError>;

    async fn get_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, SchemaReadError>;

    /// Get the structure of a table (columns, primary key, foreign keys, indexes)
    async fn get_table_structure(&self, table: &str) -> Result<TableStructure, SchemaReadError> {
        let mut columns: Vec<ColumnInfo> = self.get_columns(table).await?.into_values().collect();
        columns.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(TableStructure {
            name: table.to_string(),
            columns,
            primary_key: self.get_primary_key(table).await?,
            foreign_keys: self.get_foreign_keys(table).await?,
            indexes: self.get_indexes(table).await?,
        })
    }

    /// Record the structure of every listed table that exists
    async fn snapshot(&self, tables: &[&str]) -> Result<SchemaSnapshot, SchemaReadError> {
        let mut snapshot = SchemaSnapshot::default();
        for table in tables {
            if self.has_table(table).await? {
                snapshot.tables.push(self.get_table_structure(table).await?);
            }
        }
        Ok(snapshot)
    }
}

/// Configuration for Postgres connections
#[derive(Clone, Debug)]
pub struct PostgresConfig {
    pub host: String,
    pub port: i64,
    pub database: String,
    pub username: String,
    pub password: String,
    pub ssl: bool,
    /// Schema the RBAC tables live in
    pub schema: String,
}

/// Configuration for SQLite connections
#[derive(Clone, Debug)]
pub struct SqliteConfig {
    pub file_path: String,
}

/// Database engines the schema model knows expectations for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseType {
    Sqlite,
    Postgres,
    Mysql,
    Oracle,
}

impl FromStr for DatabaseType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(DatabaseType::Sqlite),
            "postgres" | "postgresql" | "pgsql" => Ok(DatabaseType::Postgres),
            "mysql" | "mariadb" => Ok(DatabaseType::Mysql),
            "oracle" | "oci" => Ok(DatabaseType::Oracle),
            _ => Err(ConfigError::UnsupportedEngine(s.to_string())),
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatabaseType::Sqlite => "sqlite",
            DatabaseType::Postgres => "postgres",
            DatabaseType::Mysql => "mysql",
            DatabaseType::Oracle => "oracle",
        })
    }
}
