use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::{PostgresConfig, SchemaInspector};
use crate::database::queries::postgres::{
    COLUMNS_QUERY, FOREIGN_KEYS_QUERY, INDEXES_QUERY, PRIMARY_KEY_QUERY, TABLE_EXISTS_QUERY,
};
use crate::db::models::{
    ColumnInfo, ColumnType, ForeignKeyInfo, IndexInfo, PrimaryKeyInfo, ReferentialAction,
};
use crate::error::SchemaReadError;

pub struct PostgresInspector {
    config: PostgresConfig,
    pool: Arc<RwLock<Option<PgPool>>>,
}

impl PostgresInspector {
    pub fn new(config: PostgresConfig) -> Self {
        Self {
            config,
            pool: Arc::new(RwLock::new(None)),
        }
    }

    /// Inspects `schema` through an already open pool.
    pub fn with_pool(pool: PgPool, schema: impl Into<String>) -> Self {
        let config = PostgresConfig {
            host: String::new(),
            port: 5432,
            database: String::new(),
            username: String::new(),
            password: String::new(),
            ssl: false,
            schema: schema.into(),
        };
        Self {
            config,
            pool: Arc::new(RwLock::new(Some(pool))),
        }
    }

    pub fn schema(&self) -> &str {
        &self.config.schema
    }

    fn build_connection_string(&self) -> String {
        let ssl_mode = if self.config.ssl {
            "require"
        } else {
            "disable"
        };
        format!(
            "postgres://{}:{}@{}:{}/{}?sslmode={}",
            self.config.username,
            self.config.password,
            self.config.host,
            self.config.port,
            self.config.database,
            ssl_mode
        )
    }

    async fn create_pool(&self) -> Result<PgPool, SchemaReadError> {
        let conn_str = self.build_connection_string();
        let connection_error = |message: String| SchemaReadError::Connection {
            engine: "postgres".to_string(),
            message,
        };

        match tokio::time::timeout(
            std::time::Duration::from_secs(15),
            PgPoolOptions::new()
                .max_connections(2)
                .acquire_timeout(std::time::Duration::from_secs(30))
                .connect(&conn_str),
        )
        .await
        {
            Ok(Ok(pool)) => {
                info!(
                    host = %self.config.host,
                    database = %self.config.database,
                    schema = %self.config.schema,
                    "connected to postgres for inspection"
                );
                Ok(pool)
            }
            Ok(Err(e)) => Err(connection_error(e.to_string())),
            Err(_) => {
                warn!(host = %self.config.host, "postgres connection timed out");
                Err(connection_error(
                    "connection timed out after 15 seconds".to_string(),
                ))
            }
        }
    }

    async fn get_pool(&self) -> Result<PgPool, SchemaReadError> {
        {
            let pool_guard = self.pool.read().await;
            if let Some(ref pool) = *pool_guard {
                return Ok(pool.clone());
            }
        }

        let mut pool_guard = self.pool.write().await;
        if let Some(ref pool) = *pool_guard {
            return Ok(pool.clone());
        }

        let new_pool = self.create_pool().await?;
        *pool_guard = Some(new_pool.clone());
        Ok(new_pool)
    }

    async fn table_exists(&self, pool: &PgPool, table: &str) -> Result<bool, SchemaReadError> {
        sqlx::query_scalar::<_, bool>(TABLE_EXISTS_QUERY)
            .bind(&self.config.schema)
            .bind(table)
            .fetch_one(pool)
            .await
            .map_err(SchemaReadError::query(table))
    }

    /// Pool for a table that must exist.
    async fn pool_for(&self, table: &str) -> Result<PgPool, SchemaReadError> {
        let pool = self.get_pool().await?;
        if !self.table_exists(&pool, table).await? {
            return Err(SchemaReadError::TableNotFound(table.to_string()));
        }
        Ok(pool)
    }

    fn parse_action(table: &str, code: &str) -> Result<ReferentialAction, SchemaReadError> {
        ReferentialAction::from_pg_code(code).ok_or_else(|| SchemaReadError::UnsupportedMetadata {
            table: table.to_string(),
            what: "referential action code",
            value: code.to_string(),
        })
    }
}

#[async_trait]
impl SchemaInspector for PostgresInspector {
    async fn has_table(&self, table: &str) -> Result<bool, SchemaReadError> {
        let pool = self.get_pool().await?;
        self.table_exists(&pool, table).await
    }

    async fn get_columns(
        &self,
        table: &str,
    ) -> Result<HashMap<String, ColumnInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;
        debug!(schema = %self.config.schema, table, "reading postgres columns");

        let rows = sqlx::query_as::<_, (String, String, Option<i32>, bool)>(COLUMNS_QUERY)
            .bind(&self.config.schema)
            .bind(table)
            .fetch_all(&pool)
            .await
            .map_err(SchemaReadError::query(table))?;

        Ok(rows
            .into_iter()
            .map(|(name, data_type, size, nullable)| {
                let (column_type, _) = ColumnType::parse_declared(&data_type);
                let column = ColumnInfo {
                    name: name.clone(),
                    column_type,
                    size: size.and_then(|s| u32::try_from(s).ok()),
                    nullable,
                    declared_type: data_type,
                };
                (name, column)
            })
            .collect())
    }

    async fn get_primary_key(
        &self,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;

        let rows = sqlx::query_as::<_, (String, String)>(PRIMARY_KEY_QUERY)
            .bind(&self.config.schema)
            .bind(table)
            .fetch_all(&pool)
            .await
            .map_err(SchemaReadError::query(table))?;

        let name = rows.first().map(|(name, _)| name.clone());
        Ok(name.map(|name| PrimaryKeyInfo {
            name: Some(name),
            columns: rows.into_iter().map(|(_, column)| column).collect(),
        }))
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;
        debug!(schema = %self.config.schema, table, "reading postgres foreign keys");

        let rows = sqlx::query_as::<_, (String, Vec<String>, String, Vec<String>, String, String)>(
            FOREIGN_KEYS_QUERY,
        )
        .bind(&self.config.schema)
        .bind(table)
        .fetch_all(&pool)
        .await
        .map_err(SchemaReadError::query(table))?;

        rows.into_iter()
            .map(
                |(name, columns, foreign_table, foreign_columns, on_update, on_delete)| {
                    Ok(ForeignKeyInfo {
                        name: Some(name),
                        columns,
                        foreign_table,
                        foreign_columns,
                        on_update: Self::parse_action(table, &on_update)?,
                        on_delete: Self::parse_action(table, &on_delete)?,
                    })
                },
            )
            .collect()
    }

    async fn get_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;
        debug!(schema = %self.config.schema, table, "reading postgres indexes");

        let rows = sqlx::query_as::<_, (String, Vec<String>, bool, bool)>(INDEXES_QUERY)
            .bind(&self.config.schema)
            .bind(table)
            .fetch_all(&pool)
            .await
            .map_err(SchemaReadError::query(table))?;

        Ok(rows
            .into_iter()
            .map(|(name, columns, unique, primary)| IndexInfo {
                name: Some(name),
                columns,
                unique,
                primary,
            })
            .collect())
    }
}
