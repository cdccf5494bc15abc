use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{SchemaInspector, SqliteConfig};
use crate::database::queries::sqlite::{
    COLUMNS_QUERY, FOREIGN_KEYS_QUERY, INDEXES_QUERY, INDEX_COLUMNS_QUERY, TABLE_EXISTS_QUERY,
};
use crate::db::models::{
    ColumnInfo, ColumnType, ForeignKeyInfo, IndexInfo, PrimaryKeyInfo, ReferentialAction,
    EXPRESSION_MEMBER,
};
use crate::error::SchemaReadError;

pub struct SqliteInspector {
    config: Option<SqliteConfig>,
    pool: RwLock<Option<SqlitePool>>,
}

impl SqliteInspector {
    /// Inspects the database file named in `config`, opened read-only on first use.
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config: Some(config),
            pool: RwLock::new(None),
        }
    }

    /// Inspects through an already open pool.
    pub fn with_pool(pool: SqlitePool) -> Self {
        Self {
            config: None,
            pool: RwLock::new(Some(pool)),
        }
    }

    fn connection_string(config: &SqliteConfig) -> String {
        format!("sqlite:{}?mode=ro", config.file_path)
    }

    async fn get_pool(&self) -> Result<SqlitePool, SchemaReadError> {
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

        let config = self.config.as_ref().ok_or_else(|| SchemaReadError::Connection {
            engine: "sqlite".to_string(),
            message: "no database file configured".to_string(),
        })?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(&Self::connection_string(config))
            .await
            .map_err(|e| SchemaReadError::Connection {
                engine: "sqlite".to_string(),
                message: e.to_string(),
            })?;
        info!(file = %config.file_path, "opened sqlite database for inspection");

        *pool_guard = Some(pool.clone());
        Ok(pool)
    }

    async fn table_exists(pool: &SqlitePool, table: &str) -> Result<bool, SchemaReadError> {
        sqlx::query_scalar::<_, bool>(TABLE_EXISTS_QUERY)
            .bind(table)
            .fetch_one(pool)
            .await
            .map_err(SchemaReadError::query(table))
    }

    /// Pool for a table that must exist.
    async fn pool_for(&self, table: &str) -> Result<SqlitePool, SchemaReadError> {
        let pool = self.get_pool().await?;
        if !Self::table_exists(&pool, table).await? {
            return Err(SchemaReadError::TableNotFound(table.to_string()));
        }
        Ok(pool)
    }

    /// Primary key columns in key order, read from `pragma_table_info`.
    async fn primary_key_columns(
        pool: &SqlitePool,
        table: &str,
    ) -> Result<Vec<String>, SchemaReadError> {
        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(table)
            .fetch_all(pool)
            .await
            .map_err(SchemaReadError::query(table))?;

        let mut keyed = Vec::new();
        for row in &rows {
            let pk: i64 = row.try_get("primary_key").map_err(SchemaReadError::query(table))?;
            if pk > 0 {
                let name: String = row.try_get("column_name").map_err(SchemaReadError::query(table))?;
                keyed.push((pk, name));
            }
        }
        keyed.sort_by_key(|(pk, _)| *pk);
        Ok(keyed.into_iter().map(|(_, name)| name).collect())
    }

    fn parse_action(table: &str, raw: &str) -> Result<ReferentialAction, SchemaReadError> {
        raw.parse().map_err(|value| SchemaReadError::UnsupportedMetadata {
            table: table.to_string(),
            what: "referential action",
            value,
        })
    }
}

#[async_trait]
impl SchemaInspector for SqliteInspector {
    async fn has_table(&self, table: &str) -> Result<bool, SchemaReadError> {
        let pool = self.get_pool().await?;
        Self::table_exists(&pool, table).await
    }

    async fn get_columns(
        &self,
        table: &str,
    ) -> Result<HashMap<String, ColumnInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;
        debug!(table, "reading sqlite columns");

        let rows = sqlx::query(COLUMNS_QUERY)
            .bind(table)
            .fetch_all(&pool)
            .await
            .map_err(SchemaReadError::query(table))?;

        let mut columns = HashMap::new();
        for row in &rows {
            let name: String = row.try_get("column_name").map_err(SchemaReadError::query(table))?;
            // Columns declared without a type report NULL
            let declared_type: String = row
                .try_get::<Option<String>, _>("data_type")
                .map_err(SchemaReadError::query(table))?
                .unwrap_or_default();
            let not_null: i64 = row.try_get("not_null").map_err(SchemaReadError::query(table))?;
            let (column_type, size) = ColumnType::parse_declared(&declared_type);

            columns.insert(
                name.clone(),
                ColumnInfo {
                    name,
                    column_type,
                    size,
                    nullable: not_null == 0,
                    declared_type,
                },
            );
        }

        Ok(columns)
    }

    async fn get_primary_key(
        &self,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;
        let columns = Self::primary_key_columns(&pool, table).await?;

        // SQLite keeps no name for primary key constraints
        Ok((!columns.is_empty()).then_some(PrimaryKeyInfo {
            name: None,
            columns,
        }))
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;
        debug!(table, "reading sqlite foreign keys");

        let rows = sqlx::query(FOREIGN_KEYS_QUERY)
            .bind(table)
            .fetch_all(&pool)
            .await
            .map_err(SchemaReadError::query(table))?;

        // One row per column pair; rows sharing an id form one constraint
        let mut grouped: BTreeMap<i64, (ForeignKeyInfo, bool)> = BTreeMap::new();
        for row in &rows {
            let id: i64 = row.try_get("fk_id").map_err(SchemaReadError::query(table))?;
            let column: String = row.try_get("column_name").map_err(SchemaReadError::query(table))?;
            let references_table: String = row
                .try_get("references_table")
                .map_err(SchemaReadError::query(table))?;
            let references_column: Option<String> = row
                .try_get("references_column")
                .map_err(SchemaReadError::query(table))?;
            let on_update: String = row.try_get("on_update").map_err(SchemaReadError::query(table))?;
            let on_delete: String = row.try_get("on_delete").map_err(SchemaReadError::query(table))?;
            let on_update = Self::parse_action(table, &on_update)?;
            let on_delete = Self::parse_action(table, &on_delete)?;

            let (fk, implicit_target) = grouped.entry(id).or_insert_with(|| {
                (
                    ForeignKeyInfo {
                        name: None,
                        columns: Vec::new(),
                        foreign_table: references_table,
                        foreign_columns: Vec::new(),
                        on_update,
                        on_delete,
                    },
                    false,
                )
            });
            fk.columns.push(column);
            match references_column {
                Some(column) => fk.foreign_columns.push(column),
                None => *implicit_target = true,
            }
        }

        let mut foreign_keys = Vec::with_capacity(grouped.len());
        for (_, (mut fk, implicit_target)) in grouped {
            // `REFERENCES parent` without a column list targets the parent's primary key
            if implicit_target {
                fk.foreign_columns = Self::primary_key_columns(&pool, &fk.foreign_table).await?;
            }
            foreign_keys.push(fk);
        }

        Ok(foreign_keys)
    }

    async fn get_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, SchemaReadError> {
        let pool = self.pool_for(table).await?;
        debug!(table, "reading sqlite indexes");

        let rows = sqlx::query(INDEXES_QUERY)
            .bind(table)
            .fetch_all(&pool)
            .await
            .map_err(SchemaReadError::query(table))?;

        let mut indexes = Vec::with_capacity(rows.len());
        for row in &rows {
            let index_name: String = row.try_get("index_name").map_err(SchemaReadError::query(table))?;
            let is_unique: i64 = row.try_get("is_unique").map_err(SchemaReadError::query(table))?;
            let origin: String = row.try_get("origin").map_err(SchemaReadError::query(table))?;

            // Expression members have no column name
            let columns: Vec<Option<String>> = sqlx::query_scalar(INDEX_COLUMNS_QUERY)
                .bind(&index_name)
                .fetch_all(&pool)
                .await
                .map_err(SchemaReadError::query(table))?;
            let columns = columns
                .into_iter()
                .map(|column| column.unwrap_or_else(|| EXPRESSION_MEMBER.to_string()))
                .collect();

            indexes.push(IndexInfo {
                name: Some(index_name),
                columns,
                unique: is_unique == 1,
                primary: origin == "pk",
            });
        }

        Ok(indexes)
    }
}
