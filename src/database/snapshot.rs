//! Inspector backed by recorded metadata instead of a live connection.

use std::collections::HashMap;

use async_trait::async_trait;

use super::SchemaInspector;
use crate::db::models::{
    ColumnInfo, ForeignKeyInfo, IndexInfo, PrimaryKeyInfo, SchemaSnapshot, TableStructure,
};
use crate::error::SchemaReadError;

pub struct SnapshotInspector {
    snapshot: SchemaSnapshot,
}

impl SnapshotInspector {
    pub fn new(snapshot: SchemaSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        SchemaSnapshot::from_json(json).map(Self::new)
    }

    fn table(&self, table: &str) -> Result<&TableStructure, SchemaReadError> {
        self.snapshot
            .table(table)
            .ok_or_else(|| SchemaReadError::TableNotFound(table.to_string()))
    }
}

#[async_trait]
impl SchemaInspector for SnapshotInspector {
    async fn has_table(&self, table: &str) -> Result<bool, SchemaReadError> {
        Ok(self.snapshot.table(table).is_some())
    }

    async fn get_columns(
        &self,
        table: &str,
    ) -> Result<HashMap<String, ColumnInfo>, SchemaReadError> {
        Ok(self
            .table(table)?
            .columns
            .iter()
            .map(|c| (c.name.clone(), c.clone()))
            .collect())
    }

    async fn get_primary_key(
        &self,
        table: &str,
    ) -> Result<Option<PrimaryKeyInfo>, SchemaReadError> {
        Ok(self.table(table)?.primary_key.clone())
    }

    async fn get_foreign_keys(&self, table: &str) -> Result<Vec<ForeignKeyInfo>, SchemaReadError> {
        Ok(self.table(table)?.foreign_keys.clone())
    }

    async fn get_indexes(&self, table: &str) -> Result<Vec<IndexInfo>, SchemaReadError> {
        Ok(self.table(table)?.indexes.clone())
    }

    async fn get_table_structure(&self, table: &str) -> Result<TableStructure, SchemaReadError> {
        self.table(table).cloned()
    }
}
