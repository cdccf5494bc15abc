use serde::{Deserialize, Serialize};

use crate::database::DatabaseType;
use crate::db::models::ReferentialAction;
use crate::error::ConfigError;
use crate::model::expected::Expected;

/// Physical names of the three RBAC tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RbacTables {
    #[serde(default = "default_items_table")]
    pub items: String,
    #[serde(default = "default_assignments_table")]
    pub assignments: String,
    #[serde(default = "default_items_children_table")]
    pub items_children: String,
}

fn default_items_table() -> String {
    "yii_rbac_item".to_string()
}

fn default_assignments_table() -> String {
    "yii_rbac_assignment".to_string()
}

fn default_items_children_table() -> String {
    "yii_rbac_item_child".to_string()
}

impl Default for RbacTables {
    fn default() -> Self {
        Self {
            items: default_items_table(),
            assignments: default_assignments_table(),
            items_children: default_items_children_table(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    #[serde(default = "default_engine")]
    pub engine: DatabaseType,
    #[serde(default)]
    pub tables: RbacTables,
}

fn default_engine() -> DatabaseType {
    DatabaseType::Sqlite
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            engine: default_engine(),
            tables: RbacTables::default(),
        }
    }
}

impl SchemaConfig {
    pub fn new(engine: DatabaseType) -> Self {
        Self {
            engine,
            tables: RbacTables::default(),
        }
    }

    pub fn with_tables(mut self, tables: RbacTables) -> Self {
        self.tables = tables;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn profile(&self) -> EngineProfile {
        EngineProfile::for_engine(self.engine)
    }
}

/// How an engine reports the metadata the model makes claims about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineProfile {
    pub engine: DatabaseType,
    /// Longest identifier the engine keeps; longer names are truncated.
    pub max_identifier_length: Option<usize>,
    /// Whether foreign key constraint names survive introspection.
    pub reports_foreign_key_names: bool,
    pub on_update: Expected<ReferentialAction>,
    pub on_delete: Expected<ReferentialAction>,
}

impl EngineProfile {
    pub fn for_engine(engine: DatabaseType) -> Self {
        match engine {
            DatabaseType::Sqlite => Self {
                engine,
                max_identifier_length: None,
                reports_foreign_key_names: false,
                on_update: ReferentialAction::NoAction.into(),
                on_delete: ReferentialAction::NoAction.into(),
            },
            DatabaseType::Postgres => Self {
                engine,
                max_identifier_length: Some(63),
                reports_foreign_key_names: true,
                on_update: ReferentialAction::NoAction.into(),
                on_delete: ReferentialAction::NoAction.into(),
            },
            DatabaseType::Mysql => Self {
                engine,
                max_identifier_length: Some(64),
                reports_foreign_key_names: true,
                on_update: Expected::one_of([
                    ReferentialAction::NoAction,
                    ReferentialAction::Restrict,
                ]),
                on_delete: Expected::one_of([
                    ReferentialAction::NoAction,
                    ReferentialAction::Restrict,
                ]),
            },
            // No ON UPDATE clause exists; drivers report it as absent or NO ACTION
            DatabaseType::Oracle => Self {
                engine,
                max_identifier_length: Some(30),
                reports_foreign_key_names: true,
                on_update: Expected::one_of([
                    ReferentialAction::NoAction,
                    ReferentialAction::Restrict,
                ]),
                on_delete: ReferentialAction::NoAction.into(),
            },
        }
    }

    /// Applies the engine's identifier length limit.
    pub fn identifier(&self, name: String) -> String {
        match self.max_identifier_length {
            Some(max) if name.chars().count() > max => name.chars().take(max).collect(),
            _ => name,
        }
    }
}
