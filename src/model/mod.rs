//! Canonical shape of the RBAC storage tables.
//!
//! The model is plain data derived from a [`SchemaConfig`]: table names come
//! from the configuration, constraint names are truncated to the engine's
//! identifier limit, and engine-specific metadata quirks come from its
//! [`EngineProfile`].

use std::fmt;

pub mod expectations;
pub mod expected;

pub use expectations::{ColumnSpec, ForeignKeySpec, IndexSpec};
pub use expected::Expected;

use crate::config::{EngineProfile, SchemaConfig};

pub const NAME_SIZE: u32 = 128;
pub const TYPE_SIZE: u32 = 10;
pub const DESCRIPTION_SIZE: u32 = 191;
pub const RULE_NAME_SIZE: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableKind {
    Items,
    Assignments,
    ItemsChildren,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [
        TableKind::Items,
        TableKind::Assignments,
        TableKind::ItemsChildren,
    ];
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TableKind::Items => "items",
            TableKind::Assignments => "assignments",
            TableKind::ItemsChildren => "items children",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSpec {
    pub kind: TableKind,
    pub name: String,
    pub columns: Vec<ColumnSpec>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKeySpec>,
    /// Exact number of foreign keys, when the model pins it.
    pub foreign_key_count: Option<usize>,
    pub indexes: Vec<IndexSpec>,
    /// Exact number of indexes, when the model pins it.
    pub index_count: Option<usize>,
}

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaModel {
    profile: EngineProfile,
    items: TableSpec,
    assignments: TableSpec,
    items_children: TableSpec,
}

impl SchemaModel {
    pub fn new(config: &SchemaConfig) -> Self {
        let profile = config.profile();
        let tables = &config.tables;

        let items = TableSpec {
            kind: TableKind::Items,
            name: tables.items.clone(),
            columns: vec![
                ColumnSpec::string("name", NAME_SIZE),
                ColumnSpec::string("type", TYPE_SIZE),
                ColumnSpec::string("description", DESCRIPTION_SIZE).nullable(),
                ColumnSpec::string("ruleName", RULE_NAME_SIZE).nullable(),
                ColumnSpec::integer("createdAt"),
                ColumnSpec::integer("updatedAt"),
            ],
            primary_key: vec!["name".to_string()],
            foreign_keys: Vec::new(),
            foreign_key_count: Some(0),
            indexes: vec![
                IndexSpec::new(["name"]).primary(),
                IndexSpec::new(["type"])
                    .named(profile.identifier(format!("idx-{}-type", tables.items))),
            ],
            index_count: Some(2),
        };

        let assignments = TableSpec {
            kind: TableKind::Assignments,
            name: tables.assignments.clone(),
            columns: vec![
                ColumnSpec::string("itemName", NAME_SIZE),
                ColumnSpec::string("userId", NAME_SIZE),
                ColumnSpec::integer("createdAt"),
            ],
            primary_key: vec!["itemName".to_string(), "userId".to_string()],
            foreign_keys: Vec::new(),
            foreign_key_count: Some(0),
            indexes: vec![IndexSpec::new(["itemName", "userId"]).primary()],
            index_count: Some(1),
        };

        let children_fk = |column: &str| {
            let mut fk = ForeignKeySpec::new([column], tables.items.clone(), ["name"])
                .on_update(profile.on_update.clone())
                .on_delete(profile.on_delete.clone());
            if profile.reports_foreign_key_names {
                fk = fk.named(profile.identifier(format!(
                    "fk-{}-{}",
                    tables.items_children, column
                )));
            }
            fk
        };
        let items_children = TableSpec {
            kind: TableKind::ItemsChildren,
            name: tables.items_children.clone(),
            columns: vec![
                ColumnSpec::string("parent", NAME_SIZE),
                ColumnSpec::string("child", NAME_SIZE),
            ],
            primary_key: vec!["parent".to_string(), "child".to_string()],
            foreign_keys: vec![children_fk("parent"), children_fk("child")],
            foreign_key_count: None,
            indexes: Vec::new(),
            index_count: None,
        };

        Self {
            profile,
            items,
            assignments,
            items_children,
        }
    }

    pub fn profile(&self) -> &EngineProfile {
        &self.profile
    }

    pub fn table(&self, kind: TableKind) -> &TableSpec {
        match kind {
            TableKind::Items => &self.items,
            TableKind::Assignments => &self.assignments,
            TableKind::ItemsChildren => &self.items_children,
        }
    }

    pub fn tables(&self) -> [&TableSpec; 3] {
        [&self.items, &self.assignments, &self.items_children]
    }

    pub fn table_names(&self) -> [&str; 3] {
        [
            self.items.name.as_str(),
            self.assignments.name.as_str(),
            self.items_children.name.as_str(),
        ]
    }
}

impl Default for SchemaModel {
    fn default() -> Self {
        Self::new(&SchemaConfig::default())
    }
}
