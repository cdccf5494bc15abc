use std::fmt;

use crate::db::models::{ColumnType, ReferentialAction};
use crate::model::expected::Expected;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: String,
    pub column_type: ColumnType,
    /// Checked only when set.
    pub size: Option<u32>,
    pub nullable: bool,
}

impl ColumnSpec {
    /// A NOT NULL string column of the given length
    pub fn string(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::String,
            size: Some(size),
            nullable: false,
        }
    }

    /// A NOT NULL integer column
    pub fn integer(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: ColumnType::Integer,
            size: None,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn size(mut self, size: Option<u32>) -> Self {
        self.size = size;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeySpec {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
    /// `None` skips the check.
    pub on_update: Option<Expected<ReferentialAction>>,
    pub on_delete: Option<Expected<ReferentialAction>>,
}

impl ForeignKeySpec {
    /// Both actions default to exactly `NO ACTION`.
    pub fn new<C, F>(columns: C, foreign_table: impl Into<String>, foreign_columns: F) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
        F: IntoIterator,
        F::Item: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            foreign_table: foreign_table.into(),
            foreign_columns: foreign_columns.into_iter().map(Into::into).collect(),
            on_update: Some(ReferentialAction::NoAction.into()),
            on_delete: Some(ReferentialAction::NoAction.into()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn on_update(mut self, action: impl Into<Expected<ReferentialAction>>) -> Self {
        self.on_update = Some(action.into());
        self
    }

    pub fn on_delete(mut self, action: impl Into<Expected<ReferentialAction>>) -> Self {
        self.on_delete = Some(action.into());
        self
    }

    pub fn any_on_update(mut self) -> Self {
        self.on_update = None;
        self
    }

    pub fn any_on_delete(mut self) -> Self {
        self.on_delete = None;
        self
    }
}

impl fmt::Display for ForeignKeySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) -> {}({})",
            self.columns.join(", "),
            self.foreign_table,
            self.foreign_columns.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSpec {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub unique: bool,
    pub primary: bool,
}

impl IndexSpec {
    pub fn new<C>(columns: C) -> Self
    where
        C: IntoIterator,
        C::Item: Into<String>,
    {
        Self {
            name: None,
            columns: columns.into_iter().map(Into::into).collect(),
            unique: false,
            primary: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// The index backing the primary key; implies unique.
    pub fn primary(mut self) -> Self {
        self.primary = true;
        self.unique = true;
        self
    }
}

impl fmt::Display for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.columns.join(", "))
    }
}
