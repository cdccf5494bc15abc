use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Engine-independent column type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    String,
    Integer,
    Other(String),
}

impl ColumnType {
    /// Parses a declared SQL type such as `VARCHAR(128)`, `character varying`
    /// or `NUMBER(10,0)` into a semantic type and an optional string length.
    pub fn parse_declared(declared: &str) -> (ColumnType, Option<u32>) {
        let declared = declared.trim();
        let (base, args) = match declared.find('(') {
            Some(open) => {
                let close = declared.rfind(')').unwrap_or(declared.len());
                (&declared[..open], Some(&declared[open + 1..close.max(open + 1)]))
            }
            None => (declared, None),
        };
        let base = base.trim().to_ascii_lowercase();
        let first_arg = args
            .and_then(|a| a.split(',').next())
            .and_then(|a| a.trim().parse::<u32>().ok());
        let scale = args
            .and_then(|a| a.split(',').nth(1))
            .and_then(|a| a.trim().parse::<u32>().ok());

        match base.as_str() {
            "varchar" | "character varying" | "char" | "character" | "nvarchar" | "nchar"
            | "varchar2" | "nvarchar2" | "text" | "clob" | "string" => {
                (ColumnType::String, first_arg)
            }
            "int" | "integer" | "int2" | "int4" | "int8" | "smallint" | "bigint" | "tinyint"
            | "mediumint" => (ColumnType::Integer, None),
            "number" | "numeric" | "decimal" if scale.unwrap_or(0) == 0 && first_arg.is_some() => {
                (ColumnType::Integer, None)
            }
            _ => (ColumnType::Other(declared.to_string()), None),
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnType::String => f.write_str("string"),
            ColumnType::Integer => f.write_str("integer"),
            ColumnType::Other(raw) => write!(f, "other({})", raw),
        }
    }
}

/// What the database does to referencing rows when the referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReferentialAction {
    #[serde(rename = "NO ACTION")]
    NoAction,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
}

impl ReferentialAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferentialAction::NoAction => "NO ACTION",
            ReferentialAction::Restrict => "RESTRICT",
            ReferentialAction::Cascade => "CASCADE",
            ReferentialAction::SetNull => "SET NULL",
            ReferentialAction::SetDefault => "SET DEFAULT",
        }
    }

    /// Decodes `pg_constraint.confupdtype` / `confdeltype`.
    pub fn from_pg_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(ReferentialAction::NoAction),
            "r" => Some(ReferentialAction::Restrict),
            "c" => Some(ReferentialAction::Cascade),
            "n" => Some(ReferentialAction::SetNull),
            "d" => Some(ReferentialAction::SetDefault),
            _ => None,
        }
    }
}

impl FromStr for ReferentialAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('_', " ");
        match normalized.as_str() {
            // Oracle reports no action at all for ON UPDATE
            "NO ACTION" | "" => Ok(ReferentialAction::NoAction),
            "RESTRICT" => Ok(ReferentialAction::Restrict),
            "CASCADE" => Ok(ReferentialAction::Cascade),
            "SET NULL" => Ok(ReferentialAction::SetNull),
            "SET DEFAULT" => Ok(ReferentialAction::SetDefault),
            _ => Err(s.to_string()),
        }
    }
}

impl fmt::Display for ReferentialAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
    #[serde(default)]
    pub size: Option<u32>,
    pub nullable: bool,
    /// Type exactly as the engine reported it.
    #[serde(default)]
    pub declared_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrimaryKeyInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyInfo {
    #[serde(default)]
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
    #[serde(default = "default_action")]
    pub on_update: ReferentialAction,
    #[serde(default = "default_action")]
    pub on_delete: ReferentialAction,
}

fn default_action() -> ReferentialAction {
    ReferentialAction::NoAction
}

impl fmt::Display for ForeignKeyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}) -> {}({})",
            self.columns.join(", "),
            self.foreign_table,
            self.foreign_columns.join(", ")
        )?;
        if let Some(name) = &self.name {
            write!(f, " `{}`", name)?;
        }
        Ok(())
    }
}

/// Stands in for an index member that is an expression rather than a column.
/// Not a valid unquoted identifier, so it never equals a real column name.
pub const EXPRESSION_MEMBER: &str = "<expression>";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexInfo {
    #[serde(default)]
    pub name: Option<String>,
    /// Key members in index order; expressions appear as [`EXPRESSION_MEMBER`].
    pub columns: Vec<String>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default)]
    pub primary: bool,
}

impl fmt::Display for IndexInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.columns.join(", "))?;
        if let Some(name) = &self.name {
            write!(f, " `{}`", name)?;
        }
        Ok(())
    }
}

/// Everything known about one table at the time it was inspected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableStructure {
    pub name: String,
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub primary_key: Option<PrimaryKeyInfo>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeyInfo>,
    #[serde(default)]
    pub indexes: Vec<IndexInfo>,
}

/// Recorded metadata for a set of tables.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaSnapshot {
    pub tables: Vec<TableStructure>,
}

impl SchemaSnapshot {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn table(&self, name: &str) -> Option<&TableStructure> {
        self.tables.iter().find(|t| t.name == name)
    }
}
