use std::fmt;

use thiserror::Error;

/// Failure to read metadata from a live database.
#[derive(Debug, Error)]
pub enum SchemaReadError {
    #[error("table `{0}` does not exist")]
    TableNotFound(String),

    #[error("failed to connect to {engine}: {message}")]
    Connection { engine: String, message: String },

    #[error("metadata query for `{table}` failed: {source}")]
    Query {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("unrecognized {what} `{value}` reported for `{table}`")]
    UnsupportedMetadata {
        table: String,
        what: &'static str,
        value: String,
    },
}

impl SchemaReadError {
    pub(crate) fn query(table: &str) -> impl FnOnce(sqlx::Error) -> Self + '_ {
        move |source| SchemaReadError::Query {
            table: table.to_string(),
            source,
        }
    }
}

/// Column attribute that diverged from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnField {
    Presence,
    Type,
    Size,
    Nullability,
}

/// Foreign key attribute that diverged once the key itself was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForeignKeyField {
    OnUpdate,
    OnDelete,
    Name,
}

/// Index attribute that diverged once the index itself was located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexField {
    Unique,
    Primary,
    Name,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingTable,
    UnexpectedTable,
    ColumnMismatch { field: ColumnField },
    PrimaryKeyMismatch,
    ForeignKeyNotFound,
    ForeignKeyMismatch { field: ForeignKeyField },
    IndexNotFound,
    IndexMismatch { field: IndexField },
    CountMismatch,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::MissingTable => f.write_str("missing table"),
            FailureKind::UnexpectedTable => f.write_str("unexpected table"),
            FailureKind::ColumnMismatch { field } => write!(f, "column {:?} mismatch", field),
            FailureKind::PrimaryKeyMismatch => f.write_str("primary key mismatch"),
            FailureKind::ForeignKeyNotFound => f.write_str("foreign key not found"),
            FailureKind::ForeignKeyMismatch { field } => {
                write!(f, "foreign key {:?} mismatch", field)
            }
            FailureKind::IndexNotFound => f.write_str("index not found"),
            FailureKind::IndexMismatch { field } => write!(f, "index {:?} mismatch", field),
            FailureKind::CountMismatch => f.write_str("count mismatch"),
        }
    }
}

/// A single expected-vs-actual mismatch between the live schema and the model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{table}: {kind} on {element}: expected {expected}, found {actual}")]
pub struct AssertionFailure {
    pub table: String,
    pub kind: FailureKind,
    /// The structural element the failure is about, e.g. `column ruleName`.
    pub element: String,
    pub expected: String,
    pub actual: String,
}

impl AssertionFailure {
    pub fn new(
        table: impl Into<String>,
        kind: FailureKind,
        element: impl Into<String>,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self {
            table: table.into(),
            kind,
            element: element.into(),
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Error returned by the fail-fast verification operations.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error(transparent)]
    Read(#[from] SchemaReadError),

    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
}

impl VerifyError {
    pub fn as_assertion(&self) -> Option<&AssertionFailure> {
        match self {
            VerifyError::Assertion(failure) => Some(failure),
            VerifyError::Read(_) => None,
        }
    }

    pub fn kind(&self) -> Option<FailureKind> {
        self.as_assertion().map(|failure| failure.kind)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unsupported database type: {0}")]
    UnsupportedEngine(String),

    #[error("invalid schema configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
