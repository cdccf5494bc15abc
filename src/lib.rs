//! Verifies that a database holds the RBAC storage tables (items,
//! assignments and item hierarchy edges) in their canonical shape.
//!
//! A [`SchemaModel`] built from a [`SchemaConfig`] describes what the tables
//! should look like, a [`SchemaInspector`] reads what they actually look like,
//! and a [`SchemaVerifier`] compares the two.

pub mod config;
pub mod database;
pub mod db;
pub mod error;
pub mod model;
pub mod verifier;

pub use config::{EngineProfile, RbacTables, SchemaConfig};
pub use database::postgres::PostgresInspector;
pub use database::snapshot::SnapshotInspector;
pub use database::sqlite::SqliteInspector;
pub use database::{DatabaseType, PostgresConfig, SchemaInspector, SqliteConfig};
pub use error::{
    AssertionFailure, ColumnField, ConfigError, FailureKind, ForeignKeyField, IndexField,
    SchemaReadError, VerifyError,
};
pub use model::{
    ColumnSpec, Expected, ForeignKeySpec, IndexSpec, SchemaModel, TableKind, TableSpec,
};
pub use verifier::{SchemaReport, SchemaVerifier};
