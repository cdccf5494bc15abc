//! Verification of a live schema against the [`SchemaModel`].
//!
//! The `verify_*` operations on a single structural element are fail-fast:
//! they return the first mismatch as [`VerifyError::Assertion`]. The
//! table/schema level operations collect every mismatch into a
//! [`SchemaReport`] and only stop early on read errors.

use tracing::{debug, info, warn};

pub mod checks;
pub mod report;

pub use report::SchemaReport;

use crate::database::SchemaInspector;
use crate::error::{AssertionFailure, FailureKind, SchemaReadError, VerifyError};
use crate::model::{ColumnSpec, ForeignKeySpec, IndexSpec, SchemaModel, TableKind, TableSpec};

pub struct SchemaVerifier<'a> {
    inspector: &'a dyn SchemaInspector,
    model: &'a SchemaModel,
}

fn fail_fast(failures: Vec<AssertionFailure>) -> Result<(), VerifyError> {
    match failures.into_iter().next() {
        Some(failure) => {
            warn!(%failure, "schema assertion failed");
            Err(failure.into())
        }
        None => Ok(()),
    }
}

fn missing_table(spec: &TableSpec) -> AssertionFailure {
    AssertionFailure::new(
        &spec.name,
        FailureKind::MissingTable,
        format!("{} table", spec.kind),
        "present",
        "absent",
    )
}

fn unexpected_table(spec: &TableSpec) -> AssertionFailure {
    AssertionFailure::new(
        &spec.name,
        FailureKind::UnexpectedTable,
        format!("{} table", spec.kind),
        "absent",
        "present",
    )
}

impl<'a> SchemaVerifier<'a> {
    pub fn new(inspector: &'a dyn SchemaInspector, model: &'a SchemaModel) -> Self {
        Self { inspector, model }
    }

    pub fn model(&self) -> &SchemaModel {
        self.model
    }

    pub async fn verify_table_exists(&self, kind: TableKind) -> Result<(), VerifyError> {
        let spec = self.model.table(kind);
        if self.inspector.has_table(&spec.name).await? {
            return Ok(());
        }
        fail_fast(vec![missing_table(spec)])
    }

    /// Passes when the table has not been created, e.g. before migrating.
    pub async fn verify_table_absent(&self, kind: TableKind) -> Result<(), VerifyError> {
        let spec = self.model.table(kind);
        if !self.inspector.has_table(&spec.name).await? {
            return Ok(());
        }
        fail_fast(vec![unexpected_table(spec)])
    }

    pub async fn verify_column(
        &self,
        kind: TableKind,
        expected: &ColumnSpec,
    ) -> Result<(), VerifyError> {
        let table = &self.model.table(kind).name;
        debug!(table = %table, column = %expected.name, "verifying column");
        let columns = self.inspector.get_columns(table).await?;
        fail_fast(checks::column_failures(table, expected, &columns))
    }

    /// Column order is irrelevant; the sets must match exactly.
    pub async fn verify_primary_key(
        &self,
        kind: TableKind,
        expected: &[&str],
    ) -> Result<(), VerifyError> {
        let table = &self.model.table(kind).name;
        let expected: Vec<String> = expected.iter().map(|c| c.to_string()).collect();
        let actual = self.inspector.get_primary_key(table).await?;
        fail_fast(checks::primary_key_failures(table, &expected, actual.as_ref()))
    }

    pub async fn verify_foreign_key(
        &self,
        kind: TableKind,
        expected: &ForeignKeySpec,
    ) -> Result<(), VerifyError> {
        let table = &self.model.table(kind).name;
        debug!(table = %table, foreign_key = %expected, "verifying foreign key");
        let actual = self.inspector.get_foreign_keys(table).await?;
        fail_fast(checks::foreign_key_failures(table, expected, &actual))
    }

    pub async fn verify_index(
        &self,
        kind: TableKind,
        expected: &IndexSpec,
    ) -> Result<(), VerifyError> {
        let table = &self.model.table(kind).name;
        debug!(table = %table, index = %expected, "verifying index");
        let actual = self.inspector.get_indexes(table).await?;
        fail_fast(checks::index_failures(table, expected, &actual))
    }

    pub async fn verify_foreign_key_count(
        &self,
        kind: TableKind,
        expected: usize,
    ) -> Result<(), VerifyError> {
        let table = &self.model.table(kind).name;
        let actual = self.inspector.get_foreign_keys(table).await?;
        fail_fast(checks::count_failures(table, "foreign keys", expected, actual.len()))
    }

    pub async fn verify_index_count(
        &self,
        kind: TableKind,
        expected: usize,
    ) -> Result<(), VerifyError> {
        let table = &self.model.table(kind).name;
        let actual = self.inspector.get_indexes(table).await?;
        fail_fast(checks::count_failures(table, "indexes", expected, actual.len()))
    }

    /// Checks everything the model says about one table.
    pub async fn verify_table(&self, kind: TableKind) -> Result<SchemaReport, SchemaReadError> {
        let spec = self.model.table(kind);
        let table = spec.name.as_str();
        let mut report = SchemaReport::default();

        if !self.inspector.has_table(table).await? {
            report.push(missing_table(spec));
            return Ok(log_report(table, report));
        }

        let columns = self.inspector.get_columns(table).await?;
        for column in &spec.columns {
            report.extend(checks::column_failures(table, column, &columns));
        }

        let primary_key = self.inspector.get_primary_key(table).await?;
        report.extend(checks::primary_key_failures(
            table,
            &spec.primary_key,
            primary_key.as_ref(),
        ));

        let foreign_keys = self.inspector.get_foreign_keys(table).await?;
        if let Some(count) = spec.foreign_key_count {
            report.extend(checks::count_failures(
                table,
                "foreign keys",
                count,
                foreign_keys.len(),
            ));
        }
        for foreign_key in &spec.foreign_keys {
            report.extend(checks::foreign_key_failures(table, foreign_key, &foreign_keys));
        }

        let indexes = self.inspector.get_indexes(table).await?;
        if let Some(count) = spec.index_count {
            report.extend(checks::count_failures(table, "indexes", count, indexes.len()));
        }
        for index in &spec.indexes {
            report.extend(checks::index_failures(table, index, &indexes));
        }

        Ok(log_report(table, report))
    }

    /// Checks all three RBAC tables.
    pub async fn verify_schema(&self) -> Result<SchemaReport, SchemaReadError> {
        let mut report = SchemaReport::default();
        for kind in TableKind::ALL {
            report.merge(self.verify_table(kind).await?);
        }
        Ok(report)
    }

    /// Checks that none of the RBAC tables exist yet.
    pub async fn verify_clean(&self) -> Result<SchemaReport, SchemaReadError> {
        let mut report = SchemaReport::default();
        for spec in self.model.tables() {
            if self.inspector.has_table(&spec.name).await? {
                report.push(unexpected_table(spec));
            }
        }
        for failure in report.failures() {
            warn!(%failure, "schema assertion failed");
        }
        Ok(report)
    }
}

fn log_report(table: &str, report: SchemaReport) -> SchemaReport {
    for failure in report.failures() {
        warn!(%failure, "schema assertion failed");
    }
    info!(table, failures = report.len(), "verified table");
    report
}
