use std::fmt;

use crate::error::{AssertionFailure, FailureKind};

/// Every mismatch found by a collect-all verification run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaReport {
    failures: Vec<AssertionFailure>,
}

impl SchemaReport {
    pub fn is_ok(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[AssertionFailure] {
        &self.failures
    }

    pub fn failures_for<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a AssertionFailure> {
        self.failures.iter().filter(move |f| f.table == table)
    }

    pub fn has_kind(&self, kind: FailureKind) -> bool {
        self.failures.iter().any(|f| f.kind == kind)
    }

    pub fn push(&mut self, failure: AssertionFailure) {
        self.failures.push(failure);
    }

    pub fn merge(&mut self, other: SchemaReport) {
        self.failures.extend(other.failures);
    }

    /// Fails with the whole report unless it is clean.
    pub fn into_result(self) -> Result<(), SchemaReport> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl Extend<AssertionFailure> for SchemaReport {
    fn extend<I: IntoIterator<Item = AssertionFailure>>(&mut self, iter: I) {
        self.failures.extend(iter);
    }
}

impl IntoIterator for SchemaReport {
    type Item = AssertionFailure;
    type IntoIter = std::vec::IntoIter<AssertionFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.failures.into_iter()
    }
}

impl fmt::Display for SchemaReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_ok() {
            return f.write_str("schema matches");
        }
        writeln!(f, "{} schema mismatch(es):", self.failures.len())?;
        for failure in &self.failures {
            writeln!(f, "  - {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for SchemaReport {}
