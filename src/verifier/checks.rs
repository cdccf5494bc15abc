//! Pure comparisons between introspected metadata and the model.
//!
//! Each function returns every mismatch it finds; an empty vector means the
//! check passed.

use std::collections::HashMap;

use crate::db::models::{ColumnInfo, ForeignKeyInfo, IndexInfo, PrimaryKeyInfo};
use crate::error::{
    AssertionFailure, ColumnField, FailureKind, ForeignKeyField, IndexField,
};
use crate::model::{ColumnSpec, ForeignKeySpec, IndexSpec};

/// Order-insensitive, exact comparison of two column lists.
pub fn same_columns(expected: &[String], actual: &[String]) -> bool {
    let mut expected: Vec<&str> = expected.iter().map(String::as_str).collect();
    let mut actual: Vec<&str> = actual.iter().map(String::as_str).collect();
    expected.sort_unstable();
    actual.sort_unstable();
    expected == actual
}

fn column_list(columns: &[String]) -> String {
    format!("({})", columns.join(", "))
}

fn describe_size(size: Option<u32>) -> String {
    size.map_or_else(|| "no size".to_string(), |s| s.to_string())
}

fn describe_nullable(nullable: bool) -> &'static str {
    if nullable {
        "nullable"
    } else {
        "not null"
    }
}

fn describe_name(name: Option<&str>) -> String {
    name.map_or_else(|| "unnamed".to_string(), |n| format!("`{}`", n))
}

fn describe_all<T: ToString>(items: &[T], empty: &str) -> String {
    if items.is_empty() {
        return empty.to_string();
    }
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn column_failures(
    table: &str,
    expected: &ColumnSpec,
    columns: &HashMap<String, ColumnInfo>,
) -> Vec<AssertionFailure> {
    let element = format!("column `{}`", expected.name);
    let mismatch = |field| FailureKind::ColumnMismatch { field };

    let Some(actual) = columns.get(&expected.name) else {
        return vec![AssertionFailure::new(
            table,
            mismatch(ColumnField::Presence),
            element,
            "present",
            "absent",
        )];
    };

    let mut failures = Vec::new();
    if actual.column_type != expected.column_type {
        failures.push(AssertionFailure::new(
            table,
            mismatch(ColumnField::Type),
            element.clone(),
            &expected.column_type,
            &actual.column_type,
        ));
    }
    if let Some(size) = expected.size {
        if actual.size != Some(size) {
            failures.push(AssertionFailure::new(
                table,
                mismatch(ColumnField::Size),
                element.clone(),
                size,
                describe_size(actual.size),
            ));
        }
    }
    if actual.nullable != expected.nullable {
        failures.push(AssertionFailure::new(
            table,
            mismatch(ColumnField::Nullability),
            element,
            describe_nullable(expected.nullable),
            describe_nullable(actual.nullable),
        ));
    }
    failures
}

pub fn primary_key_failures(
    table: &str,
    expected: &[String],
    actual: Option<&PrimaryKeyInfo>,
) -> Vec<AssertionFailure> {
    let matches = actual.is_some_and(|pk| same_columns(expected, &pk.columns));
    if matches {
        return Vec::new();
    }
    vec![AssertionFailure::new(
        table,
        FailureKind::PrimaryKeyMismatch,
        "primary key",
        column_list(expected),
        actual.map_or_else(|| "no primary key".to_string(), |pk| column_list(&pk.columns)),
    )]
}

/// Locates the foreign key by columns and target, then checks its actions and name.
///
/// When several keys share the same columns and target, the first one that
/// passes every secondary check is accepted; if none does, the mismatches of
/// the first structural match are reported.
pub fn foreign_key_failures(
    table: &str,
    expected: &ForeignKeySpec,
    actual: &[ForeignKeyInfo],
) -> Vec<AssertionFailure> {
    let element = format!("foreign key {}", expected);

    let candidates = actual.iter().filter(|fk| {
        same_columns(&expected.columns, &fk.columns)
            && fk.foreign_table == expected.foreign_table
            && same_columns(&expected.foreign_columns, &fk.foreign_columns)
    });

    let mut first_failures = None;
    for candidate in candidates {
        let failures = foreign_key_detail_failures(table, &element, expected, candidate);
        if failures.is_empty() {
            return Vec::new();
        }
        first_failures.get_or_insert(failures);
    }

    first_failures.unwrap_or_else(|| {
        vec![AssertionFailure::new(
            table,
            FailureKind::ForeignKeyNotFound,
            element,
            expected,
            describe_all(actual, "no foreign keys"),
        )]
    })
}

fn foreign_key_detail_failures(
    table: &str,
    element: &str,
    expected: &ForeignKeySpec,
    actual: &ForeignKeyInfo,
) -> Vec<AssertionFailure> {
    let mismatch = |field| FailureKind::ForeignKeyMismatch { field };
    let mut failures = Vec::new();

    if let Some(on_update) = &expected.on_update {
        if !on_update.accepts(&actual.on_update) {
            failures.push(AssertionFailure::new(
                table,
                mismatch(ForeignKeyField::OnUpdate),
                element,
                on_update,
                actual.on_update,
            ));
        }
    }
    if let Some(on_delete) = &expected.on_delete {
        if !on_delete.accepts(&actual.on_delete) {
            failures.push(AssertionFailure::new(
                table,
                mismatch(ForeignKeyField::OnDelete),
                element,
                on_delete,
                actual.on_delete,
            ));
        }
    }
    if let Some(name) = &expected.name {
        if actual.name.as_deref() != Some(name.as_str()) {
            failures.push(AssertionFailure::new(
                table,
                mismatch(ForeignKeyField::Name),
                element,
                describe_name(Some(name)),
                describe_name(actual.name.as_deref()),
            ));
        }
    }
    failures
}

/// Locates the index by its column set, then checks its flags and name.
///
/// Duplicate candidates are resolved the same way as for foreign keys.
pub fn index_failures(
    table: &str,
    expected: &IndexSpec,
    actual: &[IndexInfo],
) -> Vec<AssertionFailure> {
    let element = format!("index {}", expected);

    let mut first_failures = None;
    for candidate in actual
        .iter()
        .filter(|index| same_columns(&expected.columns, &index.columns))
    {
        let failures = index_detail_failures(table, &element, expected, candidate);
        if failures.is_empty() {
            return Vec::new();
        }
        first_failures.get_or_insert(failures);
    }

    first_failures.unwrap_or_else(|| {
        vec![AssertionFailure::new(
            table,
            FailureKind::IndexNotFound,
            element,
            expected,
            describe_all(actual, "no indexes"),
        )]
    })
}

fn index_detail_failures(
    table: &str,
    element: &str,
    expected: &IndexSpec,
    actual: &IndexInfo,
) -> Vec<AssertionFailure> {
    let mismatch = |field| FailureKind::IndexMismatch { field };
    let mut failures = Vec::new();

    if actual.unique != expected.unique {
        failures.push(AssertionFailure::new(
            table,
            mismatch(IndexField::Unique),
            element,
            format!("unique = {}", expected.unique),
            format!("unique = {}", actual.unique),
        ));
    }
    if actual.primary != expected.primary {
        failures.push(AssertionFailure::new(
            table,
            mismatch(IndexField::Primary),
            element,
            format!("primary = {}", expected.primary),
            format!("primary = {}", actual.primary),
        ));
    }
    if let Some(name) = &expected.name {
        if actual.name.as_deref() != Some(name.as_str()) {
            failures.push(AssertionFailure::new(
                table,
                mismatch(IndexField::Name),
                element,
                describe_name(Some(name)),
                describe_name(actual.name.as_deref()),
            ));
        }
    }
    failures
}

pub fn count_failures(
    table: &str,
    element: &str,
    expected: usize,
    actual: usize,
) -> Vec<AssertionFailure> {
    if expected == actual {
        return Vec::new();
    }
    vec![AssertionFailure::new(
        table,
        FailureKind::CountMismatch,
        element,
        expected,
        actual,
    )]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::ReferentialAction;
    use crate::model::Expected;

    fn fk(columns: &[&str], table: &str, foreign: &[&str], on_delete: ReferentialAction) -> ForeignKeyInfo {
        ForeignKeyInfo {
            name: None,
            columns: columns.iter().map(|c| c.to_string()).collect(),
            foreign_table: table.to_string(),
            foreign_columns: foreign.iter().map(|c| c.to_string()).collect(),
            on_update: ReferentialAction::NoAction,
            on_delete,
        }
    }

    fn index(name: &str, columns: &[&str], unique: bool) -> IndexInfo {
        IndexInfo {
            name: Some(name.to_string()),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            unique,
            primary: false,
        }
    }

    #[test]
    fn column_sets_ignore_order_but_not_membership() {
        let parent_child = vec!["parent".to_string(), "child".to_string()];
        let child_parent = vec!["child".to_string(), "parent".to_string()];
        assert!(same_columns(&parent_child, &child_parent));
        assert!(!same_columns(&parent_child, &parent_child[..1]));
        assert!(!same_columns(&parent_child[..1], &parent_child));
    }

    #[test]
    fn missing_primary_key_is_reported() {
        let failures = primary_key_failures("t", &["id".to_string()], None);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].actual, "no primary key");
    }

    #[test]
    fn duplicate_foreign_keys_accept_any_satisfying_candidate() {
        let actual = vec![
            fk(&["parent"], "items", &["name"], ReferentialAction::NoAction),
            fk(&["parent"], "items", &["name"], ReferentialAction::Cascade),
        ];
        let cascade = ForeignKeySpec::new(["parent"], "items", ["name"])
            .on_delete(ReferentialAction::Cascade);
        assert!(foreign_key_failures("children", &cascade, &actual).is_empty());

        let set_null = ForeignKeySpec::new(["parent"], "items", ["name"])
            .on_delete(ReferentialAction::SetNull);
        let failures = foreign_key_failures("children", &set_null, &actual);
        assert_eq!(failures.len(), 1);
        // the first structural match is the one reported
        assert_eq!(failures[0].actual, "NO ACTION");
        assert_eq!(
            failures[0].kind,
            FailureKind::ForeignKeyMismatch {
                field: ForeignKeyField::OnDelete
            }
        );
    }

    #[test]
    fn foreign_key_actions_accept_sets() {
        let actual = vec![fk(&["child"], "items", &["name"], ReferentialAction::Restrict)];
        let expected = ForeignKeySpec::new(["child"], "items", ["name"]).on_delete(Expected::one_of([
            ReferentialAction::NoAction,
            ReferentialAction::Restrict,
        ]));
        assert!(foreign_key_failures("children", &expected, &actual).is_empty());
    }

    #[test]
    fn foreign_key_with_wrong_target_is_not_found() {
        let actual = vec![fk(&["parent"], "users", &["id"], ReferentialAction::NoAction)];
        let failures = foreign_key_failures(
            "children",
            &ForeignKeySpec::new(["parent"], "items", ["name"]),
            &actual,
        );
        assert_eq!(failures[0].kind, FailureKind::ForeignKeyNotFound);
        assert_eq!(failures[0].actual, "(parent) -> users(id)");
    }

    #[test]
    fn duplicate_indexes_accept_any_satisfying_candidate() {
        let actual = vec![index("a", &["type"], false), index("b", &["type"], true)];
        assert!(index_failures("items", &IndexSpec::new(["type"]).unique(), &actual).is_empty());
        assert!(index_failures("items", &IndexSpec::new(["type"]), &actual).is_empty());

        let failures = index_failures("items", &IndexSpec::new(["type"]).named("c"), &actual);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].expected, "`c`");
        assert_eq!(failures[0].actual, "`a`");
    }

    #[test]
    fn index_lookup_reports_what_exists() {
        let failures = index_failures("items", &IndexSpec::new(["name"]), &[]);
        assert_eq!(failures[0].kind, FailureKind::IndexNotFound);
        assert_eq!(failures[0].actual, "no indexes");
    }
}
