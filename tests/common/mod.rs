//! Scenarios shared by every engine's integration suite
//!
//! Each helper takes an inspector over a database prepared by the calling
//! suite and the engine it runs, and asserts the outcome the engine's model
//! should produce.

use rbac_db_schema::{
    ColumnField, ColumnSpec, DatabaseType, FailureKind, ForeignKeyField, ForeignKeySpec,
    IndexField, IndexSpec, SchemaConfig, SchemaInspector, SchemaModel, SchemaReadError,
    SchemaVerifier, TableKind, VerifyError,
};

pub fn model_for(engine: DatabaseType) -> SchemaModel {
    SchemaModel::new(&SchemaConfig::new(engine))
}

pub fn failure_kind(result: Result<(), VerifyError>) -> FailureKind {
    let err = result.expect_err("verification should fail");
    err.kind()
        .unwrap_or_else(|| panic!("expected an assertion failure, got {}", err))
}

// ============================================================================
// Empty Database
// ============================================================================

/// Nothing migrated yet: absence checks pass, everything else fails.
pub async fn clean_database(inspector: &dyn SchemaInspector, engine: DatabaseType) {
    let model = model_for(engine);
    let verifier = SchemaVerifier::new(inspector, &model);

    assert!(verifier.verify_clean().await.unwrap().is_ok());
    for kind in TableKind::ALL {
        assert!(verifier.verify_table_absent(kind).await.is_ok());
        assert_eq!(
            failure_kind(verifier.verify_table_exists(kind).await),
            FailureKind::MissingTable
        );
    }

    let report = verifier.verify_schema().await.unwrap();
    assert_eq!(report.len(), 3, "{}", report);
    assert!(report.failures().iter().all(|f| f.kind == FailureKind::MissingTable));

    let results = vec![
        verifier
            .verify_column(TableKind::Items, &ColumnSpec::string("name", 128))
            .await,
        verifier
            .verify_primary_key(TableKind::Assignments, &["itemName", "userId"])
            .await,
        verifier
            .verify_foreign_key(
                TableKind::ItemsChildren,
                &ForeignKeySpec::new(["parent"], "yii_rbac_item", ["name"]),
            )
            .await,
        verifier
            .verify_index(TableKind::Items, &IndexSpec::new(["type"]))
            .await,
    ];
    for result in results {
        assert!(
            matches!(result, Err(VerifyError::Read(SchemaReadError::TableNotFound(_)))),
            "expected a read error, got {:?}",
            result
        );
    }
}

// ============================================================================
// Migrated Database
// ============================================================================

pub async fn migrated_tables(inspector: &dyn SchemaInspector, engine: DatabaseType) {
    let model = model_for(engine);
    let verifier = SchemaVerifier::new(inspector, &model);

    let report = verifier.verify_schema().await.unwrap();
    assert!(report.is_ok(), "{}", report);

    for kind in TableKind::ALL {
        assert!(verifier.verify_table_exists(kind).await.is_ok());
        assert_eq!(
            failure_kind(verifier.verify_table_absent(kind).await),
            FailureKind::UnexpectedTable
        );
    }
    assert_eq!(verifier.verify_clean().await.unwrap().len(), 3);
}

/// Each column attribute fails on its own.
pub async fn column_attributes(inspector: &dyn SchemaInspector, engine: DatabaseType) {
    let model = model_for(engine);
    let verifier = SchemaVerifier::new(inspector, &model);

    for column in &model.table(TableKind::Items).columns {
        assert!(
            verifier.verify_column(TableKind::Items, column).await.is_ok(),
            "column {} should match",
            column.name
        );
    }

    let err = verifier
        .verify_column(TableKind::Items, &ColumnSpec::string("type", 11))
        .await
        .unwrap_err();
    let failure = err.as_assertion().unwrap();
    assert_eq!(
        failure.kind,
        FailureKind::ColumnMismatch {
            field: ColumnField::Size
        }
    );
    assert_eq!(failure.expected, "11");
    assert_eq!(failure.actual, "10");
    assert_eq!(failure.table, "yii_rbac_item");

    let cases = [
        (ColumnSpec::string("type", 10).nullable(), ColumnField::Nullability),
        (ColumnSpec::integer("type"), ColumnField::Type),
        (ColumnSpec::string("label", 10), ColumnField::Presence),
    ];
    for (column, field) in cases {
        assert_eq!(
            failure_kind(verifier.verify_column(TableKind::Items, &column).await),
            FailureKind::ColumnMismatch { field },
            "column {}",
            column.name
        );
    }
}

pub async fn primary_keys(inspector: &dyn SchemaInspector, engine: DatabaseType) {
    let model = model_for(engine);
    let verifier = SchemaVerifier::new(inspector, &model);

    assert!(verifier
        .verify_primary_key(TableKind::ItemsChildren, &["parent", "child"])
        .await
        .is_ok());
    assert!(verifier
        .verify_primary_key(TableKind::ItemsChildren, &["child", "parent"])
        .await
        .is_ok());
    assert!(verifier
        .verify_primary_key(TableKind::Items, &["name"])
        .await
        .is_ok());

    assert_eq!(
        failure_kind(
            verifier
                .verify_primary_key(TableKind::ItemsChildren, &["parent"])
                .await
        ),
        FailureKind::PrimaryKeyMismatch
    );
    assert_eq!(
        failure_kind(
            verifier
                .verify_primary_key(TableKind::Assignments, &["itemName", "userId", "createdAt"])
                .await
        ),
        FailureKind::PrimaryKeyMismatch
    );
}

/// Keys are located by columns and target; the name is checked afterwards.
pub async fn foreign_keys(inspector: &dyn SchemaInspector, engine: DatabaseType) {
    let model = model_for(engine);
    let verifier = SchemaVerifier::new(inspector, &model);

    for foreign_key in &model.table(TableKind::ItemsChildren).foreign_keys {
        assert!(
            verifier
                .verify_foreign_key(TableKind::ItemsChildren, foreign_key)
                .await
                .is_ok(),
            "foreign key {} should match",
            foreign_key
        );
    }

    let parent = ForeignKeySpec::new(["parent"], "yii_rbac_item", ["name"]);
    assert_eq!(
        failure_kind(
            verifier
                .verify_foreign_key(
                    TableKind::ItemsChildren,
                    &parent.clone().named("fk-somewhere-else")
                )
                .await
        ),
        FailureKind::ForeignKeyMismatch {
            field: ForeignKeyField::Name
        }
    );

    let wrong_columns = ForeignKeySpec::new(["child"], "yii_rbac_item", ["type"])
        .named("fk-yii_rbac_item_child-child");
    assert_eq!(
        failure_kind(
            verifier
                .verify_foreign_key(TableKind::ItemsChildren, &wrong_columns)
                .await
        ),
        FailureKind::ForeignKeyNotFound
    );

    assert_eq!(
        failure_kind(
            verifier
                .verify_foreign_key(
                    TableKind::Assignments,
                    &ForeignKeySpec::new(["itemName"], "yii_rbac_item", ["name"])
                )
                .await
        ),
        FailureKind::ForeignKeyNotFound
    );
    assert!(verifier
        .verify_foreign_key_count(TableKind::Assignments, 0)
        .await
        .is_ok());
    assert_eq!(
        failure_kind(
            verifier
                .verify_foreign_key_count(TableKind::ItemsChildren, 1)
                .await
        ),
        FailureKind::CountMismatch
    );
}

pub async fn indexes(inspector: &dyn SchemaInspector, engine: DatabaseType) {
    let model = model_for(engine);
    let verifier = SchemaVerifier::new(inspector, &model);

    assert!(verifier
        .verify_index(TableKind::Items, &IndexSpec::new(["name"]).primary())
        .await
        .is_ok());
    assert!(verifier
        .verify_index(
            TableKind::Items,
            &IndexSpec::new(["type"]).named("idx-yii_rbac_item-type")
        )
        .await
        .is_ok());
    assert!(verifier
        .verify_index(
            TableKind::Assignments,
            &IndexSpec::new(["userId", "itemName"]).primary()
        )
        .await
        .is_ok());
    assert!(verifier
        .verify_index_count(TableKind::Assignments, 1)
        .await
        .is_ok());

    let cases = [
        (IndexSpec::new(["type"]).unique(), IndexField::Unique),
        (IndexSpec::new(["name"]).unique(), IndexField::Primary),
        (IndexSpec::new(["type"]).named("idx-type"), IndexField::Name),
    ];
    for (index, field) in cases {
        assert_eq!(
            failure_kind(verifier.verify_index(TableKind::Items, &index).await),
            FailureKind::IndexMismatch { field },
            "index {}",
            index
        );
    }
    assert_eq!(
        failure_kind(
            verifier
                .verify_index(TableKind::Items, &IndexSpec::new(["description"]))
                .await
        ),
        FailureKind::IndexNotFound
    );
}
