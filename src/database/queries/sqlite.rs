pub const TABLE_EXISTS_QUERY: &str = r#"
SELECT EXISTS(
    SELECT 1 FROM sqlite_master
    WHERE type = 'table' AND name = ?1
);
"#;

pub const COLUMNS_QUERY: &str = r#"
SELECT
    p.name as column_name,
    p.type as data_type,
    p."notnull" as not_null,
    p.pk as primary_key
FROM pragma_table_info(?1) p
ORDER BY p.cid;
"#;

pub const FOREIGN_KEYS_QUERY: &str = r#"
SELECT
    f.id as fk_id,
    f.seq as seq,
    f."from" as column_name,
    f."table" as references_table,
    f."to" as references_column,
    f.on_update as on_update,
    f.on_delete as on_delete
FROM pragma_foreign_key_list(?1) f
ORDER BY f.id, f.seq;
"#;

pub const INDEXES_QUERY: &str = r#"
SELECT
    i.name as index_name,
    i."unique" as is_unique,
    i.origin as origin
FROM pragma_index_list(?1) i
ORDER BY i.name;
"#;

pub const INDEX_COLUMNS_QUERY: &str = r#"
SELECT name as column_name FROM pragma_index_info(?1) ORDER BY seqno;
"#;
