pub const TABLE_EXISTS_QUERY: &str = r#"
SELECT EXISTS(
    SELECT 1 FROM information_schema.tables
    WHERE table_schema = $1
    AND table_name = $2
    AND table_type = 'BASE TABLE'
);
"#;

// information_schema exposes domain types sqlx cannot decode directly, hence the casts
pub const COLUMNS_QUERY: &str = r#"
SELECT
    c.column_name::text as name,
    c.data_type::text as type,
    c.character_maximum_length::int4 as size,
    c.is_nullable = 'YES' as nullable
FROM information_schema.columns c
WHERE c.table_schema = $1
AND c.table_name = $2
ORDER BY c.ordinal_position;
"#;

pub const PRIMARY_KEY_QUERY: &str = r#"
SELECT
    tc.constraint_name::text as name,
    kcu.column_name::text as column
FROM information_schema.table_constraints tc
JOIN information_schema.key_column_usage kcu
    ON tc.constraint_name = kcu.constraint_name
    AND tc.table_schema = kcu.table_schema
    AND tc.table_name = kcu.table_name
WHERE tc.constraint_type = 'PRIMARY KEY'
AND tc.table_schema = $1
AND tc.table_name = $2
ORDER BY kcu.ordinal_position;
"#;

// Targets outside the inspected schema are reported schema-qualified
pub const FOREIGN_KEYS_QUERY: &str = r#"
SELECT
    con.conname::text as name,
    ARRAY(
        SELECT a.attname::text
        FROM unnest(con.conkey) WITH ORDINALITY AS k(attnum, ord)
        JOIN pg_attribute a ON a.attrelid = con.conrelid AND a.attnum = k.attnum
        ORDER BY k.ord
    ) as columns,
    CASE WHEN ftn.nspname = $1
        THEN ft.relname::text
        ELSE ftn.nspname::text || '.' || ft.relname::text
    END as foreign_table,
    ARRAY(
        SELECT a.attname::text
        FROM unnest(con.confkey) WITH ORDINALITY AS k(attnum, ord)
        JOIN pg_attribute a ON a.attrelid = con.confrelid AND a.attnum = k.attnum
        ORDER BY k.ord
    ) as foreign_columns,
    con.confupdtype::text as on_update,
    con.confdeltype::text as on_delete
FROM pg_constraint con
JOIN pg_class t ON t.oid = con.conrelid
JOIN pg_namespace n ON n.oid = t.relnamespace
JOIN pg_class ft ON ft.oid = con.confrelid
JOIN pg_namespace ftn ON ftn.oid = ft.relnamespace
WHERE con.contype = 'f'
AND n.nspname = $1
AND t.relname = $2
ORDER BY con.conname;
"#;

// Expression members (attnum 0) must match the placeholder in `db::models::EXPRESSION_MEMBER`
pub const INDEXES_QUERY: &str = r#"
SELECT
    ic.relname::text as name,
    ARRAY(
        SELECT COALESCE(a.attname::text, '<expression>')
        FROM unnest(ix.indkey::int2[]) WITH ORDINALITY AS k(attnum, ord)
        LEFT JOIN pg_attribute a ON a.attrelid = ix.indrelid AND a.attnum = k.attnum
        WHERE k.ord <= ix.indnkeyatts
        ORDER BY k.ord
    ) as columns,
    ix.indisunique as is_unique,
    ix.indisprimary as is_primary
FROM pg_index ix
JOIN pg_class t ON t.oid = ix.indrelid
JOIN pg_class ic ON ic.oid = ix.indexrelid
JOIN pg_namespace n ON n.oid = t.relnamespace
WHERE n.nspname = $1
AND t.relname = $2
ORDER BY ic.relname;
"#;
