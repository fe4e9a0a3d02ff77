use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

/// `OWNED BY` target of a sequence backing a column default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceOwner {
    pub schema: String,
    pub table: String,
    pub column: String,
}

#[derive(Debug, Clone)]
pub struct Sequence {
    pub schema: String,
    pub name: String,
    pub data_type: String,
    pub start_value: i64,
    pub min_value: i64,
    pub max_value: i64,
    pub increment: i64,
    pub cache: i64,
    pub cycle: bool,
    pub owned_by: Option<SequenceOwner>,
    /// pg_class oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Sequence {
    pub fn stable_id(&self) -> StableId {
        StableId::Sequence {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Sequence>> {
    info!("Fetching sequences...");
    let rows = sqlx::query(
        r#"
        SELECT
            c.oid::bigint AS oid,
            n.nspname AS sequence_schema,
            c.relname AS sequence_name,
            t.typname AS data_type,
            COALESCE(seq.seqstart, 1) AS start_value,
            COALESCE(seq.seqmin, 1) AS min_value,
            COALESCE(seq.seqmax, 9223372036854775807) AS max_value,
            COALESCE(seq.seqincrement, 1) AS increment_by,
            COALESCE(seq.seqcache, 1) AS cache_size,
            COALESCE(seq.seqcycle, false) AS cycle,
            ref_n.nspname AS owner_schema,
            ref_c.relname AS owner_table,
            ref_a.attname AS owner_column
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        LEFT JOIN pg_sequence seq ON seq.seqrelid = c.oid
        LEFT JOIN pg_type t ON seq.seqtypid = t.oid
        LEFT JOIN pg_depend d ON d.objid = c.oid
            AND d.classid = 'pg_class'::regclass
            AND d.objsubid = 0
            AND d.refclassid = 'pg_class'::regclass
            AND d.refobjsubid > 0
            AND d.deptype = 'a'  -- auto dependency recorded for OWNED BY
        LEFT JOIN pg_class ref_c ON d.refobjid = ref_c.oid
        LEFT JOIN pg_namespace ref_n ON ref_c.relnamespace = ref_n.oid
        LEFT JOIN pg_attribute ref_a ON ref_a.attrelid = ref_c.oid AND ref_a.attnum = d.refobjsubid
        WHERE c.relkind = 'S'
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend ext_dep
              WHERE ext_dep.objid = c.oid
                AND ext_dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut sequences = Vec::new();
    for row in rows {
        let raw_data_type: Option<String> = row.get("data_type");
        // Normalize PostgreSQL internal type names to SQL standard names
        let data_type = match raw_data_type.as_deref() {
            Some("int4") => "integer".to_string(),
            Some("int8") | None => "bigint".to_string(),
            Some("int2") => "smallint".to_string(),
            Some(other) => other.to_string(),
        };

        let owner_schema: Option<String> = row.get("owner_schema");
        let owner_table: Option<String> = row.get("owner_table");
        let owner_column: Option<String> = row.get("owner_column");
        let owned_by = match (owner_schema, owner_table, owner_column) {
            (Some(schema), Some(table), Some(column)) => Some(SequenceOwner {
                schema,
                table,
                column,
            }),
            _ => None,
        };

        sequences.push(Sequence {
            schema: row.get("sequence_schema"),
            name: row.get("sequence_name"),
            data_type,
            start_value: row.get("start_value"),
            min_value: row.get("min_value"),
            max_value: row.get("max_value"),
            increment: row.get("increment_by"),
            cache: row.get("cache_size"),
            cycle: row.get("cycle"),
            owned_by,
            oid: row.get("oid"),
        });
    }

    Ok(sequences)
}
