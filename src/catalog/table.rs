//! Fetch tables + columns via pg_catalog for BASE TABLEs.
//! Constraints (including primary keys) are separate catalog entities.
use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use std::collections::HashMap;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub default: Option<String>,
    pub not_null: bool,
    /// Extractor-provided ordinal. Drives CREATE TABLE column order; not part
    /// of semantic equality (dropped columns leave gaps, appends shift it).
    pub position: i32,
}

#[derive(Debug, Clone)]
pub struct Table {
    pub schema: String,
    pub name: String,
    /// Columns in extractor position order.
    pub columns: Vec<Column>,
    pub rls_enabled: bool,
    /// pg_class oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Table {
    pub fn stable_id(&self) -> StableId {
        StableId::Table {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Table>> {
    info!("Fetching tables...");
    let table_rows = sqlx::query(
        r#"
        SELECT
            c.oid::bigint AS oid,
            n.nspname AS table_schema,
            c.relname AS table_name,
            c.relrowsecurity AS rls_enabled
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        WHERE c.relkind = 'r'
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = c.oid
                AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let column_rows = sqlx::query(
        r#"
        SELECT
            c.oid::bigint AS table_oid,
            a.attname AS column_name,
            pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
            pg_catalog.pg_get_expr(ad.adbin, ad.adrelid) AS column_default,
            a.attnotnull AS not_null,
            a.attnum::int AS position
        FROM pg_attribute a
        JOIN pg_class c ON a.attrelid = c.oid
        JOIN pg_namespace n ON c.relnamespace = n.oid
        LEFT JOIN pg_attrdef ad
          ON a.attrelid = ad.adrelid
         AND a.attnum = ad.adnum
        WHERE a.attnum > 0
          AND NOT a.attisdropped
          AND c.relkind = 'r'
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
        ORDER BY c.oid, a.attnum
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut columns_by_table: HashMap<i64, Vec<Column>> = HashMap::new();
    for row in column_rows {
        let table_oid: i64 = row.get("table_oid");
        columns_by_table.entry(table_oid).or_default().push(Column {
            name: row.get("column_name"),
            data_type: row.get("data_type"),
            default: row.get("column_default"),
            not_null: row.get("not_null"),
            position: row.get("position"),
        });
    }

    Ok(table_rows
        .into_iter()
        .map(|row| {
            let oid: i64 = row.get("oid");
            Table {
                schema: row.get("table_schema"),
                name: row.get("table_name"),
                columns: columns_by_table.remove(&oid).unwrap_or_default(),
                rls_enabled: row.get("rls_enabled"),
                oid,
            }
        })
        .collect())
}
