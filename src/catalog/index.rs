//! Fetch indexes. The whole CREATE INDEX statement is captured via
//! pg_get_indexdef and reused verbatim by the emitter; a changed definition
//! means drop + recreate.
use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone)]
pub struct Index {
    pub schema: String,
    pub name: String,
    pub table_schema: String,
    pub table_name: String,
    /// Captured `CREATE [UNIQUE] INDEX …` statement.
    pub definition: String,
    /// pg_class oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Index {
    pub fn stable_id(&self) -> StableId {
        StableId::Index {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Index>> {
    info!("Fetching indexes...");
    let rows = sqlx::query(
        r#"
        SELECT
            i.oid::bigint AS oid,
            n.nspname AS index_schema,
            i.relname AS index_name,
            tn.nspname AS table_schema,
            t.relname AS table_name,
            pg_catalog.pg_get_indexdef(i.oid) AS definition
        FROM pg_index idx
        JOIN pg_class i ON idx.indexrelid = i.oid
        JOIN pg_namespace n ON i.relnamespace = n.oid
        JOIN pg_class t ON idx.indrelid = t.oid
        JOIN pg_namespace tn ON t.relnamespace = tn.oid
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
          AND tn.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND tn.nspname NOT LIKE 'pg\_%'
          AND NOT idx.indisprimary
          -- Indexes backing constraints are covered by the constraint catalog
          AND NOT EXISTS (
              SELECT 1 FROM pg_constraint c WHERE c.conindid = idx.indexrelid
          )
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = i.oid
                AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, i.relname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Index {
            schema: row.get("index_schema"),
            name: row.get("index_name"),
            table_schema: row.get("table_schema"),
            table_name: row.get("table_name"),
            definition: row.get("definition"),
            oid: row.get("oid"),
        })
        .collect())
}
