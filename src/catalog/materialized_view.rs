use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone)]
pub struct MaterializedView {
    pub schema: String,
    pub name: String,
    /// Raw `SELECT …` body.
    pub definition: String,
    /// pg_class oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl MaterializedView {
    pub fn stable_id(&self) -> StableId {
        StableId::MaterializedView {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<MaterializedView>> {
    info!("Fetching materialized views...");
    let rows = sqlx::query(
        r#"
        SELECT
            c.oid::bigint AS oid,
            n.nspname AS view_schema,
            c.relname AS view_name,
            pg_catalog.pg_get_viewdef(c.oid, true) AS definition
        FROM pg_class c
        JOIN pg_namespace n ON c.relnamespace = n.oid
        WHERE c.relkind = 'm'
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

    Ok(rows
        .into_iter()
        .map(|row| MaterializedView {
            schema: row.get("view_schema"),
            name: row.get("view_name"),
            definition: row.get("definition"),
            oid: row.get("oid"),
        })
        .collect())
}
