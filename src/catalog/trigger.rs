use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone)]
pub struct Trigger {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Captured `CREATE TRIGGER …` statement from pg_get_triggerdef.
    pub definition: String,
    /// pg_trigger oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Trigger {
    pub fn stable_id(&self) -> StableId {
        StableId::Trigger {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Trigger>> {
    info!("Fetching triggers...");
    let rows = sqlx::query(
        r#"
        SELECT
            t.oid::bigint AS oid,
            n.nspname AS table_schema,
            c.relname AS table_name,
            t.tgname AS trigger_name,
            pg_catalog.pg_get_triggerdef(t.oid) AS definition
        FROM pg_trigger t
        JOIN pg_class c ON t.tgrelid = c.oid
        JOIN pg_namespace n ON c.relnamespace = n.oid
        WHERE NOT t.tgisinternal
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = t.oid
                AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, c.relname, t.tgname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Trigger {
            schema: row.get("table_schema"),
            table: row.get("table_name"),
            name: row.get("trigger_name"),
            definition: row.get("definition"),
            oid: row.get("oid"),
        })
        .collect())
}
