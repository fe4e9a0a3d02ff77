//! Fetch table constraints (primary key, unique, foreign key, check,
//! exclusion). The constraint body comes from pg_get_constraintdef and is
//! emitted as `ALTER TABLE … ADD CONSTRAINT …`.
use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone)]
pub struct Constraint {
    pub schema: String,
    pub table: String,
    pub name: String,
    /// Captured constraint body, e.g. `FOREIGN KEY (user_id) REFERENCES …`.
    pub definition: String,
    /// pg_constraint oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Constraint {
    pub fn stable_id(&self) -> StableId {
        StableId::Constraint {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Constraint>> {
    info!("Fetching constraints...");
    let rows = sqlx::query(
        r#"
        SELECT
            con.oid::bigint AS oid,
            n.nspname AS table_schema,
            rel.relname AS table_name,
            con.conname AS constraint_name,
            pg_catalog.pg_get_constraintdef(con.oid) AS definition
        FROM pg_constraint con
        JOIN pg_class rel ON con.conrelid = rel.oid
        JOIN pg_namespace n ON rel.relnamespace = n.oid
        WHERE con.conrelid <> 0
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = con.oid
                AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, rel.relname, con.conname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Constraint {
            schema: row.get("table_schema"),
            table: row.get("table_name"),
            name: row.get("constraint_name"),
            definition: row.get("definition"),
            oid: row.get("oid"),
        })
        .collect())
}
