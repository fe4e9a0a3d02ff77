use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone)]
pub struct Schema {
    pub name: String,
    /// pg_namespace oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Schema {
    pub fn stable_id(&self) -> StableId {
        StableId::Schema {
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Schema>> {
    info!("Fetching schemas...");
    let rows = sqlx::query(
        r#"
        SELECT
            n.oid::bigint AS oid,
            n.nspname AS name
        FROM pg_namespace n
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
        ORDER BY n.nspname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| Schema {
            name: row.get("name"),
            oid: row.get("oid"),
        })
        .collect())
}
