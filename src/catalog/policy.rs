use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

/// Command type for RLS policies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyCommand {
    All,
    Select,
    Insert,
    Update,
    Delete,
}

impl PolicyCommand {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            PolicyCommand::All => "ALL",
            PolicyCommand::Select => "SELECT",
            PolicyCommand::Insert => "INSERT",
            PolicyCommand::Update => "UPDATE",
            PolicyCommand::Delete => "DELETE",
        }
    }
}

/// Represents a PostgreSQL Row-Level Security policy
#[derive(Debug, Clone)]
pub struct Policy {
    pub schema: String,
    pub table: String,
    pub name: String,

    pub command: PolicyCommand,

    /// true = PERMISSIVE, false = RESTRICTIVE
    pub permissive: bool,

    /// Roles this policy applies to (empty = PUBLIC)
    pub roles: Vec<String>,

    /// USING expression (for SELECT, UPDATE, DELETE)
    pub using_expr: Option<String>,

    /// WITH CHECK expression (for INSERT, UPDATE)
    pub with_check_expr: Option<String>,

    /// pg_policy oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Policy {
    pub fn stable_id(&self) -> StableId {
        StableId::Policy {
            schema: self.schema.clone(),
            table: self.table.clone(),
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Policy>> {
    info!("Fetching RLS policies...");
    let rows = sqlx::query(
        r#"
        SELECT
            p.oid::bigint AS oid,
            n.nspname AS table_schema,
            c.relname AS table_name,
            p.polname AS policy_name,
            p.polcmd::text AS command,
            p.polpermissive AS permissive,
            COALESCE(
                ARRAY(
                    SELECT rolname FROM pg_roles
                    WHERE oid = ANY(p.polroles)
                    ORDER BY rolname
                ),
                '{}'::text[]
            ) AS roles,
            pg_catalog.pg_get_expr(p.polqual, p.polrelid) AS using_expr,
            pg_catalog.pg_get_expr(p.polwithcheck, p.polrelid) AS with_check_expr
        FROM pg_policy p
        JOIN pg_class c ON p.polrelid = c.oid
        JOIN pg_namespace n ON c.relnamespace = n.oid
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
        ORDER BY n.nspname, c.relname, p.polname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let command: String = row.get("command");
            Policy {
                schema: row.get("table_schema"),
                table: row.get("table_name"),
                name: row.get("policy_name"),
                command: match command.as_str() {
                    "r" => PolicyCommand::Select,
                    "a" => PolicyCommand::Insert,
                    "w" => PolicyCommand::Update,
                    "d" => PolicyCommand::Delete,
                    _ => PolicyCommand::All,
                },
                permissive: row.get("permissive"),
                roles: row.get("roles"),
                using_expr: row.get("using_expr"),
                with_check_expr: row.get("with_check_expr"),
                oid: row.get("oid"),
            }
        })
        .collect())
}
