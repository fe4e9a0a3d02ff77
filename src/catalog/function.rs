use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Function,
    Procedure,
}

impl FunctionKind {
    pub fn sql_keyword(&self) -> &'static str {
        match self {
            FunctionKind::Function => "FUNCTION",
            FunctionKind::Procedure => "PROCEDURE",
        }
    }
}

/// A function or procedure. Identified by schema, name and identity argument
/// list (overloads are distinct entities). The whole definition comes from
/// pg_get_functiondef.
#[derive(Debug, Clone)]
pub struct Function {
    pub schema: String,
    pub name: String,
    /// Identity argument list from pg_get_function_identity_arguments.
    pub arguments: String,
    pub kind: FunctionKind,
    /// NULL for procedures.
    pub return_type: Option<String>,
    /// Captured `CREATE OR REPLACE FUNCTION …` statement.
    pub definition: String,
    /// pg_proc oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl Function {
    pub fn stable_id(&self) -> StableId {
        StableId::Function {
            schema: self.schema.clone(),
            name: self.name.clone(),
            arguments: self.arguments.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<Function>> {
    info!("Fetching functions and procedures...");
    let rows = sqlx::query(
        r#"
        SELECT
            p.oid::bigint AS oid,
            n.nspname AS function_schema,
            p.proname AS function_name,
            pg_catalog.pg_get_function_identity_arguments(p.oid) AS arguments,
            p.prokind::text AS kind,
            CASE WHEN p.prokind = 'f'
                 THEN pg_catalog.pg_get_function_result(p.oid)
            END AS return_type,
            pg_catalog.pg_get_functiondef(p.oid) AS definition
        FROM pg_proc p
        JOIN pg_namespace n ON p.pronamespace = n.oid
        WHERE p.prokind IN ('f', 'p')
          AND n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = p.oid
                AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, p.proname, 4
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let kind: String = row.get("kind");
            Function {
                schema: row.get("function_schema"),
                name: row.get("function_name"),
                arguments: row.get("arguments"),
                kind: if kind == "p" {
                    FunctionKind::Procedure
                } else {
                    FunctionKind::Function
                },
                return_type: row.get("return_type"),
                definition: row.get("definition"),
                oid: row.get("oid"),
            }
        })
        .collect())
}
