//! Fetch user-defined types: enums and standalone composite types.
//! Table row types (relkind 'r') are not types of their own here.
use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use std::collections::HashMap;
use tracing::info;

use super::id::StableId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeAttribute {
    pub name: String,
    pub data_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// Labels in declaration order.
    Enum { labels: Vec<String> },
    Composite { attributes: Vec<TypeAttribute> },
}

#[derive(Debug, Clone)]
pub struct CustomType {
    pub schema: String,
    pub name: String,
    pub kind: TypeKind,
    /// pg_type oid from the snapshot; correlation only, never compared.
    pub oid: i64,
}

impl CustomType {
    pub fn stable_id(&self) -> StableId {
        StableId::Type {
            schema: self.schema.clone(),
            name: self.name.clone(),
        }
    }
}

pub async fn fetch(conn: &mut PgConnection) -> Result<Vec<CustomType>> {
    info!("Fetching custom types...");
    let type_rows = sqlx::query(
        r#"
        SELECT
            t.oid::bigint AS oid,
            n.nspname AS type_schema,
            t.typname AS type_name,
            t.typtype::text AS typtype
        FROM pg_type t
        JOIN pg_namespace n ON t.typnamespace = n.oid
        WHERE n.nspname NOT IN ('pg_catalog', 'information_schema', 'pg_toast')
          AND n.nspname NOT LIKE 'pg\_%'
          AND (
              t.typtype = 'e'
              OR (t.typtype = 'c' AND EXISTS (
                  SELECT 1 FROM pg_class c
                  WHERE c.oid = t.typrelid AND c.relkind = 'c'
              ))
          )
          AND NOT EXISTS (
              SELECT 1 FROM pg_depend dep
              WHERE dep.objid = t.oid
                AND dep.deptype = 'e'
          )
        ORDER BY n.nspname, t.typname
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let label_rows = sqlx::query(
        r#"
        SELECT
            e.enumtypid::bigint AS type_oid,
            e.enumlabel AS label
        FROM pg_enum e
        ORDER BY e.enumtypid, e.enumsortorder
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let attribute_rows = sqlx::query(
        r#"
        SELECT
            t.oid::bigint AS type_oid,
            a.attname AS attribute_name,
            pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type
        FROM pg_type t
        JOIN pg_class c ON t.typrelid = c.oid AND c.relkind = 'c'
        JOIN pg_attribute a ON a.attrelid = c.oid
        WHERE a.attnum > 0
          AND NOT a.attisdropped
        ORDER BY t.oid, a.attnum
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut labels_by_type: HashMap<i64, Vec<String>> = HashMap::new();
    for row in label_rows {
        let type_oid: i64 = row.get("type_oid");
        labels_by_type
            .entry(type_oid)
            .or_default()
            .push(row.get("label"));
    }

    let mut attributes_by_type: HashMap<i64, Vec<TypeAttribute>> = HashMap::new();
    for row in attribute_rows {
        let type_oid: i64 = row.get("type_oid");
        attributes_by_type
            .entry(type_oid)
            .or_default()
            .push(TypeAttribute {
                name: row.get("attribute_name"),
                data_type: row.get("data_type"),
            });
    }

    Ok(type_rows
        .into_iter()
        .map(|row| {
            let oid: i64 = row.get("oid");
            let typtype: String = row.get("typtype");
            let kind = if typtype == "e" {
                TypeKind::Enum {
                    labels: labels_by_type.remove(&oid).unwrap_or_default(),
                }
            } else {
                TypeKind::Composite {
                    attributes: attributes_by_type.remove(&oid).unwrap_or_default(),
                }
            };
            CustomType {
                schema: row.get("type_schema"),
                name: row.get("type_name"),
                kind,
                oid,
            }
        })
        .collect())
}
