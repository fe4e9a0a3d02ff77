//! Raw object-to-object dependency edges from pg_depend.
//!
//! Every edge is resolved to a pair of `StableId`s at extraction time using
//! the entities' snapshot oids. Endpoints that do not resolve to a catalog
//! entity (system objects, dependency classes we do not track) are discarded
//! here; downstream code only ever sees fully resolved edges.
use anyhow::Result;
use sqlx::Row;
use sqlx::postgres::PgConnection;
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

use super::id::StableId;

/// pg_depend deptype, for the classes the differ cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DepClass {
    /// deptype 'n'
    Normal,
    /// deptype 'a' (e.g. a sequence OWNED BY a column)
    Auto,
    /// deptype 'i' (e.g. a view's rewrite rule on the view itself)
    Internal,
}

/// A directed dependency: `dependent` requires `referenced` to exist.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct DepEdge {
    pub dependent: StableId,
    pub referenced: StableId,
    pub class: DepClass,
}

/// Maps snapshot oids back to stable identifiers. Indirection tables
/// (pg_rewrite, pg_attrdef, array types) fold into the object they belong to.
#[derive(Debug, Default)]
pub struct OidResolver {
    /// pg_class oids: tables, views, materialized views, sequences, indexes.
    pub relations: HashMap<i64, StableId>,
    pub schemas: HashMap<i64, StableId>,
    pub functions: HashMap<i64, StableId>,
    pub types: HashMap<i64, StableId>,
    pub constraints: HashMap<i64, StableId>,
    pub triggers: HashMap<i64, StableId>,
    pub policies: HashMap<i64, StableId>,
    /// pg_rewrite oid -> pg_class oid of the rule's view.
    rewrites: HashMap<i64, i64>,
    /// pg_attrdef oid -> pg_class oid of the defaulted table.
    attrdefs: HashMap<i64, i64>,
    /// array type oid -> element type oid.
    array_elements: HashMap<i64, i64>,
}

impl OidResolver {
    fn resolve(&self, class: &str, oid: i64) -> Option<StableId> {
        match class {
            "pg_class" => self.relations.get(&oid).cloned(),
            "pg_namespace" => self.schemas.get(&oid).cloned(),
            "pg_proc" => self.functions.get(&oid).cloned(),
            "pg_type" => self.types.get(&oid).cloned().or_else(|| {
                let elem = self.array_elements.get(&oid)?;
                self.types.get(elem).cloned()
            }),
            "pg_constraint" => self.constraints.get(&oid).cloned(),
            "pg_trigger" => self.triggers.get(&oid).cloned(),
            "pg_policy" => self.policies.get(&oid).cloned(),
            // A rewrite rule stands for its view; an attribute default stands
            // for its table.
            "pg_rewrite" => {
                let rel = self.rewrites.get(&oid)?;
                self.relations.get(rel).cloned()
            }
            "pg_attrdef" => {
                let rel = self.attrdefs.get(&oid)?;
                self.relations.get(rel).cloned()
            }
            _ => None,
        }
    }

    async fn load_indirections(&mut self, conn: &mut PgConnection) -> Result<()> {
        let rewrite_rows = sqlx::query(
            "SELECT r.oid::bigint AS oid, r.ev_class::bigint AS rel_oid FROM pg_rewrite r",
        )
        .fetch_all(&mut *conn)
        .await?;
        for row in rewrite_rows {
            self.rewrites.insert(row.get("oid"), row.get("rel_oid"));
        }

        let attrdef_rows = sqlx::query(
            "SELECT ad.oid::bigint AS oid, ad.adrelid::bigint AS rel_oid FROM pg_attrdef ad",
        )
        .fetch_all(&mut *conn)
        .await?;
        for row in attrdef_rows {
            self.attrdefs.insert(row.get("oid"), row.get("rel_oid"));
        }

        let array_rows = sqlx::query(
            "SELECT t.oid::bigint AS oid, t.typelem::bigint AS elem_oid FROM pg_type t WHERE t.typelem <> 0",
        )
        .fetch_all(&mut *conn)
        .await?;
        for row in array_rows {
            self.array_elements
                .insert(row.get("oid"), row.get("elem_oid"));
        }

        Ok(())
    }
}

/// Fetch and resolve the dependency edge list. The resolver must already
/// contain the oid maps of every extracted entity.
pub async fn fetch(conn: &mut PgConnection, mut resolver: OidResolver) -> Result<Vec<DepEdge>> {
    info!("Fetching dependency edges...");
    resolver.load_indirections(&mut *conn).await?;

    let rows = sqlx::query(
        r#"
        SELECT
            d.classid::regclass::text AS dependent_class,
            d.objid::bigint AS dependent_oid,
            d.refclassid::regclass::text AS referenced_class,
            d.refobjid::bigint AS referenced_oid,
            d.deptype::text AS deptype
        FROM pg_depend d
        WHERE d.deptype IN ('n', 'a', 'i')
        "#,
    )
    .fetch_all(&mut *conn)
    .await?;

    let mut edges: BTreeSet<DepEdge> = BTreeSet::new();
    let mut discarded = 0usize;
    for row in rows {
        let dependent_class: String = row.get("dependent_class");
        let referenced_class: String = row.get("referenced_class");
        let deptype: String = row.get("deptype");

        let class = match deptype.as_str() {
            "n" => DepClass::Normal,
            "a" => DepClass::Auto,
            "i" => DepClass::Internal,
            _ => continue,
        };

        let dependent = resolver.resolve(&dependent_class, row.get("dependent_oid"));
        let referenced = resolver.resolve(&referenced_class, row.get("referenced_oid"));
        match (dependent, referenced) {
            (Some(dependent), Some(referenced)) if dependent != referenced => {
                edges.insert(DepEdge {
                    dependent,
                    referenced,
                    class,
                });
            }
            (Some(_), Some(_)) => {} // self edge via an indirection table
            _ => discarded += 1,
        }
    }

    if discarded > 0 {
        debug!(
            "Discarded {} dependency rows with system or unknown endpoints",
            discarded
        );
    }

    Ok(edges.into_iter().collect())
}
