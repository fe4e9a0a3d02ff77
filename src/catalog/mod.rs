use anyhow::{Result, bail};
use sqlx::PgPool;
use std::collections::BTreeMap;
use tracing::info;

pub mod constraint;
pub mod custom_type;
pub mod dependency;
pub mod function;
pub mod id;
pub mod index;
pub mod materialized_view;
pub mod policy;
pub mod schema;
pub mod semantic;
pub mod sequence;
pub mod table;
pub mod trigger;
pub mod view;

use dependency::{DepEdge, OidResolver};
use id::StableId;
use semantic::SemanticEq;
use table::Column;

/// An immutable snapshot of a database's DDL-relevant state. Every keyed
/// collection is indexed by `StableId`; construction goes through the `add_*`
/// helpers which reject duplicate identifiers. Nothing downstream mutates a
/// catalog.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    pub schemas: BTreeMap<StableId, schema::Schema>,
    pub tables: BTreeMap<StableId, table::Table>,
    pub views: BTreeMap<StableId, view::View>,
    pub materialized_views: BTreeMap<StableId, materialized_view::MaterializedView>,
    pub indexes: BTreeMap<StableId, index::Index>,
    pub sequences: BTreeMap<StableId, sequence::Sequence>,
    pub constraints: BTreeMap<StableId, constraint::Constraint>,
    pub triggers: BTreeMap<StableId, trigger::Trigger>,
    pub functions: BTreeMap<StableId, function::Function>,
    pub policies: BTreeMap<StableId, policy::Policy>,
    pub types: BTreeMap<StableId, custom_type::CustomType>,

    /// Raw dependency edges, endpoints already resolved to `StableId`s.
    pub depends: Vec<DepEdge>,
}

macro_rules! add_entity {
    ($fn_name:ident, $collection:ident, $ty:ty) => {
        pub fn $fn_name(&mut self, entity: $ty) -> Result<()> {
            let id = entity.stable_id();
            if self.$collection.insert(id.clone(), entity).is_some() {
                bail!("duplicate stable id in catalog: {}", id);
            }
            Ok(())
        }
    };
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    add_entity!(add_schema, schemas, schema::Schema);
    add_entity!(add_table, tables, table::Table);
    add_entity!(add_view, views, view::View);
    add_entity!(
        add_materialized_view,
        materialized_views,
        materialized_view::MaterializedView
    );
    add_entity!(add_index, indexes, index::Index);
    add_entity!(add_sequence, sequences, sequence::Sequence);
    add_entity!(add_constraint, constraints, constraint::Constraint);
    add_entity!(add_trigger, triggers, trigger::Trigger);
    add_entity!(add_function, functions, function::Function);
    add_entity!(add_policy, policies, policy::Policy);
    add_entity!(add_type, types, custom_type::CustomType);

    /// Extract a catalog snapshot from a live database.
    pub async fn load(pool: &PgPool) -> Result<Self> {
        // Single connection so every fetch sees the same search_path; the
        // pg_get_* pretty-printers qualify names relative to it.
        let mut conn = pool.acquire().await?;
        sqlx::query("SET search_path = public, pg_catalog")
            .execute(&mut *conn)
            .await?;

        let schemas = schema::fetch(&mut conn).await?;
        let tables = table::fetch(&mut conn).await?;
        let views = view::fetch(&mut conn).await?;
        let materialized_views = materialized_view::fetch(&mut conn).await?;
        let indexes = index::fetch(&mut conn).await?;
        let sequences = sequence::fetch(&mut conn).await?;
        let constraints = constraint::fetch(&mut conn).await?;
        let triggers = trigger::fetch(&mut conn).await?;
        let functions = function::fetch(&mut conn).await?;
        let policies = policy::fetch(&mut conn).await?;
        let types = custom_type::fetch(&mut conn).await?;

        let mut resolver = OidResolver::default();
        for s in &schemas {
            resolver.schemas.insert(s.oid, s.stable_id());
        }
        for t in &tables {
            resolver.relations.insert(t.oid, t.stable_id());
        }
        for v in &views {
            resolver.relations.insert(v.oid, v.stable_id());
        }
        for m in &materialized_views {
            resolver.relations.insert(m.oid, m.stable_id());
        }
        for i in &indexes {
            resolver.relations.insert(i.oid, i.stable_id());
        }
        for s in &sequences {
            resolver.relations.insert(s.oid, s.stable_id());
        }
        for c in &constraints {
            resolver.constraints.insert(c.oid, c.stable_id());
        }
        for t in &triggers {
            resolver.triggers.insert(t.oid, t.stable_id());
        }
        for f in &functions {
            resolver.functions.insert(f.oid, f.stable_id());
        }
        for p in &policies {
            resolver.policies.insert(p.oid, p.stable_id());
        }
        for t in &types {
            resolver.types.insert(t.oid, t.stable_id());
        }

        let depends = dependency::fetch(&mut conn, resolver).await?;

        let mut catalog = Catalog::empty();
        for s in schemas {
            catalog.add_schema(s)?;
        }
        for t in tables {
            catalog.add_table(t)?;
        }
        for v in views {
            catalog.add_view(v)?;
        }
        for m in materialized_views {
            catalog.add_materialized_view(m)?;
        }
        for i in indexes {
            catalog.add_index(i)?;
        }
        for s in sequences {
            catalog.add_sequence(s)?;
        }
        for c in constraints {
            catalog.add_constraint(c)?;
        }
        for t in triggers {
            catalog.add_trigger(t)?;
        }
        for f in functions {
            catalog.add_function(f)?;
        }
        for p in policies {
            catalog.add_policy(p)?;
        }
        for t in types {
            catalog.add_type(t)?;
        }
        catalog.depends = depends;

        catalog.validate()?;
        info!(
            "Catalog loaded: {} schemas, {} tables, {} dependency edges",
            catalog.schemas.len(),
            catalog.tables.len(),
            catalog.depends.len()
        );
        Ok(catalog)
    }

    pub fn contains_id(&self, id: &StableId) -> bool {
        match id {
            StableId::Schema { .. } => self.schemas.contains_key(id),
            StableId::Table { .. } => self.tables.contains_key(id),
            StableId::View { .. } => self.views.contains_key(id),
            StableId::MaterializedView { .. } => self.materialized_views.contains_key(id),
            StableId::Index { .. } => self.indexes.contains_key(id),
            StableId::Sequence { .. } => self.sequences.contains_key(id),
            StableId::Constraint { .. } => self.constraints.contains_key(id),
            StableId::Trigger { .. } => self.triggers.contains_key(id),
            StableId::Function { .. } => self.functions.contains_key(id),
            StableId::Type { .. } => self.types.contains_key(id),
            StableId::Policy { .. } => self.policies.contains_key(id),
            StableId::Column {
                schema,
                table,
                name,
            } => {
                let table_id = StableId::Table {
                    schema: schema.clone(),
                    name: table.clone(),
                };
                self.tables
                    .get(&table_id)
                    .is_some_and(|t| t.column(name).is_some())
            }
        }
    }

    /// Columns of a table in extractor position order. Order is observable:
    /// it drives the generated CREATE TABLE.
    pub fn columns_of(&self, table_id: &StableId) -> Option<&[Column]> {
        self.tables.get(table_id).map(|t| t.columns.as_slice())
    }

    pub fn all_ids(&self) -> impl Iterator<Item = &StableId> {
        self.schemas
            .keys()
            .chain(self.tables.keys())
            .chain(self.views.keys())
            .chain(self.materialized_views.keys())
            .chain(self.indexes.keys())
            .chain(self.sequences.keys())
            .chain(self.constraints.keys())
            .chain(self.triggers.keys())
            .chain(self.functions.keys())
            .chain(self.policies.keys())
            .chain(self.types.keys())
    }

    /// Check catalog invariants: entities stored under their own id, schema
    /// qualifiers and table references resolving inside the catalog, and
    /// dependency endpoints resolving inside the catalog. The differ refuses
    /// to operate on a catalog that fails validation.
    pub fn validate(&self) -> Result<()> {
        let mut problems = Vec::new();

        macro_rules! check_keys {
            ($collection:expr) => {
                for (key, entity) in $collection.iter() {
                    if *key != entity.stable_id() {
                        problems.push(format!(
                            "entity stored under {} but identifies as {}",
                            key,
                            entity.stable_id()
                        ));
                    }
                }
            };
        }
        check_keys!(self.schemas);
        check_keys!(self.tables);
        check_keys!(self.views);
        check_keys!(self.materialized_views);
        check_keys!(self.indexes);
        check_keys!(self.sequences);
        check_keys!(self.constraints);
        check_keys!(self.triggers);
        check_keys!(self.functions);
        check_keys!(self.policies);
        check_keys!(self.types);

        for id in self.all_ids() {
            if !matches!(id, StableId::Schema { .. }) {
                let schema_id = StableId::Schema {
                    name: id.schema().to_string(),
                };
                if !self.schemas.contains_key(&schema_id) {
                    problems.push(format!("{} references missing schema {}", id, schema_id));
                }
            }
            if let Some(table_id) = id.owning_table()
                && !self.tables.contains_key(&table_id)
            {
                problems.push(format!("{} references missing table {}", id, table_id));
            }
        }

        for index in self.indexes.values() {
            let table_id = StableId::Table {
                schema: index.table_schema.clone(),
                name: index.table_name.clone(),
            };
            if !self.tables.contains_key(&table_id) {
                problems.push(format!(
                    "{} references missing table {}",
                    index.stable_id(),
                    table_id
                ));
            }
        }

        for sequence in self.sequences.values() {
            if let Some(owner) = &sequence.owned_by {
                let owner_id = StableId::Column {
                    schema: owner.schema.clone(),
                    table: owner.table.clone(),
                    name: owner.column.clone(),
                };
                if !self.contains_id(&owner_id) {
                    problems.push(format!(
                        "{} is owned by missing column {}",
                        sequence.stable_id(),
                        owner_id
                    ));
                }
            }
        }

        for edge in &self.depends {
            for endpoint in [&edge.dependent, &edge.referenced] {
                if !self.contains_id(endpoint) {
                    problems.push(format!(
                        "dependency edge {} -> {} has endpoint missing from catalog",
                        edge.dependent, edge.referenced
                    ));
                }
            }
        }

        if !problems.is_empty() {
            bail!("catalog invariant violations:\n  {}", problems.join("\n  "));
        }
        Ok(())
    }

    /// Whole-catalog semantic equality: same id sets, and every corresponding
    /// entity pair semantically equal.
    pub fn semantic_eq(&self, other: &Catalog) -> bool {
        self.semantic_diff(other).is_empty()
    }

    /// Human-readable residual between two catalogs: ids missing from `self`,
    /// unexpected in `self`, or present in both but semantically different.
    pub fn semantic_diff(&self, other: &Catalog) -> Vec<String> {
        fn collect<T: SemanticEq>(
            mine: &BTreeMap<StableId, T>,
            theirs: &BTreeMap<StableId, T>,
            out: &mut Vec<String>,
        ) {
            for (id, entity) in mine {
                match theirs.get(id) {
                    None => out.push(format!("unexpected {}", id)),
                    Some(theirs) if !entity.semantic_eq(theirs) => {
                        out.push(format!("differs {}", id))
                    }
                    Some(_) => {}
                }
            }
            for id in theirs.keys() {
                if !mine.contains_key(id) {
                    out.push(format!("missing {}", id));
                }
            }
        }

        let mut out = Vec::new();
        collect(&self.schemas, &other.schemas, &mut out);
        collect(&self.tables, &other.tables, &mut out);
        collect(&self.views, &other.views, &mut out);
        collect(
            &self.materialized_views,
            &other.materialized_views,
            &mut out,
        );
        collect(&self.indexes, &other.indexes, &mut out);
        collect(&self.sequences, &other.sequences, &mut out);
        collect(&self.constraints, &other.constraints, &mut out);
        collect(&self.triggers, &other.triggers, &mut out);
        collect(&self.functions, &other.functions, &mut out);
        collect(&self.policies, &other.policies, &mut out);
        collect(&self.types, &other.types, &mut out);
        out
    }

    /// Canonical line-oriented description of the catalog's identity + data
    /// fields. Two semantically equal catalogs describe identically, so this
    /// feeds the textual residual diff on verification failure.
    pub fn describe(&self) -> String {
        let mut lines = Vec::new();

        for s in self.schemas.values() {
            lines.push(s.stable_id().to_string());
        }
        for t in self.tables.values() {
            let mut columns: Vec<_> = t.columns.iter().collect();
            columns.sort_by(|a, b| a.name.cmp(&b.name));
            lines.push(format!(
                "{}{}",
                t.stable_id(),
                if t.rls_enabled { " [rls]" } else { "" }
            ));
            for c in columns {
                lines.push(format!(
                    "  {} {}{}{}",
                    c.name,
                    c.data_type,
                    if c.not_null { " not null" } else { "" },
                    match &c.default {
                        Some(d) => format!(" default {}", d),
                        None => String::new(),
                    }
                ));
            }
        }
        for v in self.views.values() {
            lines.push(format!("{} AS {}", v.stable_id(), v.definition.trim()));
        }
        for m in self.materialized_views.values() {
            lines.push(format!("{} AS {}", m.stable_id(), m.definition.trim()));
        }
        for i in self.indexes.values() {
            lines.push(format!("{} {}", i.stable_id(), i.definition.trim()));
        }
        for s in self.sequences.values() {
            lines.push(format!(
                "{} {} start {} min {} max {} inc {} cache {}{}{}",
                s.stable_id(),
                s.data_type,
                s.start_value,
                s.min_value,
                s.max_value,
                s.increment,
                s.cache,
                if s.cycle { " cycle" } else { "" },
                match &s.owned_by {
                    Some(o) => format!(" owned by {}.{}.{}", o.schema, o.table, o.column),
                    None => String::new(),
                }
            ));
        }
        for c in self.constraints.values() {
            lines.push(format!("{} {}", c.stable_id(), c.definition.trim()));
        }
        for t in self.triggers.values() {
            lines.push(format!("{} {}", t.stable_id(), t.definition.trim()));
        }
        for f in self.functions.values() {
            lines.push(format!("{}", f.stable_id()));
            for def_line in f.definition.trim().lines() {
                lines.push(format!("  {}", def_line));
            }
        }
        for p in self.policies.values() {
            lines.push(format!(
                "{} {} {}{}{}{}",
                p.stable_id(),
                if p.permissive {
                    "permissive"
                } else {
                    "restrictive"
                },
                p.command.sql_keyword(),
                if p.roles.is_empty() {
                    String::new()
                } else {
                    format!(" to {}", p.roles.join(", "))
                },
                match &p.using_expr {
                    Some(e) => format!(" using ({})", e),
                    None => String::new(),
                },
                match &p.with_check_expr {
                    Some(e) => format!(" with check ({})", e),
                    None => String::new(),
                }
            ));
        }
        for t in self.types.values() {
            match &t.kind {
                custom_type::TypeKind::Enum { labels } => {
                    lines.push(format!("{} enum ({})", t.stable_id(), labels.join(", ")));
                }
                custom_type::TypeKind::Composite { attributes } => {
                    let rendered: Vec<String> = attributes
                        .iter()
                        .map(|a| format!("{} {}", a.name, a.data_type))
                        .collect();
                    lines.push(format!(
                        "{} composite ({})",
                        t.stable_id(),
                        rendered.join(", ")
                    ));
                }
            }
        }

        lines.push(String::new());
        lines.join("\n")
    }
}
