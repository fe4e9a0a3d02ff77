//! End-to-end diffing scenarios over synthetic catalogs: the ordered change
//! stream, its emitted SQL, and the ordering invariants.

use crate::catalog::Catalog;
use crate::catalog::dependency::{DepClass, DepEdge};
use crate::catalog::id::StableId;
use crate::catalog::index::Index;
use crate::catalog::schema::Schema;
use crate::catalog::sequence::{Sequence, SequenceOwner};
use crate::catalog::table::{Column, Table};
use crate::catalog::view::View;
use crate::depend::{DEFAULT_EXPANSION_DEPTH, DependencyGraph};
use crate::diff::operations::{Change, ChangeKind};
use crate::order::build_constraints;
use crate::order::solver::CycleError;
use crate::render::emit_all;
use rstest::rstest;
use std::collections::BTreeMap;

fn schema(name: &str) -> Schema {
    Schema {
        name: name.to_string(),
        oid: 0,
    }
}

fn column(name: &str, data_type: &str, position: i32) -> Column {
    Column {
        name: name.to_string(),
        data_type: data_type.to_string(),
        default: None,
        not_null: false,
        position,
    }
}

fn table(schema: &str, name: &str, columns: Vec<Column>) -> Table {
    Table {
        schema: schema.to_string(),
        name: name.to_string(),
        columns,
        rls_enabled: false,
        oid: 0,
    }
}

fn edge(dependent: StableId, referenced: StableId) -> DepEdge {
    DepEdge {
        dependent,
        referenced,
        class: DepClass::Normal,
    }
}

fn schema_id(name: &str) -> StableId {
    StableId::Schema {
        name: name.to_string(),
    }
}

fn table_id(schema: &str, name: &str) -> StableId {
    StableId::Table {
        schema: schema.to_string(),
        name: name.to_string(),
    }
}

/// Position of the first change matching a `describe()` label.
fn position(changes: &[Change], label: &str) -> usize {
    changes
        .iter()
        .position(|c| c.describe() == label)
        .unwrap_or_else(|| {
            panic!(
                "no change labelled {:?} in {:?}",
                label,
                changes.iter().map(Change::describe).collect::<Vec<_>>()
            )
        })
}

#[test]
fn test_scenario_add_column() {
    let mut source = Catalog::empty();
    source.add_schema(schema("public")).unwrap();
    source
        .add_table(table("public", "users", vec![column("id", "integer", 1)]))
        .unwrap();

    let mut target = Catalog::empty();
    target.add_schema(schema("public")).unwrap();
    target
        .add_table(table(
            "public",
            "users",
            vec![column("id", "integer", 1), column("email", "text", 2)],
        ))
        .unwrap();

    let changes = super::diff(&source, &target).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].describe(), "Alter t:public.users");

    let sql = emit_all(&changes);
    assert_eq!(sql.len(), 1);
    assert_eq!(
        sql[0].sql,
        "ALTER TABLE \"public\".\"users\" ADD COLUMN \"email\" text;"
    );
}

#[test]
fn test_scenario_schema_table_index_creation_order() {
    let source = Catalog::empty();

    let mut target = Catalog::empty();
    target.add_schema(schema("public")).unwrap();
    target.add_schema(schema("app")).unwrap();
    target
        .add_table(table("app", "users", vec![column("id", "bigint", 1)]))
        .unwrap();
    target
        .add_index(Index {
            schema: "app".to_string(),
            name: "idx_users_id".to_string(),
            table_schema: "app".to_string(),
            table_name: "users".to_string(),
            definition: "CREATE INDEX idx_users_id ON app.users USING btree (id)".to_string(),
            oid: 0,
        })
        .unwrap();
    target.depends.push(edge(table_id("app", "users"), schema_id("app")));
    target.depends.push(edge(
        StableId::Index {
            schema: "app".to_string(),
            name: "idx_users_id".to_string(),
        },
        table_id("app", "users"),
    ));
    target.depends.push(edge(
        StableId::Index {
            schema: "app".to_string(),
            name: "idx_users_id".to_string(),
        },
        schema_id("app"),
    ));

    let changes = super::diff(&source, &target).unwrap();

    let schema_pos = position(&changes, "Create s:app");
    let table_pos = position(&changes, "Create t:app.users");
    let index_pos = position(&changes, "Create i:app.idx_users_id");
    assert!(schema_pos < table_pos);
    assert!(table_pos < index_pos);
}

#[test]
fn test_scenario_sequence_before_table_inversion() {
    let source = Catalog::empty();

    let mut target = Catalog::empty();
    target.add_schema(schema("public")).unwrap();
    target.add_schema(schema("app")).unwrap();
    let mut id_column = column("id", "bigint", 1);
    id_column.default = Some("nextval('app.users_id_seq'::regclass)".to_string());
    target
        .add_table(table("app", "users", vec![id_column]))
        .unwrap();
    target
        .add_sequence(Sequence {
            schema: "app".to_string(),
            name: "users_id_seq".to_string(),
            data_type: "bigint".to_string(),
            start_value: 1,
            min_value: 1,
            max_value: i64::MAX,
            increment: 1,
            cache: 1,
            cycle: false,
            owned_by: Some(SequenceOwner {
                schema: "app".to_string(),
                table: "users".to_string(),
                column: "id".to_string(),
            }),
            oid: 0,
        })
        .unwrap();

    let sequence_id = StableId::Sequence {
        schema: "app".to_string(),
        name: "users_id_seq".to_string(),
    };
    target.depends.push(edge(table_id("app", "users"), schema_id("app")));
    target.depends.push(edge(sequence_id.clone(), schema_id("app")));
    // As pg_depend reports OWNED BY: the sequence depends on the table …
    target.depends.push(DepEdge {
        dependent: sequence_id.clone(),
        referenced: table_id("app", "users"),
        class: DepClass::Auto,
    });
    // … while the column default makes the table depend on the sequence.
    target
        .depends
        .push(edge(table_id("app", "users"), sequence_id));

    let changes = super::diff(&source, &target).unwrap();

    let schema_pos = position(&changes, "Create s:app");
    let sequence_pos = position(&changes, "Create S:app.users_id_seq");
    let table_pos = position(&changes, "Create t:app.users");
    let ownership_pos = position(&changes, "Alter S:app.users_id_seq");

    assert!(schema_pos < sequence_pos);
    assert!(sequence_pos < table_pos);
    assert!(table_pos < ownership_pos);

    let sql = emit_all(&changes);
    assert!(sql[ownership_pos].sql.contains("OWNED BY"));
}

#[test]
fn test_scenario_view_replacement() {
    let mut source = Catalog::empty();
    source.add_schema(schema("public")).unwrap();
    source
        .add_table(table(
            "public",
            "t",
            vec![column("id", "integer", 1), column("name", "text", 2)],
        ))
        .unwrap();
    source
        .add_view(View {
            schema: "public".to_string(),
            name: "v".to_string(),
            definition: "SELECT id FROM public.t".to_string(),
            oid: 0,
        })
        .unwrap();

    let mut target = source.clone();
    target
        .views
        .get_mut(&StableId::View {
            schema: "public".to_string(),
            name: "v".to_string(),
        })
        .unwrap()
        .definition = "SELECT id, name FROM public.t".to_string();

    let changes = super::diff(&source, &target).unwrap();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].describe(), "Replace v:public.v");

    let sql = emit_all(&changes);
    assert!(
        sql[0]
            .sql
            .starts_with("CREATE OR REPLACE VIEW \"public\".\"v\" AS")
    );
}

#[test]
fn test_scenario_drop_table_with_dependent_index() {
    let mut source = Catalog::empty();
    source.add_schema(schema("public")).unwrap();
    source
        .add_table(table("public", "t", vec![column("id", "integer", 1)]))
        .unwrap();
    source
        .add_index(Index {
            schema: "public".to_string(),
            name: "idx_t_id".to_string(),
            table_schema: "public".to_string(),
            table_name: "t".to_string(),
            definition: "CREATE INDEX idx_t_id ON public.t USING btree (id)".to_string(),
            oid: 0,
        })
        .unwrap();
    let index_id = StableId::Index {
        schema: "public".to_string(),
        name: "idx_t_id".to_string(),
    };
    source.depends.push(DepEdge {
        dependent: index_id,
        referenced: table_id("public", "t"),
        class: DepClass::Auto,
    });

    let mut target = Catalog::empty();
    target.add_schema(schema("public")).unwrap();

    let changes = super::diff(&source, &target).unwrap();
    let index_pos = position(&changes, "Drop i:public.idx_t_id");
    let table_pos = position(&changes, "Drop t:public.t");
    assert!(index_pos < table_pos);
}

#[test]
fn test_scenario_mutually_recursive_view_replacement_cycle() {
    let mut source = Catalog::empty();
    source.add_schema(schema("public")).unwrap();
    for (name, definition) in [("a", "SELECT 1"), ("b", "SELECT 2")] {
        source
            .add_view(View {
                schema: "public".to_string(),
                name: name.to_string(),
                definition: definition.to_string(),
                oid: 0,
            })
            .unwrap();
    }

    let mut target = source.clone();
    for view in target.views.values_mut() {
        view.definition = format!("{} -- changed", view.definition);
    }
    let a = StableId::View {
        schema: "public".to_string(),
        name: "a".to_string(),
    };
    let b = StableId::View {
        schema: "public".to_string(),
        name: "b".to_string(),
    };
    target.depends.push(edge(a.clone(), b.clone()));
    target.depends.push(edge(b, a));

    let err = super::diff(&source, &target).unwrap_err();
    let cycle_error = err
        .downcast_ref::<CycleError>()
        .expect("error should carry a CycleError");
    assert!(!cycle_error.cycles.is_empty());
    let rendered = cycle_error.to_string();
    assert!(rendered.contains("v:public.a"));
    assert!(rendered.contains("v:public.b"));
}

#[test]
fn test_custom_expansion_depth_orders_deep_view_chains() {
    // a depends on b depends on c; with a deeper expansion the whole chain
    // still orders leaves-first.
    let source = Catalog::empty();
    let mut target = Catalog::empty();
    target.add_schema(schema("public")).unwrap();
    for name in ["a", "b", "c"] {
        target
            .add_view(View {
                schema: "public".to_string(),
                name: name.to_string(),
                definition: format!("SELECT '{}'", name),
                oid: 0,
            })
            .unwrap();
    }
    for (dependent, referenced) in [("a", "b"), ("b", "c")] {
        target.depends.push(edge(
            StableId::View {
                schema: "public".to_string(),
                name: dependent.to_string(),
            },
            StableId::View {
                schema: "public".to_string(),
                name: referenced.to_string(),
            },
        ));
    }

    let changes = super::diff_with_depth(&source, &target, 4).unwrap();
    let a = position(&changes, "Create v:public.a");
    let b = position(&changes, "Create v:public.b");
    let c = position(&changes, "Create v:public.c");
    assert!(c < b);
    assert!(b < a);
}

#[test]
fn test_diff_of_identical_catalogs_is_empty() {
    let mut catalog = Catalog::empty();
    catalog.add_schema(schema("public")).unwrap();
    catalog
        .add_table(table("public", "users", vec![column("id", "integer", 1)]))
        .unwrap();

    let changes = super::diff(&catalog, &catalog.clone()).unwrap();
    assert!(changes.is_empty());
}

#[test]
fn test_diff_refuses_invalid_catalog() {
    let mut source = Catalog::empty();
    source.add_table(table("app", "users", vec![])).unwrap(); // schema missing

    let err = super::diff(&source, &Catalog::empty()).unwrap_err();
    assert!(err.to_string().contains("catalog invariant violations"));
}

// --- randomized invariant checks ------------------------------------------

/// Deterministic xorshift; the property cases must reproduce exactly.
struct Rng(u64);

impl Rng {
    fn next(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

const TYPES: &[&str] = &["integer", "bigint", "text", "boolean", "date"];

fn random_catalog(rng: &mut Rng) -> Catalog {
    let mut catalog = Catalog::empty();
    catalog.add_schema(schema("public")).unwrap();

    let table_count = 3 + rng.below(4);
    for t in 0..table_count {
        let name = format!("t{}", t);
        let column_count = 1 + rng.below(4);
        let columns = (0..column_count)
            .map(|c| {
                let mut col = column(&format!("c{}", c), TYPES[rng.below(TYPES.len())], c as i32 + 1);
                col.not_null = rng.below(3) == 0;
                col
            })
            .collect();
        catalog
            .add_table(table("public", &name, columns))
            .unwrap();
        catalog
            .depends
            .push(edge(table_id("public", &name), schema_id("public")));

        if rng.below(2) == 0 {
            let index_name = format!("idx_{}", name);
            catalog
                .add_index(Index {
                    schema: "public".to_string(),
                    name: index_name.clone(),
                    table_schema: "public".to_string(),
                    table_name: name.clone(),
                    definition: format!(
                        "CREATE INDEX {} ON public.{} USING btree (c0)",
                        index_name, name
                    ),
                    oid: 0,
                })
                .unwrap();
            catalog.depends.push(DepEdge {
                dependent: StableId::Index {
                    schema: "public".to_string(),
                    name: index_name,
                },
                referenced: table_id("public", &name),
                class: DepClass::Auto,
            });
        }

        if rng.below(3) == 0 {
            let view_name = format!("v_{}", name);
            catalog
                .add_view(View {
                    schema: "public".to_string(),
                    name: view_name.clone(),
                    definition: format!("SELECT * FROM public.{}", name),
                    oid: 0,
                })
                .unwrap();
            catalog.depends.push(edge(
                StableId::View {
                    schema: "public".to_string(),
                    name: view_name,
                },
                table_id("public", &name),
            ));
        }
    }

    catalog
}

/// Apply a random legal edit, keeping dependency edges consistent.
fn random_edit(rng: &mut Rng, source: &Catalog) -> Catalog {
    let mut target = source.clone();
    for _ in 0..(1 + rng.below(3)) {
        match rng.below(5) {
            // add a column to a random table
            0 => {
                let keys: Vec<_> = target.tables.keys().cloned().collect();
                let key = keys[rng.below(keys.len())].clone();
                let table = target.tables.get_mut(&key).unwrap();
                let position = table.columns.len() as i32 + 1;
                table
                    .columns
                    .push(column(&format!("c{}", position + 17), "text", position));
            }
            // change a column type
            1 => {
                let keys: Vec<_> = target.tables.keys().cloned().collect();
                let key = keys[rng.below(keys.len())].clone();
                let table = target.tables.get_mut(&key).unwrap();
                let index = rng.below(table.columns.len());
                table.columns[index].data_type = "numeric(10,2)".to_string();
            }
            // add a fresh table
            2 => {
                let name = format!("t_new_{}", rng.below(1000));
                if !target.tables.contains_key(&table_id("public", &name)) {
                    target
                        .add_table(table("public", &name, vec![column("c0", "integer", 1)]))
                        .unwrap();
                    target
                        .depends
                        .push(edge(table_id("public", &name), schema_id("public")));
                }
            }
            // drop an index
            3 => {
                if let Some(key) = target.indexes.keys().next().cloned() {
                    target.indexes.remove(&key);
                    target
                        .depends
                        .retain(|e| e.dependent != key && e.referenced != key);
                }
            }
            // replace a view definition
            _ => {
                if let Some(view) = target.views.values_mut().next() {
                    view.definition = format!("{} WHERE true", view.definition);
                }
            }
        }
    }
    target
}

#[rstest]
#[case(0x5eed_0001)]
#[case(0x5eed_0002)]
#[case(0x5eed_0003)]
#[case(0x5eed_0004)]
#[case(0x5eed_0005)]
#[case(0x5eed_0006)]
fn test_randomized_catalog_invariants(#[case] seed: u64) {
    let mut rng = Rng(seed);
    let source = random_catalog(&mut rng);
    let target = random_edit(&mut rng, &source);
    source.validate().unwrap();
    target.validate().unwrap();

    let ordered = super::diff(&source, &target).unwrap();

    // Determinism: same inputs, byte-identical SQL.
    let again = super::diff(&source, &target).unwrap();
    let sql: Vec<String> = emit_all(&ordered).into_iter().map(|r| r.sql).collect();
    let sql_again: Vec<String> = emit_all(&again).into_iter().map(|r| r.sql).collect();
    assert_eq!(sql, sql_again);

    // Ordering validity: every constraint recomputed over the ordered list
    // points forward.
    let graph = DependencyGraph::build(&source, &target, &ordered, DEFAULT_EXPANSION_DEPTH);
    for constraint in build_constraints(&ordered, &graph) {
        assert!(
            constraint.before < constraint.after,
            "violated: {}",
            constraint.reason
        );
    }

    // Same-object drops precede creates.
    let mut first_create: BTreeMap<StableId, usize> = BTreeMap::new();
    for (i, change) in ordered.iter().enumerate() {
        if change.kind() == ChangeKind::Create {
            first_create.entry(change.stable_id()).or_insert(i);
        }
    }
    for (i, change) in ordered.iter().enumerate() {
        if change.kind() == ChangeKind::Drop
            && let Some(&create_pos) = first_create.get(&change.stable_id())
        {
            assert!(i < create_pos, "drop after create for {}", change.stable_id());
        }
    }

    // Dependency respect for creations (target edges) and drops (source
    // edges) among changed objects.
    let positions: BTreeMap<(StableId, ChangeKind), usize> = ordered
        .iter()
        .enumerate()
        .map(|(i, c)| ((c.stable_id(), c.kind()), i))
        .collect();
    for edge in &target.depends {
        if let (Some(&dependent), Some(&referenced)) = (
            positions.get(&(edge.dependent.clone(), ChangeKind::Create)),
            positions.get(&(edge.referenced.clone(), ChangeKind::Create)),
        ) {
            assert!(
                referenced < dependent,
                "created {} should precede its dependent {}",
                edge.referenced,
                edge.dependent
            );
        }
    }
    for edge in &source.depends {
        if let (Some(&dependent), Some(&referenced)) = (
            positions.get(&(edge.dependent.clone(), ChangeKind::Drop)),
            positions.get(&(edge.referenced.clone(), ChangeKind::Drop)),
        ) {
            assert!(
                dependent < referenced,
                "dropped dependent {} should precede {}",
                edge.dependent,
                edge.referenced
            );
        }
    }
}
