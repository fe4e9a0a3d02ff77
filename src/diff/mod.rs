pub mod columns;
pub mod constraints;
pub mod custom_types;
pub mod functions;
pub mod indexes;
pub mod materialized_views;
pub mod operations;
pub mod policies;
pub mod schemas;
pub mod sequences;
pub mod tables;
pub mod triggers;
pub mod views;

#[cfg(test)]
mod tests;

use crate::catalog::Catalog;
use crate::catalog::id::StableId;
use crate::depend::{DEFAULT_EXPANSION_DEPTH, DependencyGraph};
use crate::order::{build_constraints, solver};
use operations::Change;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

/// Diff two catalogs and return the changes in a valid application order.
///
/// Both catalogs are validated first; the differ refuses to operate on a
/// catalog with dangling references or corrupted identifiers. Fails with a
/// `CycleError` (inside the `anyhow` error) when the constraints admit no
/// valid order.
pub fn diff(source: &Catalog, target: &Catalog) -> anyhow::Result<Vec<Change>> {
    diff_with_depth(source, target, DEFAULT_EXPANSION_DEPTH)
}

/// `diff` with a custom dependency-expansion depth, for schemas with unusually
/// deep type or function chains.
pub fn diff_with_depth(
    source: &Catalog,
    target: &Catalog,
    depth: usize,
) -> anyhow::Result<Vec<Change>> {
    source.validate()?;
    target.validate()?;

    let changes = diff_all(source, target);
    info!("Diff produced {} changes", changes.len());

    let graph = DependencyGraph::build(source, target, &changes, depth);
    let constraints = build_constraints(&changes, &graph);
    for constraint in &constraints {
        debug!(
            "constraint: {} before {} ({})",
            constraint.before, constraint.after, constraint.reason
        );
    }
    let order = solver::solve(&changes, &constraints)?;

    Ok(order.into_iter().map(|i| changes[i].clone()).collect())
}

/// Produce the unordered change stream. Per entity kind, changes come out in
/// stable-id order (the collections are BTreeMaps), which makes the stream
/// reproducible; the solver is free to reorder.
pub fn diff_all(old: &Catalog, new: &Catalog) -> Vec<Change> {
    let mut out = Vec::new();

    out.extend(diff_map(&old.schemas, &new.schemas, schemas::diff));
    out.extend(diff_map(&old.types, &new.types, custom_types::diff));
    out.extend(diff_map(&old.sequences, &new.sequences, sequences::diff));
    out.extend(diff_map(&old.tables, &new.tables, tables::diff));
    out.extend(diff_map(&old.indexes, &new.indexes, indexes::diff));
    out.extend(diff_map(&old.constraints, &new.constraints, constraints::diff));
    out.extend(diff_map(&old.triggers, &new.triggers, triggers::diff));
    out.extend(diff_map(&old.views, &new.views, views::diff));
    out.extend(diff_map(
        &old.materialized_views,
        &new.materialized_views,
        materialized_views::diff,
    ));
    out.extend(diff_map(&old.functions, &new.functions, functions::diff));
    out.extend(diff_map(&old.policies, &new.policies, policies::diff));

    out
}

/// Generic element diff over two stable-id keyed collections.
pub fn diff_map<T, R>(
    old: &BTreeMap<StableId, T>,
    new: &BTreeMap<StableId, T>,
    diff_fn: impl Fn(Option<&T>, Option<&T>) -> Vec<R>,
) -> Vec<R> {
    let all_ids: BTreeSet<&StableId> = old.keys().chain(new.keys()).collect();

    all_ids
        .into_iter()
        .flat_map(|id| diff_fn(old.get(id), new.get(id)))
        .collect()
}
