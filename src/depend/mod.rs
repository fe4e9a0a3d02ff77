//! Changeset-relevant dependency subgraph.
//!
//! Drops are ordered against the world as it *was* (the source catalog),
//! creates and alters against the world as it *will be* (the target catalog),
//! so edges keep the catalog they came from. Collapsing the two origins into
//! one graph would lose that temporal asymmetry.

use crate::catalog::Catalog;
use crate::catalog::id::StableId;
use crate::diff::operations::Change;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Which catalog contributed an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Origin {
    Source,
    Target,
}

/// How many hops around the changeset to expand. Two hops reach every edge
/// that can constrain the ordering of currently supported entity kinds; the
/// depth stays tunable for deeper type/function chains.
pub const DEFAULT_EXPANSION_DEPTH: usize = 2;

#[derive(Debug, Default)]
struct EdgeIndex {
    forward: BTreeMap<StableId, BTreeSet<StableId>>,
    reverse: BTreeMap<StableId, BTreeSet<StableId>>,
}

impl EdgeIndex {
    fn insert(&mut self, dependent: &StableId, referenced: &StableId) {
        self.forward
            .entry(dependent.clone())
            .or_default()
            .insert(referenced.clone());
        self.reverse
            .entry(referenced.clone())
            .or_default()
            .insert(dependent.clone());
    }
}

#[derive(Debug, Default)]
pub struct DependencyGraph {
    source: EdgeIndex,
    target: EdgeIndex,
}

impl DependencyGraph {
    /// Build the subgraph relevant to `changes`: seed with the change ids,
    /// expand `depth` hops through both catalogs' edge lists (stopping early
    /// at a fixed point), then keep the edges with both endpoints relevant.
    pub fn build(source: &Catalog, target: &Catalog, changes: &[Change], depth: usize) -> Self {
        let mut relevant: BTreeSet<StableId> = changes.iter().map(|c| c.stable_id()).collect();

        let mut adjacency: BTreeMap<&StableId, Vec<&StableId>> = BTreeMap::new();
        for edge in source.depends.iter().chain(target.depends.iter()) {
            adjacency
                .entry(&edge.dependent)
                .or_default()
                .push(&edge.referenced);
            adjacency
                .entry(&edge.referenced)
                .or_default()
                .push(&edge.dependent);
        }

        for _ in 0..depth {
            let mut next = relevant.clone();
            for id in &relevant {
                if let Some(neighbors) = adjacency.get(id) {
                    for neighbor in neighbors {
                        next.insert((*neighbor).clone());
                    }
                }
            }
            if next.len() == relevant.len() {
                break;
            }
            relevant = next;
        }

        let mut graph = DependencyGraph::default();
        for edge in &source.depends {
            if relevant.contains(&edge.dependent) && relevant.contains(&edge.referenced) {
                graph.source.insert(&edge.dependent, &edge.referenced);
            }
        }
        for edge in &target.depends {
            if relevant.contains(&edge.dependent) && relevant.contains(&edge.referenced) {
                graph.target.insert(&edge.dependent, &edge.referenced);
            }
        }

        debug!(
            "Dependency subgraph: {} relevant ids, {} source edges, {} target edges",
            relevant.len(),
            graph.source.forward.values().map(BTreeSet::len).sum::<usize>(),
            graph.target.forward.values().map(BTreeSet::len).sum::<usize>(),
        );
        graph
    }

    /// Insert an edge directly; used to assemble synthetic graphs in tests.
    pub fn add_edge(&mut self, origin: Origin, dependent: StableId, referenced: StableId) {
        self.index_mut(origin).insert(&dependent, &referenced);
    }

    /// Is there an edge `dependent -> referenced` in the given origin?
    pub fn depends_on(&self, origin: Origin, dependent: &StableId, referenced: &StableId) -> bool {
        self.index(origin)
            .forward
            .get(dependent)
            .is_some_and(|refs| refs.contains(referenced))
    }

    pub fn dependencies_of(&self, origin: Origin, id: &StableId) -> Option<&BTreeSet<StableId>> {
        self.index(origin).forward.get(id)
    }

    pub fn dependents_of(&self, origin: Origin, id: &StableId) -> Option<&BTreeSet<StableId>> {
        self.index(origin).reverse.get(id)
    }

    fn index(&self, origin: Origin) -> &EdgeIndex {
        match origin {
            Origin::Source => &self.source,
            Origin::Target => &self.target,
        }
    }

    fn index_mut(&mut self, origin: Origin) -> &mut EdgeIndex {
        match origin {
            Origin::Source => &mut self.source,
            Origin::Target => &mut self.target,
        }
    }
}
