//! Deterministic topological sort of changes under BEFORE constraints, with
//! simple-cycle enumeration on failure.

use super::Constraint;
use crate::diff::operations::Change;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};
use std::fmt;

/// Cap on reported cycles; a handful is enough to debug a schema.
const MAX_REPORTED_CYCLES: usize = 20;

/// The constraint graph contains at least one cycle. Each cycle lists its
/// member changes (operation + stable id) in dependency order.
#[derive(Debug)]
pub struct CycleError {
    pub cycles: Vec<Vec<String>>,
}

impl fmt::Display for CycleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "dependency cycle detected among changes; cannot produce a valid statement order"
        )?;
        for (i, cycle) in self.cycles.iter().enumerate() {
            let mut path = cycle.clone();
            if let Some(first) = cycle.first() {
                path.push(first.clone());
            }
            writeln!(f, "  cycle {}: {}", i + 1, path.join(" -> "))?;
        }
        Ok(())
    }
}

impl std::error::Error for CycleError {}

/// Order change indices so that every constraint's `before` lands ahead of
/// its `after`. Ties are broken by original emission order, making the output
/// deterministic. Returns all simple cycles on failure.
pub fn solve(changes: &[Change], constraints: &[Constraint]) -> Result<Vec<usize>, CycleError> {
    let n = changes.len();

    let mut graph: DiGraph<usize, ()> = DiGraph::with_capacity(n, constraints.len());
    let nodes: Vec<NodeIndex> = (0..n).map(|i| graph.add_node(i)).collect();

    let mut edges: BTreeSet<(usize, usize)> = BTreeSet::new();
    for constraint in constraints {
        if constraint.before != constraint.after
            && edges.insert((constraint.before, constraint.after))
        {
            graph.add_edge(nodes[constraint.before], nodes[constraint.after], ());
        }
    }

    // Kahn's algorithm with a min-heap of original indices.
    let mut indegree = vec![0usize; n];
    for &(_, after) in &edges {
        indegree[after] += 1;
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| indegree[i] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(n);
    while let Some(Reverse(i)) = ready.pop() {
        order.push(i);
        for neighbor in graph.neighbors(nodes[i]) {
            let j = graph[neighbor];
            indegree[j] -= 1;
            if indegree[j] == 0 {
                ready.push(Reverse(j));
            }
        }
    }

    if order.len() == n {
        return Ok(order);
    }

    Err(CycleError {
        cycles: enumerate_cycles(changes, &graph),
    })
}

/// Enumerate simple cycles: Tarjan SCCs first, then a DFS inside each
/// non-trivial component. Duplicate rotations are avoided by only starting a
/// cycle from its smallest member.
fn enumerate_cycles(changes: &[Change], graph: &DiGraph<usize, ()>) -> Vec<Vec<String>> {
    let mut cycles = Vec::new();

    for component in tarjan_scc(graph) {
        if component.len() < 2 {
            continue;
        }
        let members: BTreeSet<usize> = component.iter().map(|&node| graph[node]).collect();
        let node_of: std::collections::BTreeMap<usize, NodeIndex> =
            component.iter().map(|&node| (graph[node], node)).collect();

        for &start in &members {
            if cycles.len() >= MAX_REPORTED_CYCLES {
                return cycles;
            }
            dfs_cycles(
                graph, changes, &members, &node_of, start, start,
                &mut vec![start],
                &mut BTreeSet::from([start]),
                &mut cycles,
            );
        }
    }

    cycles
}

#[allow(clippy::too_many_arguments)]
fn dfs_cycles(
    graph: &DiGraph<usize, ()>,
    changes: &[Change],
    members: &BTreeSet<usize>,
    node_of: &std::collections::BTreeMap<usize, NodeIndex>,
    start: usize,
    current: usize,
    path: &mut Vec<usize>,
    visited: &mut BTreeSet<usize>,
    cycles: &mut Vec<Vec<String>>,
) {
    if cycles.len() >= MAX_REPORTED_CYCLES {
        return;
    }
    for neighbor in graph.neighbors(node_of[&current]) {
        let next = graph[neighbor];
        if next == start && path.len() > 1 {
            cycles.push(path.iter().map(|&i| changes[i].describe()).collect());
            continue;
        }
        // `next > start` keeps each cycle anchored at its smallest member,
        // so rotations are not reported twice.
        if next > start && members.contains(&next) && !visited.contains(&next) {
            path.push(next);
            visited.insert(next);
            dfs_cycles(
                graph, changes, members, node_of, start, next, path, visited, cycles,
            );
            path.pop();
            visited.remove(&next);
        }
    }
}
