//! Operation semantics: turn dependency edges plus change kinds into
//! ordering constraints between change indices.

pub mod solver;

use crate::depend::{DependencyGraph, Origin};
use crate::diff::operations::{Change, ChangeKind, SequenceChange, TableChange};
use std::collections::BTreeSet;

/// `changes[before]` must be emitted before `changes[after]`. The reason is
/// carried for diagnostics only.
#[derive(Debug, Clone)]
pub struct Constraint {
    pub before: usize,
    pub after: usize,
    pub reason: String,
}

/// Build the BEFORE constraints for a change list.
///
/// For every ordered pair we consult the dependency origin selected by the
/// dependent side's operation: a Drop looks at the source catalog (the edge
/// existed before the drop), everything else at the target catalog (the edge
/// must hold afterwards). Same-object changes are chained by operation
/// priority regardless of edges.
pub fn build_constraints(changes: &[Change], graph: &DependencyGraph) -> Vec<Constraint> {
    let ids: Vec<_> = changes.iter().map(Change::stable_id).collect();
    let kinds: Vec<_> = changes.iter().map(Change::kind).collect();
    let created: BTreeSet<_> = (0..changes.len())
        .filter(|&i| kinds[i] == ChangeKind::Create)
        .map(|i| ids[i].clone())
        .collect();

    let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();
    let mut constraints = Vec::new();
    let mut push = |before: usize, after: usize, reason: String| {
        if before != after && seen.insert((before, after)) {
            constraints.push(Constraint {
                before,
                after,
                reason,
            });
        }
    };

    for dep in 0..changes.len() {
        for refd in 0..changes.len() {
            if dep == refd || ids[dep] == ids[refd] {
                continue;
            }

            let origin = match kinds[dep] {
                ChangeKind::Drop => Origin::Source,
                _ => Origin::Target,
            };
            if !graph.depends_on(origin, &ids[dep], &ids[refd]) {
                continue;
            }

            // A sequence-depends-on-table edge is the OWNED BY artifact:
            // PostgreSQL records it backwards relative to what creation and
            // destruction need, so these pairs get special handling below.
            let ownership_artifact = matches!(changes[dep], Change::Sequence(_))
                && matches!(changes[refd], Change::Table(_));

            match (kinds[dep], kinds[refd]) {
                // Both dropped: the dependent goes first. The ownership
                // artifact is skipped; the table's own edge onto the
                // sequence (via its column default) already orders the pair.
                (ChangeKind::Drop, ChangeKind::Drop) => {
                    if !ownership_artifact {
                        push(
                            dep,
                            refd,
                            format!("{} is dropped before {} it depends on", ids[dep], ids[refd]),
                        )
                    }
                }
                // A dropped dependent puts no requirement on a surviving
                // referenced object.
                (ChangeKind::Drop, _) => {}
                // The referenced side is dropped while the dependent is
                // created or modified: the drop clears the way first.
                (_, ChangeKind::Drop) => push(
                    refd,
                    dep,
                    format!("{} is dropped before {} takes its place", ids[refd], ids[dep]),
                ),
                // Inverted ownership artifact: the sequence must exist
                // before the table (or table alteration) whose column
                // default calls nextval.
                (ChangeKind::Create, ChangeKind::Create | ChangeKind::Alter)
                    if ownership_artifact
                        && matches!(
                            changes[dep],
                            Change::Sequence(SequenceChange::Create { .. })
                        )
                        && matches!(
                            changes[refd],
                            Change::Table(
                                TableChange::Create { .. } | TableChange::Alter { .. }
                            )
                        ) =>
                {
                    push(
                        dep,
                        refd,
                        format!("owned sequence {} precedes table {}", ids[dep], ids[refd]),
                    )
                }
                // Referenced object is created: it must be in place first.
                (_, ChangeKind::Create) => push(
                    refd,
                    dep,
                    format!("{} must exist before {}", ids[refd], ids[dep]),
                ),
                // Referenced object is altered or replaced. When the same
                // object also has a Create in the changeset, the dependency
                // anchors at the Create (handled above); constraining the
                // dependent behind the later Alter as well would cycle with
                // legitimate alter-after-dependent orderings such as
                // sequence ownership.
                (_, _) => {
                    if !created.contains(&ids[refd]) {
                        push(
                            refd,
                            dep,
                            format!("{} must be in its final shape before {}", ids[refd], ids[dep]),
                        )
                    }
                }
            }
        }
    }

    // Same-object priority: Drop < Create < Alter < Replace.
    for a in 0..changes.len() {
        for b in 0..changes.len() {
            if a != b && ids[a] == ids[b] && kinds[a] < kinds[b] {
                push(
                    a,
                    b,
                    format!("{:?} {} precedes {:?} of it", kinds[a], ids[a], kinds[b]),
                );
            }
        }
    }

    constraints
}
