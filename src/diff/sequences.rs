use crate::catalog::sequence::Sequence;
use crate::diff::operations::{Change, SequenceAction, SequenceChange};

/// Generate changes for sequence differences. Creation is split in two: the
/// CREATE SEQUENCE itself and a separate ownership Alter, so that the solver
/// can place the sequence before the owning table and the OWNED BY after it.
pub fn diff(old: Option<&Sequence>, new: Option<&Sequence>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Sequence(SequenceChange::Create {
                sequence: Box::new(n.clone()),
            })];

            if let Some(owner) = &n.owned_by {
                changes.push(Change::Sequence(SequenceChange::Alter {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    actions: vec![SequenceAction::SetOwnedBy(owner.clone())],
                }));
            }

            changes
        }

        (Some(o), None) => {
            vec![Change::Sequence(SequenceChange::Drop {
                schema: o.schema.clone(),
                name: o.name.clone(),
            })]
        }

        (Some(o), Some(n)) => {
            let mut actions = Vec::new();

            if o.data_type != n.data_type {
                actions.push(SequenceAction::SetDataType(n.data_type.clone()));
            }
            if o.increment != n.increment {
                actions.push(SequenceAction::SetIncrement(n.increment));
            }
            if o.min_value != n.min_value {
                actions.push(SequenceAction::SetMinValue(n.min_value));
            }
            if o.max_value != n.max_value {
                actions.push(SequenceAction::SetMaxValue(n.max_value));
            }
            if o.start_value != n.start_value {
                actions.push(SequenceAction::SetStart(n.start_value));
            }
            if o.cache != n.cache {
                actions.push(SequenceAction::SetCache(n.cache));
            }
            if o.cycle != n.cycle {
                actions.push(SequenceAction::SetCycle(n.cycle));
            }
            if o.owned_by != n.owned_by {
                actions.push(match &n.owned_by {
                    Some(owner) => SequenceAction::SetOwnedBy(owner.clone()),
                    None => SequenceAction::DropOwnedBy,
                });
            }

            if actions.is_empty() {
                Vec::new()
            } else {
                vec![Change::Sequence(SequenceChange::Alter {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    actions,
                })]
            }
        }

        (None, None) => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::sequence::SequenceOwner;

    fn sequence(owned: bool) -> Sequence {
        Sequence {
            schema: "app".to_string(),
            name: "users_id_seq".to_string(),
            data_type: "bigint".to_string(),
            start_value: 1,
            min_value: 1,
            max_value: i64::MAX,
            increment: 1,
            cache: 1,
            cycle: false,
            owned_by: owned.then(|| SequenceOwner {
                schema: "app".to_string(),
                table: "users".to_string(),
                column: "id".to_string(),
            }),
            oid: 0,
        }
    }

    #[test]
    fn test_owned_sequence_creates_with_separate_ownership_alter() {
        let changes = diff(None, Some(&sequence(true)));
        assert_eq!(changes.len(), 2);
        assert!(matches!(
            &changes[0],
            Change::Sequence(SequenceChange::Create { .. })
        ));
        assert!(matches!(
            &changes[1],
            Change::Sequence(SequenceChange::Alter { actions, .. })
                if matches!(actions[0], SequenceAction::SetOwnedBy(_))
        ));
    }

    #[test]
    fn test_unowned_sequence_creates_alone() {
        let changes = diff(None, Some(&sequence(false)));
        assert_eq!(changes.len(), 1);
    }

    #[test]
    fn test_parameter_changes_become_alter_actions() {
        let old = sequence(false);
        let mut new = sequence(false);
        new.increment = 10;
        new.cycle = true;

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::Sequence(SequenceChange::Alter { actions, .. }) => {
                assert_eq!(actions.len(), 2);
                assert!(matches!(actions[0], SequenceAction::SetIncrement(10)));
                assert!(matches!(actions[1], SequenceAction::SetCycle(true)));
            }
            other => panic!("expected SequenceChange::Alter, got {:?}", other),
        }
    }
}
