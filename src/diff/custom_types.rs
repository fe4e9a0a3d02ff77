use crate::catalog::custom_type::{CustomType, TypeKind};
use crate::catalog::semantic::SemanticEq;
use crate::diff::operations::{Change, TypeAction, TypeChange};
use std::collections::BTreeMap;

/// Diff a single custom type.
///
/// Enums can only grow in place: when the old label list is a strict prefix
/// of the new one, each appended label becomes ADD VALUE. Composite types can
/// add, drop and retype attributes in place. Every other shape change is
/// drop + create.
pub fn diff(old: Option<&CustomType>, new: Option<&CustomType>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::Type(TypeChange::Create {
            custom_type: Box::new(n.clone()),
        })],
        (Some(o), None) => vec![Change::Type(TypeChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) if !o.semantic_eq(n) => {
            let actions = alter_actions(&o.kind, &n.kind);
            match actions {
                Some(actions) if !actions.is_empty() => {
                    vec![Change::Type(TypeChange::Alter {
                        schema: n.schema.clone(),
                        name: n.name.clone(),
                        actions,
                    })]
                }
                _ => vec![
                    Change::Type(TypeChange::Drop {
                        schema: o.schema.clone(),
                        name: o.name.clone(),
                    }),
                    Change::Type(TypeChange::Create {
                        custom_type: Box::new(n.clone()),
                    }),
                ],
            }
        }
        _ => Vec::new(),
    }
}

fn alter_actions(old: &TypeKind, new: &TypeKind) -> Option<Vec<TypeAction>> {
    match (old, new) {
        (TypeKind::Enum { labels: old_labels }, TypeKind::Enum { labels: new_labels }) => {
            if new_labels.len() > old_labels.len()
                && new_labels[..old_labels.len()] == old_labels[..]
            {
                Some(
                    new_labels[old_labels.len()..]
                        .iter()
                        .map(|label| TypeAction::AddEnumValue {
                            value: label.clone(),
                        })
                        .collect(),
                )
            } else {
                // Removed or reordered labels cannot be expressed as ALTER.
                None
            }
        }
        (
            TypeKind::Composite {
                attributes: old_attrs,
            },
            TypeKind::Composite {
                attributes: new_attrs,
            },
        ) => {
            let old_map: BTreeMap<&str, &str> = old_attrs
                .iter()
                .map(|a| (a.name.as_str(), a.data_type.as_str()))
                .collect();
            let new_map: BTreeMap<&str, &str> = new_attrs
                .iter()
                .map(|a| (a.name.as_str(), a.data_type.as_str()))
                .collect();

            let mut actions = Vec::new();
            for (name, data_type) in &old_map {
                match new_map.get(name) {
                    None => actions.push(TypeAction::DropAttribute {
                        name: name.to_string(),
                    }),
                    Some(new_type) if new_type != data_type => {
                        actions.push(TypeAction::AlterAttributeType {
                            name: name.to_string(),
                            data_type: new_type.to_string(),
                        })
                    }
                    Some(_) => {}
                }
            }
            for (name, data_type) in &new_map {
                if !old_map.contains_key(name) {
                    actions.push(TypeAction::AddAttribute {
                        name: name.to_string(),
                        data_type: data_type.to_string(),
                    });
                }
            }
            // Same attribute set but different declaration order: the record
            // layout changed, which only drop + create expresses.
            Some(actions)
        }
        // Enum became composite or vice versa.
        _ => None,
    }
}
