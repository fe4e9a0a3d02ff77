use crate::catalog::table::Column;
use crate::diff::operations::TableAction;
use std::collections::{BTreeMap, BTreeSet};

/// Diff the full column lists of a table, keyed by column name.
pub fn diff_all(old: &[Column], new: &[Column]) -> Vec<TableAction> {
    let old_map: BTreeMap<&str, &Column> = old.iter().map(|c| (c.name.as_str(), c)).collect();
    let new_map: BTreeMap<&str, &Column> = new.iter().map(|c| (c.name.as_str(), c)).collect();

    let all_names: BTreeSet<&str> = old_map.keys().chain(new_map.keys()).copied().collect();

    all_names
        .into_iter()
        .flat_map(|name| diff(old_map.get(name).copied(), new_map.get(name).copied()))
        .collect()
}

/// Diff a single column. Within the result, a type change precedes default
/// changes so the default is evaluated against the new type.
pub fn diff(old: Option<&Column>, new: Option<&Column>) -> Vec<TableAction> {
    match (old, new) {
        (None, Some(n)) => {
            vec![TableAction::AddColumn { column: n.clone() }]
        }
        (Some(o), None) => {
            vec![TableAction::DropColumn {
                name: o.name.clone(),
            }]
        }
        (Some(o), Some(n)) => {
            let mut changes = Vec::new();
            if o.data_type != n.data_type {
                changes.push(TableAction::AlterColumnType {
                    name: n.name.clone(),
                    new_type: n.data_type.clone(),
                    using: None,
                });
            }

            match (&o.default, &n.default) {
                (Some(_), None) => {
                    changes.push(TableAction::DropColumnDefault {
                        name: n.name.clone(),
                    });
                }
                (None, Some(d)) => {
                    changes.push(TableAction::SetColumnDefault {
                        name: n.name.clone(),
                        default: d.clone(),
                    });
                }
                (Some(old_default), Some(new_default)) if old_default != new_default => {
                    changes.push(TableAction::SetColumnDefault {
                        name: n.name.clone(),
                        default: new_default.clone(),
                    });
                }
                _ => {}
            }

            match (o.not_null, n.not_null) {
                (false, true) => {
                    changes.push(TableAction::SetColumnNotNull {
                        name: n.name.clone(),
                    });
                }
                (true, false) => {
                    changes.push(TableAction::DropColumnNotNull {
                        name: n.name.clone(),
                    });
                }
                _ => {}
            }

            changes
        }
        // (None, None) impossible
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, data_type: &str) -> Column {
        Column {
            name: name.to_string(),
            data_type: data_type.to_string(),
            default: None,
            not_null: false,
            position: 1,
        }
    }

    #[test]
    fn test_added_column() {
        let n = column("email", "text");
        let actions = diff(None, Some(&n));
        assert_eq!(actions.len(), 1);
        assert!(matches!(&actions[0], TableAction::AddColumn { column } if column.name == "email"));
    }

    #[test]
    fn test_type_change_precedes_default_change() {
        let o = column("n", "integer");
        let mut n = column("n", "bigint");
        n.default = Some("0".to_string());

        let actions = diff(Some(&o), Some(&n));
        assert_eq!(actions.len(), 2);
        assert!(matches!(
            &actions[0],
            TableAction::AlterColumnType { new_type, .. } if new_type == "bigint"
        ));
        assert!(matches!(
            &actions[1],
            TableAction::SetColumnDefault { default, .. } if default == "0"
        ));
    }

    #[test]
    fn test_changed_default_emits_set() {
        let mut o = column("n", "integer");
        o.default = Some("0".to_string());
        let mut n = column("n", "integer");
        n.default = Some("1".to_string());

        let actions = diff(Some(&o), Some(&n));
        assert_eq!(actions.len(), 1);
        assert!(matches!(
            &actions[0],
            TableAction::SetColumnDefault { default, .. } if default == "1"
        ));
    }

    #[test]
    fn test_not_null_transitions() {
        let o = column("n", "integer");
        let mut n = column("n", "integer");
        n.not_null = true;

        let actions = diff(Some(&o), Some(&n));
        assert!(matches!(&actions[0], TableAction::SetColumnNotNull { .. }));

        let actions = diff(Some(&n), Some(&o));
        assert!(matches!(&actions[0], TableAction::DropColumnNotNull { .. }));
    }

    #[test]
    fn test_unchanged_column_is_silent() {
        let c = column("n", "integer");
        assert!(diff(Some(&c), Some(&c)).is_empty());
    }
}
