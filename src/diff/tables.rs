use crate::catalog::semantic::SemanticEq;
use crate::catalog::table::Table;
use crate::diff::columns;
use crate::diff::operations::{Change, TableAction, TableChange};

pub fn diff(old: Option<&Table>, new: Option<&Table>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            let mut changes = vec![Change::Table(TableChange::Create {
                table: Box::new(n.clone()),
            })];

            // Row security is an explicit table-level change, never implied
            // by CREATE TABLE or bundled into policy creation.
            if n.rls_enabled {
                changes.push(Change::Table(TableChange::Alter {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    actions: vec![TableAction::EnableRowSecurity],
                }));
            }

            changes
        }
        (Some(o), None) => {
            vec![Change::Table(TableChange::Drop {
                schema: o.schema.clone(),
                name: o.name.clone(),
            })]
        }
        (Some(o), Some(n)) => {
            if o.semantic_eq(n) {
                return Vec::new();
            }

            let mut actions = columns::diff_all(&o.columns, &n.columns);

            if o.rls_enabled != n.rls_enabled {
                actions.push(if n.rls_enabled {
                    TableAction::EnableRowSecurity
                } else {
                    TableAction::DisableRowSecurity
                });
            }

            if actions.is_empty() {
                Vec::new()
            } else {
                vec![Change::Table(TableChange::Alter {
                    schema: n.schema.clone(),
                    name: n.name.clone(),
                    actions,
                })]
            }
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::table::Column;

    fn users(columns: Vec<Column>) -> Table {
        Table {
            schema: "public".to_string(),
            name: "users".to_string(),
            columns,
            rls_enabled: false,
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

    #[test]
    fn test_added_column_yields_single_alter() {
        let old = users(vec![column("id", "integer", 1)]);
        let new = users(vec![column("id", "integer", 1), column("email", "text", 2)]);

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::Table(TableChange::Alter { actions, .. }) => {
                assert_eq!(actions.len(), 1);
                assert!(matches!(
                    &actions[0],
                    TableAction::AddColumn { column } if column.name == "email"
                ));
            }
            other => panic!("expected TableChange::Alter, got {:?}", other),
        }
    }

    #[test]
    fn test_identical_tables_are_silent() {
        let t = users(vec![column("id", "integer", 1)]);
        assert!(diff(Some(&t), Some(&t)).is_empty());
    }

    #[test]
    fn test_new_rls_table_gets_enable_change() {
        let mut t = users(vec![column("id", "integer", 1)]);
        t.rls_enabled = true;

        let changes = diff(None, Some(&t));
        assert_eq!(changes.len(), 2);
        assert!(matches!(
            &changes[1],
            Change::Table(TableChange::Alter { actions, .. })
                if matches!(actions[0], TableAction::EnableRowSecurity)
        ));
    }

    #[test]
    fn test_rls_toggle_off() {
        let mut old = users(vec![column("id", "integer", 1)]);
        old.rls_enabled = true;
        let new = users(vec![column("id", "integer", 1)]);

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        assert!(matches!(
            &changes[0],
            Change::Table(TableChange::Alter { actions, .. })
                if matches!(actions[0], TableAction::DisableRowSecurity)
        ));
    }
}
