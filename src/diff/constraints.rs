use crate::catalog::constraint::Constraint;
use crate::catalog::semantic::SemanticEq;
use crate::diff::operations::{Change, ConstraintChange};

pub fn diff(old: Option<&Constraint>, new: Option<&Constraint>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::Constraint(ConstraintChange::Create {
            schema: n.schema.clone(),
            table: n.table.clone(),
            name: n.name.clone(),
            definition: n.definition.clone(),
        })],
        (Some(o), None) => vec![Change::Constraint(ConstraintChange::Drop {
            schema: o.schema.clone(),
            table: o.table.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) if !o.semantic_eq(n) => vec![
            Change::Constraint(ConstraintChange::Drop {
                schema: o.schema.clone(),
                table: o.table.clone(),
                name: o.name.clone(),
            }),
            Change::Constraint(ConstraintChange::Create {
                schema: n.schema.clone(),
                table: n.table.clone(),
                name: n.name.clone(),
                definition: n.definition.clone(),
            }),
        ],
        _ => Vec::new(),
    }
}
