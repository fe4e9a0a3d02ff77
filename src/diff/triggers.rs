use crate::catalog::semantic::SemanticEq;
use crate::catalog::trigger::Trigger;
use crate::diff::operations::{Change, TriggerChange};

pub fn diff(old: Option<&Trigger>, new: Option<&Trigger>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::Trigger(TriggerChange::Create {
            schema: n.schema.clone(),
            table: n.table.clone(),
            name: n.name.clone(),
            definition: n.definition.clone(),
        })],
        (Some(o), None) => vec![Change::Trigger(TriggerChange::Drop {
            schema: o.schema.clone(),
            table: o.table.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) if !o.semantic_eq(n) => vec![
            Change::Trigger(TriggerChange::Drop {
                schema: o.schema.clone(),
                table: o.table.clone(),
                name: o.name.clone(),
            }),
            Change::Trigger(TriggerChange::Create {
                schema: n.schema.clone(),
                table: n.table.clone(),
                name: n.name.clone(),
                definition: n.definition.clone(),
            }),
        ],
        _ => Vec::new(),
    }
}
