use crate::catalog::materialized_view::MaterializedView;
use crate::catalog::semantic::SemanticEq;
use crate::diff::operations::{Change, MaterializedViewChange};

pub fn diff(old: Option<&MaterializedView>, new: Option<&MaterializedView>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::MaterializedView(MaterializedViewChange::Create {
            schema: n.schema.clone(),
            name: n.name.clone(),
            definition: n.definition.clone(),
        })],
        (Some(o), None) => vec![Change::MaterializedView(MaterializedViewChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) if !o.semantic_eq(n) => {
            vec![Change::MaterializedView(MaterializedViewChange::Replace {
                schema: n.schema.clone(),
                name: n.name.clone(),
                definition: n.definition.clone(),
            })]
        }
        _ => Vec::new(),
    }
}
