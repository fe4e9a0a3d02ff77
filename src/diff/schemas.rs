use crate::catalog::schema::Schema;
use crate::diff::operations::{Change, SchemaChange};

pub fn diff(old: Option<&Schema>, new: Option<&Schema>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::Schema(SchemaChange::Create {
            name: n.name.clone(),
        })],
        (Some(o), None) => vec![Change::Schema(SchemaChange::Drop {
            name: o.name.clone(),
        })],
        // A schema's only identity is its name, so both-present means equal.
        _ => Vec::new(),
    }
}
