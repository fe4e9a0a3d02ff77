use crate::catalog::index::Index;
use crate::catalog::semantic::SemanticEq;
use crate::diff::operations::{Change, IndexChange};

/// Indexes have no usable ALTER; any definition change is drop + create of
/// the same stable id, which the solver orders drop-first.
pub fn diff(old: Option<&Index>, new: Option<&Index>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::Index(IndexChange::Create {
            schema: n.schema.clone(),
            name: n.name.clone(),
            definition: n.definition.clone(),
        })],
        (Some(o), None) => vec![Change::Index(IndexChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) if !o.semantic_eq(n) => vec![
            Change::Index(IndexChange::Drop {
                schema: o.schema.clone(),
                name: o.name.clone(),
            }),
            Change::Index(IndexChange::Create {
                schema: n.schema.clone(),
                name: n.name.clone(),
                definition: n.definition.clone(),
            }),
        ],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::operations::ChangeKind;

    fn index(definition: &str) -> Index {
        Index {
            schema: "public".to_string(),
            name: "idx_t_id".to_string(),
            table_schema: "public".to_string(),
            table_name: "t".to_string(),
            definition: definition.to_string(),
            oid: 0,
        }
    }

    #[test]
    fn test_changed_index_is_drop_then_create() {
        let old = index("CREATE INDEX idx_t_id ON public.t USING btree (id)");
        let new = index("CREATE UNIQUE INDEX idx_t_id ON public.t USING btree (id)");

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind(), ChangeKind::Drop);
        assert_eq!(changes[1].kind(), ChangeKind::Create);
        assert_eq!(changes[0].stable_id(), changes[1].stable_id());
    }
}
