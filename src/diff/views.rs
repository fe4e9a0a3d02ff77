use crate::catalog::semantic::SemanticEq;
use crate::catalog::view::View;
use crate::diff::operations::{Change, ViewChange};

pub fn diff(old: Option<&View>, new: Option<&View>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::View(ViewChange::Create {
            schema: n.schema.clone(),
            name: n.name.clone(),
            definition: n.definition.clone(),
        })],
        (Some(o), None) => vec![Change::View(ViewChange::Drop {
            schema: o.schema.clone(),
            name: o.name.clone(),
        })],
        (Some(o), Some(n)) if !o.semantic_eq(n) => vec![Change::View(ViewChange::Replace {
            schema: n.schema.clone(),
            name: n.name.clone(),
            definition: n.definition.clone(),
        })],
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view(definition: &str) -> View {
        View {
            schema: "public".to_string(),
            name: "v".to_string(),
            definition: definition.to_string(),
            oid: 0,
        }
    }

    #[test]
    fn test_changed_definition_is_a_replace() {
        let old = view("SELECT id FROM public.t");
        let new = view("SELECT id, name FROM public.t");

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        assert!(matches!(
            &changes[0],
            Change::View(ViewChange::Replace { definition, .. })
                if definition == "SELECT id, name FROM public.t"
        ));
    }

    #[test]
    fn test_same_definition_is_silent() {
        let v = view("SELECT 1");
        assert!(diff(Some(&v), Some(&v)).is_empty());
    }
}
