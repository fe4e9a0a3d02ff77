use crate::catalog::function::Function;
use crate::catalog::semantic::SemanticEq;
use crate::diff::operations::{Change, FunctionChange};

/// Functions are replaced in place except when the result type or the
/// function/procedure kind changes; PostgreSQL rejects CREATE OR REPLACE for
/// those, so the differ falls back to drop + create.
pub fn diff(old: Option<&Function>, new: Option<&Function>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => vec![Change::Function(FunctionChange::Create {
            function: Box::new(n.clone()),
        })],
        (Some(o), None) => vec![Change::Function(drop_of(o))],
        (Some(o), Some(n)) if !o.semantic_eq(n) => {
            if o.return_type != n.return_type || o.kind != n.kind {
                vec![
                    Change::Function(drop_of(o)),
                    Change::Function(FunctionChange::Create {
                        function: Box::new(n.clone()),
                    }),
                ]
            } else {
                vec![Change::Function(FunctionChange::Replace {
                    function: Box::new(n.clone()),
                })]
            }
        }
        _ => Vec::new(),
    }
}

fn drop_of(function: &Function) -> FunctionChange {
    FunctionChange::Drop {
        schema: function.schema.clone(),
        name: function.name.clone(),
        arguments: function.arguments.clone(),
        function_kind: function.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::function::FunctionKind;
    use crate::diff::operations::ChangeKind;

    fn function(return_type: &str, definition: &str) -> Function {
        Function {
            schema: "public".to_string(),
            name: "touch".to_string(),
            arguments: "integer".to_string(),
            kind: FunctionKind::Function,
            return_type: Some(return_type.to_string()),
            definition: definition.to_string(),
            oid: 0,
        }
    }

    #[test]
    fn test_body_change_is_replace() {
        let old = function("trigger", "CREATE OR REPLACE FUNCTION ... v1");
        let new = function("trigger", "CREATE OR REPLACE FUNCTION ... v2");

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].kind(), ChangeKind::Replace);
    }

    #[test]
    fn test_return_type_change_is_drop_create() {
        let old = function("integer", "CREATE OR REPLACE FUNCTION ...");
        let new = function("bigint", "CREATE OR REPLACE FUNCTION ...");

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind(), ChangeKind::Drop);
        assert_eq!(changes[1].kind(), ChangeKind::Create);
        assert_eq!(changes[0].stable_id(), changes[1].stable_id());
    }
}
