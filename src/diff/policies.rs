use crate::catalog::policy::Policy;
use crate::catalog::semantic::SemanticEq;
use crate::diff::operations::{Change, PolicyChange};

/// Diff a single RLS policy.
///
/// ALTER POLICY covers roles, USING and WITH CHECK, but it can neither change
/// the command or permissive flag nor remove an expression entirely; those
/// transitions are drop + create.
pub fn diff(old: Option<&Policy>, new: Option<&Policy>) -> Vec<Change> {
    match (old, new) {
        (None, Some(n)) => {
            vec![Change::Policy(PolicyChange::Create {
                policy: Box::new(n.clone()),
            })]
        }

        (Some(o), None) => {
            vec![Change::Policy(drop_of(o))]
        }

        (Some(o), Some(n)) if !o.semantic_eq(n) => {
            if !alterable(o, n) {
                return vec![
                    Change::Policy(drop_of(o)),
                    Change::Policy(PolicyChange::Create {
                        policy: Box::new(n.clone()),
                    }),
                ];
            }

            let roles = (o.roles != n.roles).then(|| n.roles.clone());
            let using_expr = (o.using_expr != n.using_expr)
                .then(|| n.using_expr.clone())
                .flatten();
            let with_check_expr = (o.with_check_expr != n.with_check_expr)
                .then(|| n.with_check_expr.clone())
                .flatten();

            vec![Change::Policy(PolicyChange::Alter {
                schema: n.schema.clone(),
                table: n.table.clone(),
                name: n.name.clone(),
                roles,
                using_expr,
                with_check_expr,
            })]
        }

        _ => Vec::new(),
    }
}

fn drop_of(policy: &Policy) -> PolicyChange {
    PolicyChange::Drop {
        schema: policy.schema.clone(),
        table: policy.table.clone(),
        name: policy.name.clone(),
    }
}

fn alterable(old: &Policy, new: &Policy) -> bool {
    old.command == new.command
        && old.permissive == new.permissive
        // An expression cannot be removed by ALTER POLICY, only overwritten.
        && !(old.using_expr.is_some() && new.using_expr.is_none())
        && !(old.with_check_expr.is_some() && new.with_check_expr.is_none())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::policy::PolicyCommand;
    use crate::diff::operations::ChangeKind;

    fn policy(command: PolicyCommand, using_expr: Option<&str>) -> Policy {
        Policy {
            schema: "public".to_string(),
            table: "users".to_string(),
            name: "tenant_isolation".to_string(),
            command,
            permissive: true,
            roles: vec![],
            using_expr: using_expr.map(str::to_string),
            with_check_expr: None,
            oid: 0,
        }
    }

    #[test]
    fn test_expression_change_is_alter() {
        let old = policy(PolicyCommand::All, Some("tenant_id = 1"));
        let new = policy(PolicyCommand::All, Some("tenant_id = 2"));

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::Policy(PolicyChange::Alter {
                using_expr, roles, ..
            }) => {
                assert_eq!(using_expr.as_deref(), Some("tenant_id = 2"));
                assert!(roles.is_none());
            }
            other => panic!("expected PolicyChange::Alter, got {:?}", other),
        }
    }

    #[test]
    fn test_command_change_is_drop_create() {
        let old = policy(PolicyCommand::All, Some("true"));
        let new = policy(PolicyCommand::Select, Some("true"));

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind(), ChangeKind::Drop);
        assert_eq!(changes[1].kind(), ChangeKind::Create);
    }

    #[test]
    fn test_removed_using_expression_is_drop_create() {
        let old = policy(PolicyCommand::All, Some("true"));
        let new = policy(PolicyCommand::All, None);

        let changes = diff(Some(&old), Some(&new));
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].kind(), ChangeKind::Drop);
    }

    #[test]
    fn test_unchanged_policy_is_silent() {
        let p = policy(PolicyCommand::All, Some("true"));
        assert!(diff(Some(&p), Some(&p)).is_empty());
    }
}
